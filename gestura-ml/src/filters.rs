//! Feature filters
//!
//! A filter reduces one channel's series to a single scalar. The set is
//! closed: every consumer matches on [`FilterKind`] exhaustively, so adding
//! a kind is a compile-time-checked change.
//!
//! ## Filters
//!
//! | Kind  | Output                                             |
//! |-------|----------------------------------------------------|
//! | Max   | largest value                                      |
//! | Min   | smallest value                                     |
//! | Std   | population standard deviation                      |
//! | Peaks | number of peaks (smoothed z-score detector)        |
//! | Sum   | total magnitude, sum of absolute values            |
//! | Mean  | arithmetic mean                                    |
//! | Zcr   | zero-crossing rate of the mean-centred series      |
//! | Rms   | root mean square                                   |
//!
//! Every filter returns 0 for an empty series.
//!
//! ## Peak Detection
//!
//! Peaks use a smoothed z-score detector: a sample is a signal when it lies
//! more than `threshold` standard deviations from the moving mean of the
//! previous `lag` samples. Signals feed back into the moving statistics with
//! weight `influence`, so a long plateau does not drag the baseline along.
//! Each rising edge of the positive signal counts as one peak.

use serde::{Deserialize, Serialize};

/// Moving window of the peak detector
const PEAK_LAG: usize = 5;
/// Distance from the moving mean, in standard deviations, that counts as a signal
const PEAK_THRESHOLD: f32 = 3.5;
/// Weight of a signal sample in the moving statistics
const PEAK_INFLUENCE: f32 = 0.5;

/// Value bounds of the live sensor graph, in g
const LIVE_GRAPH_MIN: f32 = -2.0;
const LIVE_GRAPH_MAX: f32 = 2.3;

/// One scalar reduction of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum FilterKind {
    Max = 0,
    Min = 1,
    Std = 2,
    Peaks = 3,
    Sum = 4,
    Mean = 5,
    Zcr = 6,
    Rms = 7,
}

/// Display range for a filter's output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphLimits {
    pub min: f32,
    pub max: f32,
}

impl FilterKind {
    /// Every filter in canonical order
    pub const ALL: [FilterKind; 8] = [
        FilterKind::Max,
        FilterKind::Min,
        FilterKind::Std,
        FilterKind::Peaks,
        FilterKind::Sum,
        FilterKind::Mean,
        FilterKind::Zcr,
        FilterKind::Rms,
    ];

    /// Reduce `series` to a scalar
    pub fn apply(&self, series: &[f32]) -> f32 {
        if series.is_empty() {
            return 0.0;
        }
        match self {
            FilterKind::Max => series.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            FilterKind::Min => series.iter().copied().fold(f32::INFINITY, f32::min),
            FilterKind::Std => std_dev(series),
            FilterKind::Peaks => count_peaks(series) as f32,
            FilterKind::Sum => series.iter().map(|v| libm::fabsf(*v)).sum(),
            FilterKind::Mean => mean(series),
            FilterKind::Zcr => zero_crossing_rate(series),
            FilterKind::Rms => {
                let squares: f32 = series.iter().map(|v| v * v).sum();
                libm::sqrtf(squares / series.len() as f32)
            }
        }
    }

    pub const fn key(&self) -> &'static str {
        match self {
            FilterKind::Max => "max",
            FilterKind::Min => "min",
            FilterKind::Std => "std",
            FilterKind::Peaks => "peaks",
            FilterKind::Sum => "acc",
            FilterKind::Mean => "mean",
            FilterKind::Zcr => "zcr",
            FilterKind::Rms => "rms",
        }
    }

    /// Range to plot this filter's output against
    pub fn graph_limits(&self) -> GraphLimits {
        match self {
            FilterKind::Max | FilterKind::Min | FilterKind::Mean => GraphLimits {
                min: LIVE_GRAPH_MIN,
                max: LIVE_GRAPH_MAX,
            },
            FilterKind::Std => GraphLimits {
                min: 0.0,
                max: (LIVE_GRAPH_MAX - LIVE_GRAPH_MIN) / 2.0,
            },
            FilterKind::Peaks => GraphLimits { min: 0.0, max: 10.0 },
            FilterKind::Sum => GraphLimits { min: 0.0, max: 500.0 },
            FilterKind::Zcr => GraphLimits { min: 0.0, max: 1.0 },
            FilterKind::Rms => GraphLimits { min: 0.0, max: 3.0 },
        }
    }

    const fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// Ordered set of enabled filters
///
/// Iteration always follows [`FilterKind::ALL`], independent of the order
/// filters were enabled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filters {
    bits: u8,
}

impl Default for Filters {
    fn default() -> Self {
        Self::from_kinds([
            FilterKind::Max,
            FilterKind::Min,
            FilterKind::Std,
            FilterKind::Peaks,
            FilterKind::Sum,
        ])
    }
}

impl Filters {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub const fn all() -> Self {
        Self { bits: u8::MAX }
    }

    pub fn from_kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = FilterKind>,
    {
        kinds.into_iter().fold(Self::empty(), Self::with)
    }

    pub const fn with(self, kind: FilterKind) -> Self {
        Self { bits: self.bits | kind.bit() }
    }

    pub const fn without(self, kind: FilterKind) -> Self {
        Self { bits: self.bits & !kind.bit() }
    }

    pub const fn contains(&self, kind: FilterKind) -> bool {
        self.bits & kind.bit() != 0
    }

    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Enabled filters in canonical order
    pub fn iter(&self) -> impl Iterator<Item = FilterKind> + '_ {
        FilterKind::ALL.into_iter().filter(move |kind| self.contains(*kind))
    }

    /// Apply every enabled filter to `series`
    pub fn compute(&self, series: &[f32]) -> Vec<f32> {
        self.iter().map(|kind| kind.apply(series)).collect()
    }
}

fn mean(series: &[f32]) -> f32 {
    series.iter().sum::<f32>() / series.len() as f32
}

fn std_dev(series: &[f32]) -> f32 {
    let mean = mean(series);
    let variance = series.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / series.len() as f32;
    libm::sqrtf(variance)
}

fn zero_crossing_rate(series: &[f32]) -> f32 {
    if series.len() < 2 {
        return 0.0;
    }
    let mean = mean(series);
    let crossings = series
        .windows(2)
        .filter(|pair| (pair[0] - mean) * (pair[1] - mean) < 0.0)
        .count();
    crossings as f32 / (series.len() - 1) as f32
}

fn count_peaks(series: &[f32]) -> usize {
    if series.len() <= PEAK_LAG + 1 {
        return 0;
    }

    let mut filtered = series[..PEAK_LAG].to_vec();
    let mut avg = mean(&filtered);
    let mut std = std_dev(&filtered);
    let mut in_peak = false;
    let mut peaks = 0;

    for &value in &series[PEAK_LAG..] {
        let previous = filtered[filtered.len() - 1];
        let outlier = libm::fabsf(value - avg) > PEAK_THRESHOLD * std;

        if outlier {
            filtered.push(PEAK_INFLUENCE * value + (1.0 - PEAK_INFLUENCE) * previous);
        } else {
            filtered.push(value);
        }

        // Only positive signals are peaks; count rising edges
        let rising = outlier && value > avg;
        if rising && !in_peak {
            peaks += 1;
        }
        in_peak = rising;

        let window = &filtered[filtered.len() - PEAK_LAG..];
        avg = mean(window);
        std = std_dev(window);
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn basic_statistics() {
        let series = [1.0, -2.0, 3.0, -4.0];
        assert_eq!(FilterKind::Max.apply(&series), 3.0);
        assert_eq!(FilterKind::Min.apply(&series), -4.0);
        assert!(close(FilterKind::Mean.apply(&series), -0.5));
        assert!(close(FilterKind::Sum.apply(&series), 10.0));
        assert!(close(FilterKind::Rms.apply(&series), (30.0f32 / 4.0).sqrt()));
        // population variance: (2.25 + 2.25 + 12.25 + 12.25) / 4
        assert!(close(FilterKind::Std.apply(&series), (29.0f32 / 4.0).sqrt()));
    }

    #[test]
    fn empty_series_is_zero_for_every_filter() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.apply(&[]), 0.0, "{:?}", kind);
        }
    }

    #[test]
    fn zero_crossing_rate_of_alternating_signal() {
        let alternating = [1.0, -1.0, 1.0, -1.0, 1.0];
        assert!(close(FilterKind::Zcr.apply(&alternating), 1.0));

        // Offset does not matter, the series is mean-centred first
        let shifted: Vec<f32> = alternating.iter().map(|v| v + 5.0).collect();
        assert!(close(FilterKind::Zcr.apply(&shifted), 1.0));

        assert_eq!(FilterKind::Zcr.apply(&[2.0, 2.0, 2.0]), 0.0);
    }

    #[test]
    fn peaks_counts_spikes() {
        let mut series = vec![0.0f32; 40];
        series[15] = 5.0;
        series[30] = 6.0;
        assert_eq!(FilterKind::Peaks.apply(&series), 2.0);
    }

    #[test]
    fn peaks_on_flat_or_short_series() {
        assert_eq!(FilterKind::Peaks.apply(&[1.0; 30]), 0.0);
        assert_eq!(FilterKind::Peaks.apply(&[0.0, 9.0, 0.0]), 0.0);
    }

    #[test]
    fn plateau_counts_once() {
        let mut series = vec![0.0f32; 20];
        for value in &mut series[10..13] {
            *value = 4.0;
        }
        assert_eq!(FilterKind::Peaks.apply(&series), 1.0);
    }

    #[test]
    fn filters_iterate_in_canonical_order() {
        let filters = Filters::from_kinds([FilterKind::Rms, FilterKind::Max, FilterKind::Zcr]);
        let order: Vec<FilterKind> = filters.iter().collect();
        assert_eq!(order, vec![FilterKind::Max, FilterKind::Zcr, FilterKind::Rms]);
        assert_eq!(filters.len(), 3);
        assert!(!filters.without(FilterKind::Max).contains(FilterKind::Max));
    }

    #[test]
    fn default_filter_set() {
        let filters = Filters::default();
        let order: Vec<FilterKind> = filters.iter().collect();
        assert_eq!(
            order,
            vec![FilterKind::Max, FilterKind::Min, FilterKind::Std, FilterKind::Peaks, FilterKind::Sum]
        );
        assert_eq!(Filters::all().len(), FilterKind::ALL.len());
        assert!(Filters::empty().compute(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn graph_limits() {
        let std = FilterKind::Std.graph_limits();
        assert_eq!(std.min, 0.0);
        assert!(close(std.max, 2.15));
        assert_eq!(FilterKind::Mean.graph_limits(), FilterKind::Max.graph_limits());
        assert_eq!(FilterKind::Sum.graph_limits().max, 500.0);
    }

    proptest::proptest! {
        #[test]
        fn reductions_stay_in_range(series in proptest::collection::vec(-50.0f32..50.0, 1..200)) {
            let max = FilterKind::Max.apply(&series);
            let min = FilterKind::Min.apply(&series);
            let mean = FilterKind::Mean.apply(&series);
            proptest::prop_assert!(min <= mean + 1e-3 && mean <= max + 1e-3);
            proptest::prop_assert!(FilterKind::Std.apply(&series) >= 0.0);
            proptest::prop_assert!(FilterKind::Rms.apply(&series) + 1e-3 >= mean.abs());
            let zcr = FilterKind::Zcr.apply(&series);
            proptest::prop_assert!((0.0..=1.0).contains(&zcr));
            proptest::prop_assert!(FilterKind::Peaks.apply(&series) >= 0.0);
        }
    }
}
