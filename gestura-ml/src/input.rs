//! Classifier input assembly
//!
//! Turns a window of samples into the flat feature vector a model consumes.
//! Layout is channel-major: for each selected channel in canonical order,
//! the enabled filters in canonical order.

use gestura_core::{AccelerometerSample, Channel, ChannelSelection, CombinedSample, TimestampedSample};

use crate::filters::Filters;

/// Flat, ordered model input
pub type FeatureVector = Vec<f32>;

/// Something that can be reduced to a feature vector
pub trait ClassifierInput: Send + Sync {
    fn get_input(&self, filters: &Filters, selection: &ChannelSelection) -> FeatureVector;
}

/// Feature vector length for a filter set and channel selection
pub fn feature_len(filters: &Filters, selection: &ChannelSelection) -> usize {
    filters.len() * selection.len()
}

/// Filters and channels a feature vector is assembled with
///
/// A trained model only understands vectors built with the layout it was
/// trained on, so the model records it on every successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLayout {
    pub filters: Filters,
    pub selection: ChannelSelection,
}

impl FeatureLayout {
    pub const fn new(filters: Filters, selection: ChannelSelection) -> Self {
        Self { filters, selection }
    }

    /// No filters, no channels
    pub const fn empty() -> Self {
        Self::new(Filters::empty(), ChannelSelection::empty())
    }

    pub fn feature_len(&self) -> usize {
        feature_len(&self.filters, &self.selection)
    }

    pub fn assemble(&self, input: &dyn ClassifierInput) -> FeatureVector {
        input.get_input(&self.filters, &self.selection)
    }
}

/// One series per channel, built from combined samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesInput {
    series: [Vec<f32>; Channel::ALL.len()],
}

impl SeriesInput {
    pub fn from_samples(samples: &[CombinedSample]) -> Self {
        let mut input = Self::default();
        for (channel, series) in Channel::ALL.iter().zip(input.series.iter_mut()) {
            *series = samples.iter().map(|sample| sample.value(*channel)).collect();
        }
        input
    }

    /// Build from a buffer window, dropping timestamps
    pub fn from_window(window: &[TimestampedSample<CombinedSample>]) -> Self {
        let samples: Vec<CombinedSample> = window.iter().map(|sample| sample.value).collect();
        Self::from_samples(&samples)
    }

    pub fn series(&self, channel: Channel) -> &[f32] {
        &self.series[channel as usize]
    }

    /// Number of samples per series
    pub fn len(&self) -> usize {
        self.series[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClassifierInput for SeriesInput {
    fn get_input(&self, filters: &Filters, selection: &ChannelSelection) -> FeatureVector {
        selection
            .channels()
            .flat_map(|channel| filters.compute(self.series(channel)))
            .collect()
    }
}

/// Accelerometer-only input
///
/// Always yields x, y and z features, whatever the selection says.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccelerometerInput {
    xs: Vec<f32>,
    ys: Vec<f32>,
    zs: Vec<f32>,
}

impl AccelerometerInput {
    pub fn new(xs: Vec<f32>, ys: Vec<f32>, zs: Vec<f32>) -> Self {
        Self { xs, ys, zs }
    }

    pub fn from_samples(samples: &[AccelerometerSample]) -> Self {
        Self {
            xs: samples.iter().map(|s| s.x).collect(),
            ys: samples.iter().map(|s| s.y).collect(),
            zs: samples.iter().map(|s| s.z).collect(),
        }
    }
}

impl ClassifierInput for AccelerometerInput {
    fn get_input(&self, filters: &Filters, _selection: &ChannelSelection) -> FeatureVector {
        [&self.xs, &self.ys, &self.zs]
            .into_iter()
            .flat_map(|series| filters.compute(series))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterKind;

    fn samples() -> Vec<CombinedSample> {
        (0..12)
            .map(|i| CombinedSample {
                accx: i as f32,
                accy: -(i as f32),
                accz: 1.0,
                magx: 10.0 * i as f32,
                magy: 0.0,
                magz: -5.0,
                light: 0.5,
            })
            .collect()
    }

    #[test]
    fn layout_is_channel_major() {
        let filters = Filters::from_kinds([FilterKind::Max, FilterKind::Min]);
        let selection = ChannelSelection::from_channels([Channel::Light, Channel::AccelY]);
        let input = SeriesInput::from_samples(&samples());

        // accy before light, whatever order the channels were selected in
        assert_eq!(input.get_input(&filters, &selection), vec![0.0, -11.0, 0.5, 0.5]);
    }

    #[test]
    fn length_matches_selection_and_filters() {
        let input = SeriesInput::from_samples(&samples());
        for selection in [
            ChannelSelection::all(),
            ChannelSelection::from_sensors(true, false, false),
            ChannelSelection::from_sensors(false, true, true),
        ] {
            let filters = Filters::default();
            assert_eq!(input.get_input(&filters, &selection).len(), feature_len(&filters, &selection));
        }
    }

    #[test]
    fn assembly_is_deterministic() {
        let filters = Filters::all();
        let selection = ChannelSelection::all();
        let first = SeriesInput::from_samples(&samples()).get_input(&filters, &selection);
        let second = SeriesInput::from_samples(&samples()).get_input(&filters, &selection);
        assert_eq!(first, second);
    }

    #[test]
    fn window_drops_timestamps() {
        let window: Vec<TimestampedSample<CombinedSample>> = samples()
            .into_iter()
            .enumerate()
            .map(|(i, value)| TimestampedSample { timestamp: i as u64 * 20, value })
            .collect();
        assert_eq!(SeriesInput::from_window(&window), SeriesInput::from_samples(&samples()));
        assert_eq!(SeriesInput::from_window(&window).len(), 12);
    }

    #[test]
    fn layout_assembles_with_its_own_settings() {
        let layout = FeatureLayout::new(
            Filters::from_kinds([FilterKind::Max]),
            ChannelSelection::from_sensors(false, false, true),
        );
        let input = SeriesInput::from_samples(&samples());
        assert_eq!(layout.assemble(&input), vec![0.5]);
        assert_eq!(layout.feature_len(), 1);
        assert_eq!(FeatureLayout::empty().assemble(&input), Vec::<f32>::new());
    }

    #[test]
    fn accelerometer_input_ignores_selection() {
        let readings: Vec<AccelerometerSample> =
            (0..4).map(|i| AccelerometerSample::new(i as f32, 2.0, -1.0)).collect();
        let input = AccelerometerInput::from_samples(&readings);
        let filters = Filters::from_kinds([FilterKind::Max]);

        let light_only = ChannelSelection::from_sensors(false, false, true);
        assert_eq!(input.get_input(&filters, &light_only), vec![3.0, 2.0, -1.0]);
    }
}
