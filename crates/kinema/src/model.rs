//! Scenario data model.
//!
//! A [`Scenario`] is the unit the model service answers with: what concept a
//! question is about, which views to show, the sampled motion and/or graph,
//! and the textual answer. Scenarios are immutable once built. Playback only
//! ever keeps a cursor into the [`MotionTrack`], it never edits it.
//!
//! The JSON shape is fixed; field names are the snake_case names below.
//!
//! ```rust
//! use kinema::{MotionSample, MotionTrack};
//!
//! let track = MotionTrack::new(vec![
//!     MotionSample::new(0.0, 0.0, 50.0),
//!     MotionSample::new(1.0, 0.0, 45.0),
//!     MotionSample::new(3.2, 0.0, 0.0),
//! ])
//! .unwrap();
//!
//! assert_eq!(track.duration(), 3.2);
//! assert_eq!(track.index_at(1.5), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::viewport::DEFAULT_SPAN;

/// Why a list of samples is not a valid track.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackError {
    /// Fewer than two samples.
    #[error("motion track needs at least 2 samples, got {len}")]
    TooShort {
        /// Number of samples supplied.
        len: usize,
    },

    /// A sample has a negative timestamp.
    #[error("sample {index} has a negative time")]
    NegativeTime {
        /// Offending sample index.
        index: usize,
    },

    /// A sample has a NaN or infinite component.
    #[error("sample {index} has a non-finite value")]
    NonFinite {
        /// Offending sample index.
        index: usize,
    },

    /// A sample's time does not exceed its predecessor's.
    #[error("sample {index} does not come after sample {}", .index - 1)]
    NotIncreasing {
        /// Offending sample index.
        index: usize,
    },

    /// The positions span more than an `f64` can hold along one axis.
    #[error("positions along {axis} span too far to draw")]
    Unbounded {
        /// `"x"` or `"y"`.
        axis: &'static str,
    },
}

/// One timestamped position, in seconds and meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Seconds since the start of the motion.
    pub time: f64,
    /// Horizontal position in meters.
    pub x: f64,
    /// Vertical position in meters, increasing upward.
    pub y: f64,
}

impl MotionSample {
    /// Creates a new sample.
    #[inline]
    pub const fn new(time: f64, x: f64, y: f64) -> Self {
        Self { time, x, y }
    }
}

/// An ordered list of samples with strictly increasing times.
///
/// Always holds at least two samples, so [`duration`](Self::duration) and
/// [`last_index`](Self::last_index) never need to handle an empty track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MotionSample>", into = "Vec<MotionSample>")]
pub struct MotionTrack {
    samples: Vec<MotionSample>,
}

impl MotionTrack {
    /// Validates and wraps a list of samples.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackError`] naming the first offending sample.
    pub fn new(samples: Vec<MotionSample>) -> Result<Self, TrackError> {
        if samples.len() < 2 {
            return Err(TrackError::TooShort { len: samples.len() });
        }

        for (index, s) in samples.iter().enumerate() {
            if !(s.time.is_finite() && s.x.is_finite() && s.y.is_finite()) {
                return Err(TrackError::NonFinite { index });
            }
            if s.time < 0.0 {
                return Err(TrackError::NegativeTime { index });
            }
            if index > 0 && s.time <= samples[index - 1].time {
                return Err(TrackError::NotIncreasing { index });
            }
        }

        if !span_is_finite(samples.iter().map(|s| s.x)) {
            return Err(TrackError::Unbounded { axis: "x" });
        }
        if !span_is_finite(samples.iter().map(|s| s.y)) {
            return Err(TrackError::Unbounded { axis: "y" });
        }

        Ok(Self { samples })
    }

    /// Returns the samples as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[MotionSample] {
        &self.samples
    }

    /// Returns the number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; a track holds at least two samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Index of the final sample.
    #[inline]
    pub fn last_index(&self) -> usize {
        self.samples.len() - 1
    }

    /// Total duration: the time of the final sample.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.samples[self.last_index()].time
    }

    /// Returns the sample at `index`, clamped to the final sample.
    #[inline]
    pub fn sample(&self, index: usize) -> MotionSample {
        self.samples[index.min(self.last_index())]
    }

    /// Greatest index whose time is at or before `elapsed`.
    ///
    /// Times before the first sample map to index 0.
    pub fn index_at(&self, elapsed: f64) -> usize {
        self.samples
            .partition_point(|s| s.time <= elapsed)
            .saturating_sub(1)
    }

    /// Iterates over the samples in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, MotionSample> {
        self.samples.iter()
    }
}

/// Whether the extent the viewport will fit (values plus `0..=DEFAULT_SPAN`)
/// has a finite width.
fn span_is_finite(values: impl Iterator<Item = f64>) -> bool {
    let (lo, hi) = values.fold((0.0_f64, DEFAULT_SPAN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (hi - lo).is_finite()
}

impl TryFrom<Vec<MotionSample>> for MotionTrack {
    type Error = TrackError;

    fn try_from(samples: Vec<MotionSample>) -> Result<Self, Self::Error> {
        Self::new(samples)
    }
}

impl From<MotionTrack> for Vec<MotionSample> {
    fn from(track: MotionTrack) -> Self {
        track.samples
    }
}

impl AsRef<[MotionSample]> for MotionTrack {
    fn as_ref(&self) -> &[MotionSample] {
        &self.samples
    }
}

impl<'a> IntoIterator for &'a MotionTrack {
    type Item = &'a MotionSample;
    type IntoIter = std::slice::Iter<'a, MotionSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

fn default_unit() -> String {
    "meters".to_string()
}

/// The moving object and its track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceMotion {
    /// What the dot stands for ("ball", "car").
    pub object: String,
    /// Distance unit label.
    #[serde(default = "default_unit")]
    pub unit: String,
    /// The sampled positions.
    pub motion: MotionTrack,
}

/// Concept category chosen by the model service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Straight-line motion (braking car, uniform acceleration).
    #[serde(rename = "motion_1d")]
    Motion1d,
    /// Planar motion (projectiles).
    #[serde(rename = "motion_2d")]
    Motion2d,
    /// Vertical fall under gravity.
    FreeFall,
    /// Sliding along a slope.
    InclinedPlane,
    /// Uniform circular motion.
    CircularMotion,
    /// Pure graph questions.
    GraphOnly,
    /// Waves.
    Wave,
    /// Optics.
    Optics,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Motion1d,
        Self::Motion2d,
        Self::FreeFall,
        Self::InclinedPlane,
        Self::CircularMotion,
        Self::GraphOnly,
        Self::Wave,
        Self::Optics,
    ];

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Motion1d => "1D motion",
            Self::Motion2d => "2D motion",
            Self::FreeFall => "Free fall",
            Self::InclinedPlane => "Inclined plane",
            Self::CircularMotion => "Circular motion",
            Self::GraphOnly => "Graph only",
            Self::Wave => "Wave",
            Self::Optics => "Optics",
        }
    }
}

/// Which views a scenario is shown with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationMode {
    /// The moving object only.
    SpaceMotion,
    /// The moving object next to one graph.
    SpaceAndGraph,
    /// The graph only.
    GraphOnly,
}

impl VisualizationMode {
    /// Whether the space view is active.
    pub const fn shows_space(self) -> bool {
        matches!(self, Self::SpaceMotion | Self::SpaceAndGraph)
    }

    /// Whether the graph view is active.
    pub const fn shows_graph(self) -> bool {
        matches!(self, Self::SpaceAndGraph | Self::GraphOnly)
    }
}

/// What a graph plots against time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    /// Position versus time.
    PositionVsTime,
    /// Velocity versus time.
    VelocityVsTime,
}

impl GraphKind {
    /// Upper-case chart title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::PositionVsTime => "POSITION VS TIME",
            Self::VelocityVsTime => "VELOCITY VS TIME",
        }
    }
}

/// One point of a graph series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPoint {
    /// Seconds.
    pub time: f64,
    /// Plotted value.
    pub value: f64,
}

impl GraphPoint {
    /// Creates a new point.
    #[inline]
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Preferred tick positions for each axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphTicks {
    /// Time-axis ticks.
    #[serde(default)]
    pub x: Vec<f64>,
    /// Value-axis ticks.
    #[serde(default)]
    pub y: Vec<f64>,
}

/// A value-versus-time line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSeries {
    /// What is plotted.
    #[serde(rename = "type")]
    pub kind: GraphKind,
    /// Time-axis label.
    pub x_label: String,
    /// Value-axis label.
    pub y_label: String,
    /// Preferred ticks, if the service gave any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<GraphTicks>,
    /// Points in time order.
    pub points: Vec<GraphPoint>,
}

/// One complete answer to a physics question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Short concept name.
    pub concept: String,
    /// Concept category.
    pub category: Category,
    /// Which views to show.
    pub visualization_mode: VisualizationMode,
    /// Assumptions the answer relies on.
    pub assumptions: Vec<String>,
    /// Moving object and its track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_motion: Option<SpaceMotion>,
    /// Graph series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphSeries>,
    /// The solution, as text.
    pub final_answer: String,
    /// The explanation, as text.
    pub teaching_note: String,
}

impl Scenario {
    /// Whether the space view should be shown.
    pub fn shows_space(&self) -> bool {
        self.visualization_mode.shows_space() && self.space_motion.is_some()
    }

    /// Whether the graph view should be shown.
    pub fn shows_graph(&self) -> bool {
        self.visualization_mode.shows_graph() && self.graph.is_some()
    }

    /// The space data, if the mode shows it.
    pub fn space(&self) -> Option<&SpaceMotion> {
        self.space_motion
            .as_ref()
            .filter(|_| self.visualization_mode.shows_space())
    }

    /// The graph data, if the mode shows it.
    pub fn graph(&self) -> Option<&GraphSeries> {
        self.graph
            .as_ref()
            .filter(|_| self.visualization_mode.shows_graph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_track() -> MotionTrack {
        MotionTrack::new(vec![
            MotionSample::new(0.0, 0.0, 50.0),
            MotionSample::new(1.0, 0.0, 45.0),
            MotionSample::new(2.0, 0.0, 30.0),
            MotionSample::new(3.2, 0.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_track_duration_and_last_index() {
        let track = ball_track();
        assert_eq!(track.len(), 4);
        assert_eq!(track.last_index(), 3);
        assert!((track.duration() - 3.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_track_index_at() {
        let track = ball_track();
        assert_eq!(track.index_at(0.0), 0);
        assert_eq!(track.index_at(0.99), 0);
        assert_eq!(track.index_at(1.0), 1);
        assert_eq!(track.index_at(1.5), 1);
        assert_eq!(track.index_at(3.2), 3);
        assert_eq!(track.index_at(100.0), 3);
    }

    #[test]
    fn test_track_index_before_first_sample() {
        let track = MotionTrack::new(vec![
            MotionSample::new(0.5, 0.0, 0.0),
            MotionSample::new(1.0, 1.0, 0.0),
        ])
        .unwrap();
        assert_eq!(track.index_at(0.1), 0);
    }

    #[test]
    fn test_track_rejects_single_sample() {
        let err = MotionTrack::new(vec![MotionSample::new(0.0, 0.0, 0.0)]).unwrap_err();
        assert_eq!(err, TrackError::TooShort { len: 1 });
    }

    #[test]
    fn test_track_rejects_repeated_time() {
        let err = MotionTrack::new(vec![
            MotionSample::new(0.0, 0.0, 0.0),
            MotionSample::new(1.0, 1.0, 0.0),
            MotionSample::new(1.0, 2.0, 0.0),
        ])
        .unwrap_err();
        assert_eq!(err, TrackError::NotIncreasing { index: 2 });
        assert_eq!(err.to_string(), "sample 2 does not come after sample 1");
    }

    #[test]
    fn test_track_rejects_negative_and_nan() {
        let err = MotionTrack::new(vec![
            MotionSample::new(-1.0, 0.0, 0.0),
            MotionSample::new(1.0, 1.0, 0.0),
        ])
        .unwrap_err();
        assert_eq!(err, TrackError::NegativeTime { index: 0 });

        let err = MotionTrack::new(vec![
            MotionSample::new(0.0, 0.0, 0.0),
            MotionSample::new(1.0, f64::NAN, 0.0),
        ])
        .unwrap_err();
        assert_eq!(err, TrackError::NonFinite { index: 1 });
    }

    #[test]
    fn test_track_rejects_overflowing_span() {
        let err = MotionTrack::new(vec![
            MotionSample::new(0.0, -1e308, 0.0),
            MotionSample::new(1.0, 1e308, 0.0),
        ])
        .unwrap_err();
        assert_eq!(err, TrackError::Unbounded { axis: "x" });

        let err = MotionTrack::new(vec![
            MotionSample::new(0.0, 0.0, f64::MAX),
            MotionSample::new(1.0, 0.0, -f64::MAX),
        ])
        .unwrap_err();
        assert_eq!(err, TrackError::Unbounded { axis: "y" });

        // huge but representable
        assert!(MotionTrack::new(vec![
            MotionSample::new(0.0, -1e307, 0.0),
            MotionSample::new(1.0, 1e307, 0.0),
        ])
        .is_ok());
    }

    #[test]
    fn test_track_sample_clamps() {
        let track = ball_track();
        assert_eq!(track.sample(99), MotionSample::new(3.2, 0.0, 0.0));
    }

    #[test]
    fn test_track_deserialize_validates() {
        let ok: MotionTrack =
            serde_json::from_str(r#"[{"time":0,"x":0,"y":0},{"time":1,"x":1,"y":1}]"#).unwrap();
        assert_eq!(ok.len(), 2);

        let bad = serde_json::from_str::<MotionTrack>(r#"[{"time":0,"x":0,"y":0}]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&Category::Motion1d).unwrap(),
            "\"motion_1d\""
        );
        assert_eq!(
            serde_json::to_string(&Category::Motion2d).unwrap(),
            "\"motion_2d\""
        );
        assert_eq!(
            serde_json::to_string(&Category::InclinedPlane).unwrap(),
            "\"inclined_plane\""
        );
        let c: Category = serde_json::from_str("\"circular_motion\"").unwrap();
        assert_eq!(c, Category::CircularMotion);
    }

    #[test]
    fn test_mode_flags() {
        assert!(VisualizationMode::SpaceMotion.shows_space());
        assert!(!VisualizationMode::SpaceMotion.shows_graph());
        assert!(VisualizationMode::SpaceAndGraph.shows_space());
        assert!(VisualizationMode::SpaceAndGraph.shows_graph());
        assert!(!VisualizationMode::GraphOnly.shows_space());
        assert!(VisualizationMode::GraphOnly.shows_graph());
    }

    #[test]
    fn test_graph_only_hides_space_data() {
        let scenario = Scenario {
            concept: "Velocity".into(),
            category: Category::GraphOnly,
            visualization_mode: VisualizationMode::GraphOnly,
            assumptions: vec![],
            space_motion: Some(SpaceMotion {
                object: "car".into(),
                unit: default_unit(),
                motion: ball_track(),
            }),
            graph: None,
            final_answer: String::new(),
            teaching_note: String::new(),
        };
        assert!(scenario.space().is_none());
        assert!(!scenario.shows_space());
        assert!(!scenario.shows_graph());
    }

    #[test]
    fn test_graph_kind_title() {
        assert_eq!(GraphKind::PositionVsTime.title(), "POSITION VS TIME");
        assert_eq!(GraphKind::VelocityVsTime.title(), "VELOCITY VS TIME");
    }
}
