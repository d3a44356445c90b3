#![forbid(unsafe_code)]
// Allow these clippy lints for geometry/drawing code readability
#![allow(clippy::must_use_candidate)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

//! # Kinema
//!
//! Animated answers to physics questions.
//!
//! A question goes to a language-model service which answers with a
//! [`Scenario`]: a handful of timestamped positions, an optional
//! value-vs-time graph, and a short explanation. Kinema does no physics of its
//! own. It provides:
//!
//! - **Model**: the immutable, validated [`Scenario`] record
//! - **Viewport**: fitting arbitrary motion data into a padded pixel area
//! - **Scheduler**: turning wall-clock time into a sample cursor, with
//!   cancellable playback sessions and an injectable [`Clock`]
//! - **Render**: drawing the space view and the graph view onto any
//!   [`Surface`]
//! - **Query**: asking the model service and classifying its failures
//!
//! ## Example
//!
//! ```rust
//! use kinema::prelude::*;
//!
//! let json = r#"{
//!   "concept": "Free fall",
//!   "category": "free_fall",
//!   "visualization_mode": "space_motion",
//!   "assumptions": ["g = 9.8 m/s^2"],
//!   "space_motion": {
//!     "object": "ball",
//!     "unit": "meters",
//!     "motion": [
//!       {"time": 0, "x": 0, "y": 50},
//!       {"time": 1, "x": 0, "y": 45},
//!       {"time": 2, "x": 0, "y": 30},
//!       {"time": 3.2, "x": 0, "y": 0}
//!     ]
//!   },
//!   "final_answer": "t = 3.2 s",
//!   "teaching_note": "Speed grows linearly with time."
//! }"#;
//!
//! let scenario = parse_scenario(json).unwrap();
//! let clock = ManualClock::new();
//! let track = &scenario.space().unwrap().motion;
//! let mut scheduler = Scheduler::with_clock(track, clock.clone());
//!
//! let tick = scheduler.play();
//! clock.advance_secs(1.5);
//! assert!(matches!(scheduler.tick(tick), TickOutcome::Advanced { cursor: 1, .. }));
//!
//! let stage = Stage::mount(&scenario, Viewport::default());
//! let mut surface = Recorder::new(800.0, 600.0);
//! stage.draw_space(&mut surface, scheduler.cursor());
//! assert!(!surface.ops().is_empty());
//! ```

pub mod clock;
pub mod config;
pub mod model;
pub mod prompt;
pub mod query;
pub mod render;
pub mod scheduler;
pub mod surface;
pub mod viewport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CanvasConfig, Config, ConfigError};
pub use model::{
    Category, GraphKind, GraphPoint, GraphSeries, GraphTicks, MotionSample, MotionTrack, Scenario,
    SpaceMotion, TrackError, VisualizationMode,
};
pub use query::{FixtureSource, GeminiClient, QueryError, ScenarioSource, parse_scenario};
pub use render::{GraphRenderer, SpaceRenderer, Stage};
pub use scheduler::{Scheduler, Tick, TickOutcome, fps};
pub use surface::{Color, DrawOp, Palette, PixelPoint, Recorder, Stroke, Surface, SvgSurface};
pub use viewport::{Bounds, ViewTransform, Viewport};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::model::{MotionSample, MotionTrack, Scenario, VisualizationMode};
    pub use crate::query::{QueryError, ScenarioSource, parse_scenario};
    pub use crate::render::Stage;
    pub use crate::scheduler::{Scheduler, Tick, TickOutcome};
    pub use crate::surface::{Recorder, Surface};
    pub use crate::viewport::Viewport;
}
