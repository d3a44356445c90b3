//! Renderers for one mounted scenario.

use tracing::debug;

use crate::model::{Scenario, VisualizationMode};
use crate::surface::Surface;
use crate::viewport::Viewport;

use super::{GraphRenderer, SpaceRenderer};

/// How the active views are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Space view alone.
    SpaceOnly,
    /// Graph view alone.
    GraphOnly,
    /// Space view and graph view next to each other.
    SideBySide,
    /// Nothing to draw (the mode asked for data the scenario lacks).
    Empty,
}

/// The renderers a scenario's visualization mode calls for.
///
/// A renderer exists only when the mode shows its view *and* the scenario
/// carries its data, so a `graph_only` scenario never builds a space
/// renderer even if motion data is present. Mount a new stage for every new
/// scenario; nothing carries over from the previous one.
#[derive(Debug, Clone)]
pub struct Stage {
    mode: VisualizationMode,
    space: Option<SpaceRenderer>,
    graph: Option<GraphRenderer>,
}

impl Stage {
    /// Mounts both views in the same viewport.
    pub fn mount(scenario: &Scenario, viewport: Viewport) -> Self {
        Self::mount_split(scenario, viewport, viewport)
    }

    /// Mounts the space and graph views in separate viewports.
    pub fn mount_split(scenario: &Scenario, space: Viewport, graph: Viewport) -> Self {
        let stage = Self {
            mode: scenario.visualization_mode,
            space: scenario.space().map(|s| SpaceRenderer::new(s, space)),
            graph: scenario.graph().map(|g| GraphRenderer::new(g, graph)),
        };
        debug!(
            mode = ?stage.mode,
            space = stage.space.is_some(),
            graph = stage.graph.is_some(),
            "stage mounted"
        );
        stage
    }

    /// The scenario's visualization mode.
    pub const fn mode(&self) -> VisualizationMode {
        self.mode
    }

    /// The space renderer, if active.
    pub const fn space(&self) -> Option<&SpaceRenderer> {
        self.space.as_ref()
    }

    /// The graph renderer, if active.
    pub const fn graph(&self) -> Option<&GraphRenderer> {
        self.graph.as_ref()
    }

    /// Arrangement of the active views.
    pub const fn layout(&self) -> Layout {
        match (self.space.is_some(), self.graph.is_some()) {
            (true, true) => Layout::SideBySide,
            (true, false) => Layout::SpaceOnly,
            (false, true) => Layout::GraphOnly,
            (false, false) => Layout::Empty,
        }
    }

    /// Draws the space frame for `cursor`. Returns false when inactive.
    pub fn draw_space<S: Surface + ?Sized>(&self, surface: &mut S, cursor: usize) -> bool {
        self.space.as_ref().is_some_and(|r| {
            r.draw(surface, cursor);
            true
        })
    }

    /// Draws the graph. Returns false when inactive.
    pub fn draw_graph<S: Surface + ?Sized>(&self, surface: &mut S) -> bool {
        self.graph.as_ref().is_some_and(|r| {
            r.draw(surface);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Category, GraphKind, GraphPoint, GraphSeries, MotionSample, MotionTrack, SpaceMotion,
    };
    use crate::surface::Recorder;

    fn scenario(mode: VisualizationMode) -> Scenario {
        Scenario {
            concept: "Braking car".into(),
            category: Category::Motion1d,
            visualization_mode: mode,
            assumptions: vec!["Constant deceleration".into()],
            space_motion: Some(SpaceMotion {
                object: "car".into(),
                unit: "meters".into(),
                motion: MotionTrack::new(vec![
                    MotionSample::new(0.0, 0.0, 0.0),
                    MotionSample::new(1.0, 15.0, 0.0),
                    MotionSample::new(2.0, 25.0, 0.0),
                ])
                .unwrap(),
            }),
            graph: Some(GraphSeries {
                kind: GraphKind::VelocityVsTime,
                x_label: "Time (s)".into(),
                y_label: "Velocity (m/s)".into(),
                ticks: None,
                points: vec![GraphPoint::new(0.0, 20.0), GraphPoint::new(2.0, 0.0)],
            }),
            final_answer: "25 m".into(),
            teaching_note: "Area under v-t is distance.".into(),
        }
    }

    #[test]
    fn test_layouts() {
        let s = Stage::mount(&scenario(VisualizationMode::SpaceMotion), Viewport::default());
        assert_eq!(s.layout(), Layout::SpaceOnly);
        let s = Stage::mount(&scenario(VisualizationMode::SpaceAndGraph), Viewport::default());
        assert_eq!(s.layout(), Layout::SideBySide);
        let s = Stage::mount(&scenario(VisualizationMode::GraphOnly), Viewport::default());
        assert_eq!(s.layout(), Layout::GraphOnly);
    }

    #[test]
    fn test_graph_only_never_draws_space() {
        let stage = Stage::mount(&scenario(VisualizationMode::GraphOnly), Viewport::default());
        let mut surface = Recorder::new(800.0, 600.0);

        assert!(stage.space().is_none());
        assert!(!stage.draw_space(&mut surface, 1));
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_missing_data_is_empty() {
        let mut sc = scenario(VisualizationMode::SpaceMotion);
        sc.space_motion = None;
        let stage = Stage::mount(&sc, Viewport::default());
        assert_eq!(stage.layout(), Layout::Empty);
    }

    #[test]
    fn test_mount_split_uses_separate_viewports() {
        let stage = Stage::mount_split(
            &scenario(VisualizationMode::SpaceAndGraph),
            Viewport::new(400.0, 300.0, 20.0),
            Viewport::new(200.0, 100.0, 10.0),
        );
        assert_eq!(stage.space().unwrap().viewport().width, 400.0);
        let p = stage.graph().unwrap().to_pixel(2.0, 0.0);
        assert!((p.x - 190.0).abs() < 1e-9);
    }
}
