//! The interactive application model.
//!
//! One question at a time: type it (or pick a preset), submit, and the
//! answer is mounted as a [`Stage`] with a [`Scheduler`] driving the space
//! view. Frame ticks carry the scheduler's [`Tick`] token, so ticks still in
//! flight after a stop, reset or new answer are dropped by the scheduler.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kinema::render::Layout;
use kinema::{
    Config, Palette, QueryError, Scenario, ScenarioSource, Scheduler, Stage, Tick, TickOutcome,
};
use tracing::{debug, trace};

use crate::canvas::{BrailleCanvas, PIXELS_PER_DOT};
use crate::program::{Cmd, Input, Model, tick};
use crate::view::{paint, rule, side_by_side, strong, tail, truncate, wrap};

/// Preset questions, in chip order.
pub const PRESETS: [&str; 4] = [
    "Projectile motion",
    "Braking car",
    "Free fall",
    "Inclined plane",
];

/// The question a preset chip fills in.
pub fn preset_question(chip: &str) -> String {
    format!("Simulate a {}", chip.to_lowercase())
}

const HEADER_ROWS: u16 = 8;
const FOOTER_ROWS: u16 = 10;
const MIN_CANVAS_ROWS: u16 = 6;
const MAX_CANVAS_ROWS: u16 = 40;
const MIN_CANVAS_COLS: u16 = 20;

/// Application messages.
#[derive(Debug)]
pub enum Msg {
    /// Terminal input.
    Input(Input),
    /// A frame tick for the scheduler session it carries.
    Frame(Tick),
    /// The answer to request number `request`.
    Answered {
        /// Request counter at submission.
        request: u64,
        /// The outcome.
        result: Result<Scenario, QueryError>,
    },
}

impl From<Input> for Msg {
    fn from(input: Input) -> Self {
        Self::Input(input)
    }
}

/// Which part of the screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The question line.
    Question,
    /// Playback and preset controls.
    Controls,
}

/// Request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Nothing pending.
    Idle,
    /// Waiting for the model service.
    Loading,
    /// The last request failed; the message is shown as is.
    Failed(String),
}

/// A mounted answer.
#[derive(Debug)]
struct Showing {
    scenario: Scenario,
    stage: Stage,
    scheduler: Option<Scheduler>,
    canvas: (u16, u16),
}

/// The application model.
pub struct App {
    source: Arc<dyn ScenarioSource>,
    fps: u32,
    color: bool,
    palette: Palette,
    input: String,
    focus: Focus,
    status: Status,
    request: u64,
    showing: Option<Showing>,
    width: u16,
    height: u16,
    quit: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("input", &self.input)
            .field("focus", &self.focus)
            .field("status", &self.status)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Creates the app.
    pub fn new(source: Arc<dyn ScenarioSource>, config: &Config, color: bool) -> Self {
        Self {
            source,
            fps: config.fps,
            color,
            palette: Palette::default(),
            input: String::new(),
            focus: Focus::Question,
            status: Status::Idle,
            request: 0,
            showing: None,
            width: 80,
            height: 40,
            quit: false,
        }
    }

    /// Mounts `scenario` as if it had just been answered.
    pub fn show(&mut self, scenario: Scenario) {
        let fps = self.fps;
        let scheduler = scenario
            .space()
            .map(|space| Scheduler::new(&space.motion).with_fps(fps));
        let canvas = canvas_size(self.width, self.height, layout_of(&scenario));
        let stage = mount(&scenario, canvas);

        self.showing = Some(Showing {
            scenario,
            stage,
            scheduler,
            canvas,
        });
        self.status = Status::Idle;
        self.focus = Focus::Controls;
    }

    /// The question being typed.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Where keys go.
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    /// Request state.
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// The mounted scenario.
    pub fn scenario(&self) -> Option<&Scenario> {
        self.showing.as_ref().map(|s| &s.scenario)
    }

    /// The mounted stage.
    pub fn stage(&self) -> Option<&Stage> {
        self.showing.as_ref().map(|s| &s.stage)
    }

    /// Whether the animation is running.
    pub fn is_playing(&self) -> bool {
        self.scheduler().is_some_and(Scheduler::is_playing)
    }

    /// Current cursor into the motion track.
    pub fn cursor(&self) -> usize {
        self.scheduler().map_or(0, Scheduler::cursor)
    }

    fn scheduler(&self) -> Option<&Scheduler> {
        self.showing.as_ref().and_then(|s| s.scheduler.as_ref())
    }

    fn frame_interval(&self) -> Duration {
        self.scheduler()
            .map_or_else(|| kinema::fps(self.fps), Scheduler::frame_interval)
    }

    fn frame(&self, next: Tick) -> Cmd<Msg> {
        tick(self.frame_interval(), move |_| Msg::Frame(next))
    }

    fn submit(&mut self) -> Option<Cmd<Msg>> {
        let question = self.input.trim().to_string();
        if question.is_empty() || self.status == Status::Loading {
            return None;
        }

        self.request += 1;
        self.status = Status::Loading;
        self.showing = None;
        debug!(request = self.request, "question submitted");

        let request = self.request;
        let source = Arc::clone(&self.source);
        Some(Cmd::new(move || Msg::Answered {
            request,
            result: source.ask(&question),
        }))
    }

    fn toggle_playback(&mut self) -> Option<Cmd<Msg>> {
        let next = self.showing.as_mut()?.scheduler.as_mut()?.toggle()?;
        Some(self.frame(next))
    }

    fn reset(&mut self) {
        if let Some(scheduler) = self.showing.as_mut().and_then(|s| s.scheduler.as_mut()) {
            scheduler.reset();
        }
    }

    fn pick_preset(&mut self, index: usize) {
        if let Some(chip) = PRESETS.get(index) {
            self.input = preset_question(chip);
            self.focus = Focus::Question;
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Option<Cmd<Msg>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return None;
        }

        if let KeyCode::F(n @ 1..=4) = key.code {
            self.pick_preset(usize::from(n - 1));
            return None;
        }

        match self.focus {
            Focus::Question => match key.code {
                KeyCode::Enter => return self.submit(),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Controls,
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.input.push(c);
                }
                _ => {}
            },
            Focus::Controls => match key.code {
                KeyCode::Char(' ' | 'p') => return self.toggle_playback(),
                KeyCode::Char('r') => self.reset(),
                KeyCode::Char(c @ '1'..='4') => {
                    if let Some(n) = c.to_digit(10) {
                        self.pick_preset(n as usize - 1);
                    }
                }
                KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
                KeyCode::Tab | KeyCode::Enter | KeyCode::Char('i' | '/') => {
                    self.focus = Focus::Question;
                }
                _ => {}
            },
        }
        None
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        if let Some(showing) = self.showing.as_mut() {
            let canvas = canvas_size(width, height, showing.stage.layout());
            if canvas != showing.canvas {
                showing.stage = mount(&showing.scenario, canvas);
                showing.canvas = canvas;
            }
        }
    }

    fn on_frame(&mut self, tick: Tick) -> Option<Cmd<Msg>> {
        let scheduler = self.showing.as_mut()?.scheduler.as_mut()?;
        match scheduler.tick(tick) {
            TickOutcome::Advanced { next, .. } => Some(self.frame(next)),
            TickOutcome::Completed { .. } | TickOutcome::Stale => None,
        }
    }

    fn on_answer(&mut self, request: u64, result: Result<Scenario, QueryError>) {
        if request != self.request {
            trace!(request, current = self.request, "stale answer ignored");
            return;
        }
        match result {
            Ok(scenario) => self.show(scenario),
            Err(err) => self.status = Status::Failed(err.to_string()),
        }
    }
}

impl Model for App {
    type Msg = Msg;

    fn init(&self) -> Option<Cmd<Msg>> {
        None
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd<Msg>> {
        match msg {
            Msg::Input(Input::Key(key)) => self.on_key(key),
            Msg::Input(Input::Resize { width, height }) => {
                self.on_resize(width, height);
                None
            }
            Msg::Frame(tick) => self.on_frame(tick),
            Msg::Answered { request, result } => {
                self.on_answer(request, result);
                None
            }
        }
    }

    fn view(&self) -> String {
        let width = usize::from(self.width.max(20));
        let p = self.palette;
        let c = self.color;
        let mut out: Vec<String> = Vec::new();

        out.push(format!(
            "{}  {}",
            strong("kinema", p.text, c),
            paint("from equation to motion", p.accent, c)
        ));
        out.push(paint(&rule(width), p.axis, c));

        let prompt = if self.focus == Focus::Question { "›" } else { " " };
        let room = width.saturating_sub(4);
        let line = if self.input.is_empty() && self.focus != Focus::Question {
            paint(
                "e.g. A ball is dropped from 50m. When does it hit the ground?",
                p.axis,
                c,
            )
        } else {
            let cursor = if self.focus == Focus::Question { "▏" } else { "" };
            format!("{}{cursor}", tail(&self.input, room.saturating_sub(1)))
        };
        out.push(format!("{} {line}", paint(prompt, p.accent, c)));

        let chips: Vec<String> = PRESETS
            .iter()
            .enumerate()
            .map(|(i, chip)| {
                let key = if self.focus == Focus::Controls {
                    format!("{}", i + 1)
                } else {
                    format!("F{}", i + 1)
                };
                format!("{} {}", paint(&format!("[{key}]"), p.axis, c), paint(chip, p.accent, c))
            })
            .collect();
        out.push(format!("  {}", chips.join("  ")));
        out.push(String::new());

        match &self.status {
            Status::Loading => out.push(paint("  Asking the model…", p.accent, c)),
            Status::Failed(message) => {
                for line in wrap(message, width, "  ! ") {
                    out.push(paint(&line, p.text, c));
                }
            }
            Status::Idle if self.showing.is_none() => out.push(paint(
                "  Ask any classical physics question.",
                p.accent,
                c,
            )),
            Status::Idle => {}
        }

        if let Some(showing) = &self.showing {
            self.view_showing(showing, width, &mut out);
        }

        out.push(String::new());
        let help = match self.focus {
            Focus::Question => "enter ask · tab controls · F1-F4 presets · ctrl-c quit",
            Focus::Controls => "space play/stop · r reset · 1-4 presets · tab question · q quit",
        };
        out.push(paint(&truncate(help, width), p.axis, c));

        out.join("\n")
    }

    fn quitting(&self) -> bool {
        self.quit
    }
}

impl App {
    fn view_showing(&self, showing: &Showing, width: usize, out: &mut Vec<String>) {
        let p = self.palette;
        let c = self.color;
        let scenario = &showing.scenario;

        let control = match &showing.scheduler {
            Some(s) if s.is_playing() => "◼ Simulating…",
            Some(_) => "▶ Run animation",
            None => "",
        };
        out.push(format!(
            "  {}  {}  {}",
            strong(&scenario.concept, p.text, c),
            paint(&format!("Category: {}", scenario.category.label()), p.accent, c),
            paint(control, p.text, c),
        ));

        let (cols, rows) = showing.canvas;
        let cursor = showing.scheduler.as_ref().map_or(0, Scheduler::cursor);
        let mut space = BrailleCanvas::new(cols, rows);
        let mut graph = BrailleCanvas::new(cols, rows);
        let drew_space = showing.stage.draw_space(&mut space, cursor);
        let drew_graph = showing.stage.draw_graph(&mut graph);

        let body = match (drew_space, drew_graph) {
            (true, true) => {
                side_by_side(&space.lines(c), &graph.lines(c), usize::from(cols), 2)
            }
            (true, false) => space.lines(c),
            (false, true) => graph.lines(c),
            (false, false) => vec![paint(
                "  This answer has nothing to draw for its view.",
                p.accent,
                c,
            )],
        };
        out.extend(body.into_iter().map(|l| format!(" {l}")));
        out.push(String::new());

        out.push(paint("  FINAL SOLUTION", p.accent, c));
        for line in wrap(&scenario.final_answer, width, "  ") {
            out.push(strong(&line, p.text, c));
        }
        if !scenario.assumptions.is_empty() {
            out.push(paint("  Assumptions:", p.accent, c));
            for assumption in &scenario.assumptions {
                for line in wrap(assumption, width, "    • ") {
                    out.push(line);
                }
            }
        }
        out.push(paint("  EDUCATIONAL INSIGHT", p.accent, c));
        for line in wrap(&scenario.teaching_note, width, "  ") {
            out.push(paint(&line, p.text, c));
        }
    }
}

/// The layout a scenario's stage will have.
fn layout_of(scenario: &Scenario) -> Layout {
    match (scenario.space().is_some(), scenario.graph().is_some()) {
        (true, true) => Layout::SideBySide,
        (true, false) => Layout::SpaceOnly,
        (false, true) => Layout::GraphOnly,
        (false, false) => Layout::Empty,
    }
}

/// Canvas cells for one view at the given terminal size.
pub fn canvas_size(width: u16, height: u16, layout: Layout) -> (u16, u16) {
    let rows = height
        .saturating_sub(HEADER_ROWS + FOOTER_ROWS)
        .clamp(MIN_CANVAS_ROWS, MAX_CANVAS_ROWS);
    let usable = width.saturating_sub(2);
    let cols = if layout == Layout::SideBySide {
        usable.saturating_sub(2) / 2
    } else {
        usable
    };
    (cols.max(MIN_CANVAS_COLS), rows)
}

/// Padding in virtual pixels for a canvas of `cols × rows` cells.
fn padding_for(cols: u16, rows: u16) -> f64 {
    let probe = BrailleCanvas::new(cols, rows);
    let (w, h) = kinema::Surface::size(&probe);
    (w.min(h) * 0.15).max(PIXELS_PER_DOT * 12.0)
}

fn mount(scenario: &Scenario, (cols, rows): (u16, u16)) -> Stage {
    let viewport = BrailleCanvas::new(cols, rows).viewport(padding_for(cols, rows));
    Stage::mount(scenario, viewport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Simulator;
    use kinema::{FixtureSource, parse_scenario};

    const FREE_FALL: &str = include_str!("../../kinema/tests/fixtures/free_fall.json");
    const BRAKING: &str = include_str!("../../kinema/tests/fixtures/braking_car.json");
    const GRAPH_ONLY: &str = include_str!("../../kinema/tests/fixtures/position_graph.json");

    fn app_with(json: &str) -> App {
        let scenario = parse_scenario(json).unwrap();
        let source = Arc::new(FixtureSource::from_scenario(scenario));
        App::new(source, &Config::default(), false)
    }

    fn key(code: KeyCode) -> Input {
        Input::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(sim: &mut Simulator<App>, text: &str) {
        for ch in text.chars() {
            sim.send(key(KeyCode::Char(ch)));
        }
        sim.run_until_empty();
    }

    fn ask(sim: &mut Simulator<App>, question: &str) {
        type_str(sim, question);
        sim.send(key(KeyCode::Enter));
        let cmds = sim.run_until_empty();
        assert_eq!(cmds.len(), 1);
        for cmd in cmds {
            sim.execute(cmd);
        }
        sim.run_until_empty();
    }

    #[test]
    fn test_submit_mounts_answer() {
        let mut sim = Simulator::new(app_with(FREE_FALL));
        ask(&mut sim, "drop a ball");

        let app = sim.model();
        assert_eq!(app.status(), &Status::Idle);
        assert_eq!(app.scenario().unwrap().concept, "Free fall from 50 m");
        assert_eq!(app.focus(), Focus::Controls);
        assert!(!app.is_playing());
        assert!(sim.last_view().unwrap().contains("FINAL SOLUTION"));
    }

    #[test]
    fn test_empty_question_is_ignored() {
        let mut sim = Simulator::new(app_with(FREE_FALL));
        type_str(&mut sim, "   ");
        sim.send(key(KeyCode::Enter));
        assert!(sim.run_until_empty().is_empty());
        assert_eq!(sim.model().status(), &Status::Idle);
    }

    #[test]
    fn test_failure_is_shown_verbatim() {
        let source = Arc::new(FixtureSource::from_path("/no/such/file.json"));
        let mut sim = Simulator::new(App::new(source, &Config::default(), false));
        ask(&mut sim, "anything");

        let Status::Failed(message) = sim.model().status() else {
            panic!("expected failure");
        };
        assert!(message.starts_with("Request failed"));
        assert!(sim.last_view().unwrap().contains("Request failed"));
    }

    #[test]
    fn test_stale_answer_is_ignored() {
        let mut sim = Simulator::new(app_with(FREE_FALL));
        type_str(&mut sim, "first");
        sim.send(key(KeyCode::Enter));
        let first = sim.run_until_empty();
        assert_eq!(first.len(), 1);

        sim.send(Msg::Answered {
            request: 0,
            result: Err(QueryError::EmptyResult),
        });
        sim.run_until_empty();
        assert_eq!(sim.model().status(), &Status::Loading);
    }

    #[test]
    fn test_play_stop_and_stale_frames() {
        let mut sim = Simulator::new(app_with(FREE_FALL));
        ask(&mut sim, "drop");

        sim.send(key(KeyCode::Char(' ')));
        let cmds = sim.run_until_empty();
        assert_eq!(cmds.len(), 1);
        assert!(sim.model().is_playing());

        // stop before the frame arrives; the in-flight frame must do nothing
        sim.send(key(KeyCode::Char(' ')));
        assert!(sim.run_until_empty().is_empty());
        assert!(!sim.model().is_playing());

        for cmd in cmds {
            sim.execute(cmd);
        }
        assert!(sim.run_until_empty().is_empty());
        assert_eq!(sim.model().cursor(), 0);
    }

    #[test]
    fn test_frames_keep_coming_while_playing() {
        let mut sim = Simulator::new(app_with(FREE_FALL));
        ask(&mut sim, "drop");
        sim.send(key(KeyCode::Char('p')));
        let mut cmds = sim.run_until_empty();

        for _ in 0..3 {
            assert_eq!(cmds.len(), 1);
            for cmd in cmds {
                sim.execute(cmd);
            }
            cmds = sim.run_until_empty();
        }
        assert!(sim.model().is_playing());
        assert!(sim.last_view().unwrap().contains("Simulating"));
    }

    #[test]
    fn test_reset_stops_and_rewinds() {
        let mut sim = Simulator::new(app_with(FREE_FALL));
        ask(&mut sim, "drop");
        sim.send(key(KeyCode::Char(' ')));
        sim.run_until_empty();
        sim.send(key(KeyCode::Char('r')));
        sim.run_until_empty();
        assert!(!sim.model().is_playing());
        assert_eq!(sim.model().cursor(), 0);
    }

    #[test]
    fn test_new_question_discards_previous_answer() {
        let mut sim = Simulator::new(app_with(FREE_FALL));
        ask(&mut sim, "drop");
        sim.send(key(KeyCode::Char(' ')));
        let frames = sim.run_until_empty();

        sim.send(key(KeyCode::Tab));
        type_str(&mut sim, " again");
        sim.send(key(KeyCode::Enter));
        let cmds = sim.run_until_empty();
        assert_eq!(cmds.len(), 1);
        assert!(sim.model().scenario().is_none());
        assert_eq!(sim.model().status(), &Status::Loading);

        for cmd in frames {
            sim.execute(cmd);
        }
        assert!(sim.run_until_empty().is_empty());
    }

    #[test]
    fn test_presets_fill_question() {
        let mut sim = Simulator::new(app_with(FREE_FALL));
        sim.send(key(KeyCode::F(2)));
        sim.run_until_empty();
        assert_eq!(sim.model().input(), "Simulate a braking car");

        sim.send(key(KeyCode::Tab));
        sim.send(key(KeyCode::Char('3')));
        sim.run_until_empty();
        assert_eq!(sim.model().input(), "Simulate a free fall");
        assert_eq!(sim.model().focus(), Focus::Question);
    }

    #[test]
    fn test_space_and_graph_side_by_side() {
        let mut sim = Simulator::new(app_with(BRAKING));
        sim.send(Input::Resize {
            width: 100,
            height: 40,
        });
        ask(&mut sim, "brake");
        let stage = sim.model().stage().unwrap();
        assert_eq!(stage.layout(), Layout::SideBySide);
        assert!(sim.last_view().unwrap().contains("VELOCITY VS TIME"));
    }

    #[test]
    fn test_graph_only_has_no_playback() {
        let mut sim = Simulator::new(app_with(GRAPH_ONLY));
        ask(&mut sim, "graph");
        assert!(sim.model().stage().unwrap().space().is_none());

        sim.send(key(KeyCode::Char(' ')));
        assert!(sim.run_until_empty().is_empty());
        assert!(!sim.model().is_playing());
    }

    #[test]
    fn test_quit_keys() {
        let mut sim = Simulator::new(app_with(FREE_FALL));
        sim.send(Input::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        sim.run_until_empty();
        assert!(sim.model().quitting());

        let mut sim = Simulator::new(app_with(FREE_FALL));
        type_str(&mut sim, "q");
        assert!(!sim.model().quitting());
        sim.send(key(KeyCode::Esc));
        sim.send(key(KeyCode::Char('q')));
        sim.run_until_empty();
        assert!(sim.model().quitting());
    }

    #[test]
    fn test_canvas_size() {
        assert_eq!(canvas_size(80, 40, Layout::SpaceOnly), (78, 22));
        assert_eq!(canvas_size(80, 40, Layout::SideBySide), (38, 22));
        assert_eq!(canvas_size(10, 5, Layout::SpaceOnly), (20, 6));
    }
}
