//! Program lifecycle and event loop.
//!
//! A small Elm-architecture runtime: the [`Model`] owns all state, terminal
//! input and command results arrive as messages, and [`Model::view`] renders
//! the whole screen as a string. Commands run on their own threads and
//! report back through a channel; only the event loop calls `update`.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyEvent, KeyEventKind},
    execute, queue,
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use tracing::debug;

/// Errors from running a program.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Terminal setup, polling or output failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized [`Result`] type for program operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal input, converted into the model's message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A key press.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
}

/// A side effect that may produce a message.
///
/// Commands are lazy: `update` returns them and the program runs them on a
/// worker thread.
pub struct Cmd<M>(Box<dyn FnOnce() -> Option<M> + Send + 'static>);

impl<M> Cmd<M> {
    /// Create a new command from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self(Box::new(move || Some(f())))
    }

    /// Execute the command and return the resulting message.
    pub fn execute(self) -> Option<M> {
        (self.0)()
    }
}

impl<M> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmd").finish_non_exhaustive()
    }
}

/// Command that produces a message after `duration`.
pub fn tick<M, F>(duration: Duration, f: F) -> Cmd<M>
where
    F: FnOnce(Instant) -> M + Send + 'static,
{
    Cmd::new(move || {
        thread::sleep(duration);
        f(Instant::now())
    })
}

/// An application driven by the program.
pub trait Model: Send + 'static {
    /// Messages the model handles.
    type Msg: From<Input> + Send + 'static;

    /// Startup command.
    fn init(&self) -> Option<Cmd<Self::Msg>>;

    /// Apply a message and return the next command.
    fn update(&mut self, msg: Self::Msg) -> Option<Cmd<Self::Msg>>;

    /// Render the whole screen.
    fn view(&self) -> String;

    /// Whether the program should exit after this update.
    fn quitting(&self) -> bool;
}

/// Runs a [`Model`] against the terminal.
pub struct Program<M: Model> {
    model: M,
    alt_screen: bool,
    poll_interval: Duration,
}

impl<M: Model> Program<M> {
    /// Creates a program for `model`.
    pub fn new(model: M) -> Self {
        Self {
            model,
            alt_screen: false,
            poll_interval: kinema::fps(60),
        }
    }

    /// Use the alternate screen buffer.
    #[must_use]
    pub const fn with_alt_screen(mut self) -> Self {
        self.alt_screen = true;
        self
    }

    /// How often input is polled and the screen redrawn.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.poll_interval = kinema::fps(fps);
        self
    }

    /// Run the program on stdout and return the final model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the terminal cannot be driven.
    pub fn run(self) -> Result<M> {
        self.run_with_writer(io::stdout())
    }

    /// Run the program with a custom writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the terminal cannot be driven.
    pub fn run_with_writer<W: Write>(self, mut writer: W) -> Result<M> {
        let alt_screen = self.alt_screen;

        enable_raw_mode()?;
        if alt_screen {
            execute!(writer, EnterAlternateScreen)?;
        }
        execute!(writer, Hide)?;

        let result = self.event_loop(&mut writer);

        let _ = execute!(writer, Show);
        if alt_screen {
            let _ = execute!(writer, LeaveAlternateScreen);
        }
        let _ = disable_raw_mode();

        result
    }

    fn event_loop<W: Write>(mut self, writer: &mut W) -> Result<M> {
        let (tx, rx): (Sender<M::Msg>, Receiver<M::Msg>) = mpsc::channel();

        if let Ok((width, height)) = terminal::size() {
            let _ = tx.send(Input::Resize { width, height }.into());
        }

        if let Some(cmd) = self.model.init() {
            spawn_command(cmd, tx.clone());
        }

        let mut last_view = String::new();
        render(writer, &self.model.view(), &mut last_view)?;

        loop {
            if event::poll(self.poll_interval)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        let _ = tx.send(Input::Key(key).into());
                    }
                    Event::Resize(width, height) => {
                        last_view.clear();
                        let _ = tx.send(Input::Resize { width, height }.into());
                    }
                    _ => {}
                }
            }

            let mut needs_render = false;
            while let Ok(msg) = rx.try_recv() {
                if let Some(cmd) = self.model.update(msg) {
                    spawn_command(cmd, tx.clone());
                }
                if self.model.quitting() {
                    debug!("quit requested");
                    return Ok(self.model);
                }
                needs_render = true;
            }

            if needs_render {
                render(writer, &self.model.view(), &mut last_view)?;
            }
        }
    }
}

fn spawn_command<M: Send + 'static>(cmd: Cmd<M>, tx: Sender<M>) {
    thread::spawn(move || {
        if let Some(msg) = cmd.execute() {
            let _ = tx.send(msg);
        }
    });
}

/// Writes `view` line by line, skipping the write when nothing changed.
fn render<W: Write>(writer: &mut W, view: &str, last_view: &mut String) -> Result<()> {
    if view == last_view {
        return Ok(());
    }

    let mut row: u16 = 0;
    for line in view.lines() {
        queue!(writer, MoveTo(0, row))?;
        write!(writer, "{line}")?;
        queue!(writer, Clear(ClearType::UntilNewLine))?;
        row = row.saturating_add(1);
    }
    queue!(writer, MoveTo(0, row), Clear(ClearType::FromCursorDown))?;
    writer.flush()?;

    view.clone_into(last_view);
    Ok(())
}

/// Drives a model without a terminal.
///
/// Commands are returned to the caller rather than spawned, so tests decide
/// which ones to run and in what order.
pub struct Simulator<M: Model> {
    model: M,
    queue: VecDeque<M::Msg>,
    views: Vec<String>,
}

impl<M: Model> Simulator<M> {
    /// Create a new simulator with the given model.
    pub fn new(model: M) -> Self {
        Self {
            model,
            queue: VecDeque::new(),
            views: Vec::new(),
        }
    }

    /// Queue a message.
    pub fn send(&mut self, msg: impl Into<M::Msg>) {
        self.queue.push_back(msg.into());
    }

    /// Process one queued message. Returns the command from `update`.
    pub fn step(&mut self) -> Option<Cmd<M::Msg>> {
        let msg = self.queue.pop_front()?;
        let cmd = self.model.update(msg);
        self.views.push(self.model.view());
        cmd
    }

    /// Process every queued message, collecting the commands.
    pub fn run_until_empty(&mut self) -> Vec<Cmd<M::Msg>> {
        let mut cmds = Vec::new();
        while !self.queue.is_empty() {
            cmds.extend(self.step());
        }
        cmds
    }

    /// Runs `cmd` on this thread and queues its message.
    pub fn execute(&mut self, cmd: Cmd<M::Msg>) {
        if let Some(msg) = cmd.execute() {
            self.queue.push_back(msg);
        }
    }

    /// The model.
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// The most recent view, if any message has been processed.
    pub fn last_view(&self) -> Option<&str> {
        self.views.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[derive(Debug)]
    enum Msg {
        Input(Input),
        Add(i32),
    }

    impl From<Input> for Msg {
        fn from(input: Input) -> Self {
            Self::Input(input)
        }
    }

    #[derive(Default)]
    struct Counter {
        count: i32,
        quit: bool,
    }

    impl Model for Counter {
        type Msg = Msg;

        fn init(&self) -> Option<Cmd<Msg>> {
            None
        }

        fn update(&mut self, msg: Msg) -> Option<Cmd<Msg>> {
            match msg {
                Msg::Add(n) => self.count += n,
                Msg::Input(Input::Key(key)) if key.code == KeyCode::Char('q') => self.quit = true,
                Msg::Input(Input::Key(_)) => return Some(Cmd::new(|| Msg::Add(1))),
                Msg::Input(Input::Resize { .. }) => {}
            }
            None
        }

        fn view(&self) -> String {
            format!("Count: {}", self.count)
        }

        fn quitting(&self) -> bool {
            self.quit
        }
    }

    fn key(c: char) -> Input {
        Input::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_simulator_runs_returned_commands() {
        let mut sim = Simulator::new(Counter::default());
        sim.send(key('a'));
        let cmd = sim.step().unwrap();
        assert_eq!(sim.model().count, 0);

        sim.execute(cmd);
        sim.step();
        assert_eq!(sim.model().count, 1);
        assert_eq!(sim.last_view(), Some("Count: 1"));
    }

    #[test]
    fn test_simulator_quit() {
        let mut sim = Simulator::new(Counter::default());
        sim.send(key('q'));
        assert!(sim.run_until_empty().is_empty());
        assert!(sim.model().quitting());
    }

    #[test]
    fn test_tick_waits() {
        let start = Instant::now();
        let cmd: Cmd<Instant> = tick(Duration::from_millis(20), |at| at);
        let at = cmd.execute().unwrap();
        assert!(at.duration_since(start) >= Duration::from_millis(20));
    }

    #[test]
    fn test_render_skips_unchanged_view() {
        let mut out = Vec::new();
        let mut last = String::new();
        render(&mut out, "a\nb", &mut last).unwrap();
        assert!(!out.is_empty());
        assert_eq!(last, "a\nb");

        out.clear();
        render(&mut out, "a\nb", &mut last).unwrap();
        assert!(out.is_empty());
    }
}
