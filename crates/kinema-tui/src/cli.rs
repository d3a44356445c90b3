//! Command-line interface.
//!
//! ```bash
//! # Ask interactively
//! kinema
//!
//! # Start with a stored scenario instead of asking
//! kinema --scenario scenarios/free_fall.json
//!
//! # Print the scenario JSON for a question
//! kinema ask "A ball is dropped from 50 m. When does it land?"
//!
//! # Export the frame at t = 1.5 s as SVG
//! kinema render --scenario scenarios/free_fall.json --at 1.5 --out frame.svg
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kinema::Config;

/// Ask a physics question, watch the motion.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "kinema",
    author,
    version,
    about = "Ask a physics question, watch the motion",
    long_about = "Turns a classical-mechanics question into a short animation in the terminal. \
                  A language model supplies the motion data; kinema plays it back."
)]
pub struct Cli {
    /// Config file (TOML)
    ///
    /// Defaults to the platform config directory, e.g. ~/.config/kinema/config.toml
    #[arg(long, global = true, env = "KINEMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model service API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Playback frame rate
    #[arg(long, global = true)]
    pub fps: Option<u32>,

    /// Start the interactive view with this scenario instead of asking
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    pub no_color: bool,

    /// Write logs to this file
    ///
    /// The interactive view always logs to a file; other commands log to
    /// stderr unless this is set.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand; the interactive view when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ask a question and print the scenario as JSON
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Export one frame of a scenario as SVG
    Render(RenderArgs),

    /// Print a scenario summary and its final frame
    Show {
        /// Scenario JSON file
        #[arg(long)]
        scenario: PathBuf,

        /// Frame width in terminal columns
        #[arg(long, default_value = "60")]
        width: u16,

        /// Frame height in terminal rows
        #[arg(long, default_value = "20")]
        height: u16,
    },

    /// Print the effective configuration
    Config,
}

/// Arguments for `render`.
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    /// Scenario JSON file
    #[arg(long)]
    pub scenario: PathBuf,

    /// Playback time in seconds
    #[arg(long, default_value = "0")]
    pub at: f64,

    /// Output SVG file
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    /// Export the graph view instead of the space view
    #[arg(long)]
    pub graph: bool,
}

impl Cli {
    /// Parse command line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create CLI from iterator (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if argument parsing fails.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Whether the interactive view will run.
    pub const fn is_interactive(&self) -> bool {
        self.command.is_none()
    }

    /// Layers flags over `config`.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            config.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        config
    }
}
