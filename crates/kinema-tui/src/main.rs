#![forbid(unsafe_code)]

//! # Kinema
//!
//! Ask a physics question, watch the motion.
//!
//! ## Usage
//!
//! ```bash
//! kinema                                  # interactive view
//! kinema --scenario free_fall.json        # interactive, preloaded
//! kinema ask "A car brakes from 20 m/s"   # scenario JSON to stdout
//! kinema render --scenario s.json --at 2 -o frame.svg
//! kinema show --scenario s.json           # summary and final frame
//! kinema config                           # effective configuration
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use kinema::{Config, FixtureSource, GeminiClient};
use tracing::info;

use kinema_tui::{App, Cli, Command, Program, commands, logging};

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let config = cli.apply(config.with_env());
    config.validate()?;
    Ok(config)
}

fn interactive(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let source = Arc::new(GeminiClient::from_config(config)?);
    let mut app = App::new(source, config, !cli.no_color);
    if let Some(path) = &cli.scenario {
        app.show(FixtureSource::load(path)?);
    }

    info!(model = %config.model, fps = config.fps, "starting interactive view");
    Program::new(app)
        .with_alt_screen()
        .with_fps(config.fps)
        .run()
        .context("terminal error")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let log_file = if cli.is_interactive() {
        cli.log_file.clone().or_else(logging::default_log_path)
    } else {
        cli.log_file.clone()
    };
    logging::init(cli.verbose, log_file.as_deref())?;

    let config = load_config(&cli)?;

    match &cli.command {
        None => interactive(&cli, &config),
        Some(Command::Ask { question }) => {
            commands::ask(&config, &question.join(" "), &mut io::stdout().lock())
        }
        Some(Command::Render(args)) => commands::render(&config, args),
        Some(Command::Show {
            scenario,
            width,
            height,
        }) => commands::show(
            scenario,
            *width,
            *height,
            !cli.no_color,
            &mut io::stdout().lock(),
        ),
        Some(Command::Config) => {
            writeln!(io::stdout().lock(), "{}", config.to_diagnostic_string())?;
            Ok(())
        }
    }
}
