#![forbid(unsafe_code)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

//! # Kinema TUI
//!
//! Terminal front end for [`kinema`].
//!
//! - **Program**: a small Elm-style runtime (model, messages, commands)
//! - **App**: the question/answer/playback screen
//! - **Canvas**: a braille [`Surface`](kinema::Surface) for the renderers
//! - **Commands**: the one-shot `ask`, `render` and `show` subcommands

pub mod app;
pub mod canvas;
pub mod cli;
pub mod commands;
pub mod logging;
pub mod program;
pub mod view;

pub use app::App;
pub use canvas::BrailleCanvas;
pub use cli::{Cli, Command, RenderArgs};
pub use program::{Cmd, Input, Model, Program, Simulator};
