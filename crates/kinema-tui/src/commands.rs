//! One-shot subcommands.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, bail};
use kinema::{Config, FixtureSource, GeminiClient, Scenario, ScenarioSource, Stage, SvgSurface};
use tracing::info;

use crate::canvas::BrailleCanvas;
use crate::cli::RenderArgs;
use crate::view::wrap;

/// `kinema ask`: prints the scenario JSON.
pub fn ask(config: &Config, question: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let client = GeminiClient::from_config(config)?;
    let scenario = client.ask(question)?;
    serde_json::to_writer_pretty(&mut *out, &scenario)?;
    writeln!(out)?;
    Ok(())
}

/// Which view `render` exports.
fn wants_graph(scenario: &Scenario, flag: bool) -> anyhow::Result<bool> {
    match (scenario.space().is_some(), scenario.graph().is_some()) {
        (_, true) if flag => Ok(true),
        (_, false) if flag => bail!("this scenario has no graph view"),
        (true, _) => Ok(false),
        (false, true) => Ok(true),
        (false, false) => bail!("this scenario has nothing to draw"),
    }
}

/// `kinema render`: writes one frame as SVG.
pub fn render(config: &Config, args: &RenderArgs) -> anyhow::Result<()> {
    if !args.at.is_finite() || args.at < 0.0 {
        bail!("--at must be a non-negative number of seconds");
    }
    let scenario = FixtureSource::load(&args.scenario)?;
    let graph = wants_graph(&scenario, args.graph)?;

    let viewport = config.viewport();
    let stage = Stage::mount(&scenario, viewport);
    let mut svg = SvgSurface::new(viewport.width, viewport.height);

    if graph {
        stage.draw_graph(&mut svg);
    } else {
        let cursor = scenario
            .space()
            .map_or(0, |space| space.motion.index_at(args.at));
        stage.draw_space(&mut svg, cursor);
        info!(at = args.at, cursor, "space frame rendered");
    }

    write_file(&args.out, &svg.finish())
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))
}

/// `kinema show`: prints a summary and the final frame.
pub fn show(
    scenario_path: &Path,
    width: u16,
    height: u16,
    color: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let scenario = FixtureSource::load(scenario_path)?;
    let text_width = usize::from(width.max(20));

    writeln!(out, "{} ({})", scenario.concept, scenario.category.label())?;
    writeln!(out)?;

    let mut canvas = BrailleCanvas::new(width.max(10), height.max(4));
    let stage = Stage::mount(&scenario, canvas.viewport(32.0));
    let last = scenario.space().map_or(0, |space| space.motion.last_index());
    if stage.draw_space(&mut canvas, last) || stage.draw_graph(&mut canvas) {
        writeln!(out, "{}", canvas.render(color))?;
        writeln!(out)?;
    }

    writeln!(out, "Final solution:")?;
    for line in wrap(&scenario.final_answer, text_width, "  ") {
        writeln!(out, "{line}")?;
    }
    if !scenario.assumptions.is_empty() {
        writeln!(out, "Assumptions:")?;
        for assumption in &scenario.assumptions {
            for line in wrap(assumption, text_width, "  - ") {
                writeln!(out, "{line}")?;
            }
        }
    }
    writeln!(out, "Insight:")?;
    for line in wrap(&scenario.teaching_note, text_width, "  ") {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../kinema/tests/fixtures");

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(FIXTURES).join(name)
    }

    #[test]
    fn test_graph_choice() {
        let braking = FixtureSource::load(&fixture("braking_car.json")).unwrap();
        assert!(!wants_graph(&braking, false).unwrap());
        assert!(wants_graph(&braking, true).unwrap());

        let fall = FixtureSource::load(&fixture("free_fall.json")).unwrap();
        assert!(wants_graph(&fall, true).is_err());

        let graph_only = FixtureSource::load(&fixture("position_graph.json")).unwrap();
        assert!(wants_graph(&graph_only, false).unwrap());
    }

    #[test]
    fn test_render_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let args = RenderArgs {
            scenario: fixture("free_fall.json"),
            at: 1.5,
            out: dir.path().join("frames/one.svg"),
            graph: false,
        };
        render(&Config::default(), &args).unwrap();
        let svg = fs::read_to_string(&args.out).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("t = 1.0s"));
    }

    #[test]
    fn test_render_rejects_negative_time() {
        let args = RenderArgs {
            scenario: fixture("free_fall.json"),
            at: -1.0,
            out: "unused.svg".into(),
            graph: false,
        };
        assert!(render(&Config::default(), &args).is_err());
    }

    #[test]
    fn test_show_prints_panels() {
        let mut out = Vec::new();
        show(&fixture("free_fall.json"), 40, 12, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Free fall from 50 m (Free fall)"));
        assert!(text.contains("Final solution:"));
        assert!(text.contains("Insight:"));
    }

    #[test]
    fn test_ask_without_key_fails() {
        let config = Config {
            api_key: None,
            ..Config::default()
        };
        let mut out = Vec::new();
        let err = ask(&config, "anything", &mut out).unwrap_err();
        assert!(err.to_string().contains("No API key"));
        assert!(out.is_empty());
    }
}
