use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use foundation::{Feature, FeatureId};
use layers::buildings::building_layers;
use serde::Serialize;
use story::config::ACCESS_TOKEN_ENV;
use story::{
    Key, Mode, NarrativeView, Phase, RecordingSurface, StepTable, StoryConfig, StoryEngine, StoryError,
    SurfaceCommand,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storymap", about = "Inspect and replay map story step tables")]
struct Cli {
    /// Authored step table (JSON). Defaults to the built-in Khartoum story.
    #[arg(long, global = true)]
    steps: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the step table and print a one-line summary per step.
    Validate,
    /// Print the source and layer specs added on map load.
    Layers,
    /// Replay a script of story events against an in-memory map and print
    /// every map command followed by the final narrative view.
    ///
    /// Events: `next`, `prev`, `esc` (or DOM key names), `explore`,
    /// `pre`, `post`, `goto:N`, `click:ID`, `reset`.
    Replay {
        #[arg(long, env = ACCESS_TOKEN_ENV, hide_env_values = true, default_value = "")]
        token: String,
        /// Read events from a file, whitespace separated.
        #[arg(long, conflicts_with = "events")]
        script: Option<PathBuf>,
        events: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), StoryError> {
    let cli = Cli::parse();
    let table = load_table(cli.steps.as_deref())?;

    match cli.command {
        Command::Validate => cmd_validate(&table),
        Command::Layers => cmd_layers(),
        Command::Replay {
            token,
            script,
            events,
        } => {
            let config = StoryConfig::with_token(token);
            config.require_token()?;
            let events = match script {
                Some(path) => read_script(&path)?,
                None => events,
            };
            cmd_replay(table, config, &events)
        }
    }
}

fn load_table(path: Option<&Path>) -> Result<StepTable, StoryError> {
    match path {
        Some(path) => {
            let table = StepTable::from_path(path)?;
            info!(path = %path.display(), steps = table.len(), "loaded step table");
            Ok(table)
        }
        None => Ok(StepTable::khartoum()),
    }
}

fn cmd_validate(table: &StepTable) -> Result<(), StoryError> {
    for (i, step) in table.iter().enumerate() {
        println!(
            "{:>2}  {:<20} {:<13} zoom {:>5.2}  {}",
            i + 1,
            step.id,
            step.mode().map_or("-", Mode::label),
            step.camera.zoom,
            step.title
        );
    }
    println!("ok: {} steps", table.len());
    Ok(())
}

#[derive(Serialize)]
struct LayerDump {
    source: serde_json::Value,
    layers: Vec<serde_json::Value>,
}

fn cmd_layers() -> Result<(), StoryError> {
    let source = StoryConfig::default().source;
    let dump = LayerDump {
        source: source.to_json(),
        layers: building_layers(&source).iter().map(|l| l.to_json()).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(())
}

fn cmd_replay(table: StepTable, config: StoryConfig, events: &[String]) -> Result<(), StoryError> {
    let (commands, view) = replay(table, config, events)?;
    for command in &commands {
        println!("{}", serde_json::to_string(command)?);
    }
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn read_script(path: &Path) -> Result<Vec<String>, StoryError> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect())
}

/// One scripted user action.
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Key(Key),
    ToggleExplore,
    Phase(Phase),
    GoTo(usize),
    Click(FeatureId),
    Reset,
}

fn parse_event(token: &str) -> Result<Event, StoryError> {
    let bad = |reason: &str| StoryError::InvalidEvent {
        token: token.to_string(),
        reason: reason.to_string(),
    };
    let event = match token {
        "next" | "right" => Event::Key(Key::ArrowRight),
        "prev" | "left" => Event::Key(Key::ArrowLeft),
        "esc" => Event::Key(Key::Escape),
        "explore" => Event::ToggleExplore,
        "pre" => Event::Phase(Phase::Pre),
        "post" => Event::Phase(Phase::Post),
        "reset" => Event::Reset,
        _ => {
            if let Some(n) = token.strip_prefix("goto:") {
                let n: usize = n.parse().map_err(|_| bad("goto expects a step number"))?;
                // Script step numbers are 1-based like the progress label.
                Event::GoTo(n.saturating_sub(1))
            } else if let Some(id) = token.strip_prefix("click:") {
                Event::Click(match id.parse::<i64>() {
                    Ok(n) => FeatureId::Number(n),
                    Err(_) => FeatureId::Text(id.to_string()),
                })
            } else {
                match Key::from_dom(token) {
                    Key::Other => return Err(bad("unknown replay event")),
                    key => Event::Key(key),
                }
            }
        }
    };
    Ok(event)
}

fn replay(
    table: StepTable,
    config: StoryConfig,
    events: &[String],
) -> Result<(Vec<SurfaceCommand>, NarrativeView), StoryError> {
    let events = events
        .iter()
        .map(|t| parse_event(t))
        .collect::<Result<Vec<_>, _>>()?;

    let mut engine = StoryEngine::new(RecordingSurface::new(), table, config.source);
    engine.on_load();
    for event in events {
        debug!(?event, "replay");
        match event {
            Event::Key(key) => {
                engine.handle_key(key);
            }
            Event::ToggleExplore => engine.toggle_explore(),
            Event::Phase(phase) => engine.select_phase(phase),
            Event::GoTo(index) => engine.go_to_step(index),
            Event::Click(id) => engine.on_click(Some(&Feature::new(id))),
            Event::Reset => engine.reset_selection(),
        }
    }
    let view = engine.view();
    let commands = engine.teardown().commands().to_vec();
    Ok((commands, view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn events(script: &str) -> Vec<String> {
        script.split_whitespace().map(str::to_string).collect()
    }

    fn run(script: &str) -> (Vec<SurfaceCommand>, NarrativeView) {
        replay(StepTable::khartoum(), StoryConfig::with_token("pk.test"), &events(script)).unwrap()
    }

    #[test]
    fn parses_events() {
        assert_eq!(parse_event("next").unwrap(), Event::Key(Key::ArrowRight));
        assert_eq!(parse_event("ArrowLeft").unwrap(), Event::Key(Key::ArrowLeft));
        assert_eq!(parse_event("goto:3").unwrap(), Event::GoTo(2));
        assert_eq!(
            parse_event("click:42").unwrap(),
            Event::Click(FeatureId::Number(42))
        );
        assert_eq!(
            parse_event("click:way/7").unwrap(),
            Event::Click(FeatureId::Text("way/7".into()))
        );
        assert!(parse_event("jump").is_err());
        assert!(parse_event("goto:x").is_err());
    }

    #[test]
    fn replay_walks_to_last_step() {
        let (_, view) = run("next next next next next next next");
        assert_eq!(view.step_index, 6);
        assert_eq!(view.step_id, "explore");
        assert!(!view.can_go_next);
    }

    #[test]
    fn replay_records_map_commands() {
        let (commands, _) = run("next");
        let flights = commands
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::FlyTo(_)))
            .count();
        // Initial step on load, then the second step.
        assert_eq!(flights, 2);
        assert_eq!(commands.last(), Some(&SurfaceCommand::Remove));
    }

    #[test]
    fn replay_click_then_reset() {
        let (_, view) = run("click:42");
        assert!(view.inspect.is_some());
        let (_, view) = run("click:42 reset");
        assert_eq!(view.inspect, None);
    }

    #[test]
    fn script_comments_are_ignored() {
        let dir = std::env::temp_dir().join(format!("storymap-script-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("walk.txt");
        fs::write(&path, "# opening\nnext next\npost # jump ahead\n").unwrap();
        assert_eq!(read_script(&path).unwrap(), vec!["next", "next", "post"]);
        let _ = fs::remove_dir_all(&dir);
    }
}
