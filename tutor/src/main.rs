//! Command-line front end for the tutorial engine.
//!
//! Every subcommand prints exactly one text response on stdout. Missing
//! tutorials, lessons or content are answers, not failures; only config and
//! filesystem errors end with a non-zero exit.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tutor::engine::{Engine, JumpParams, ResetParams, StartParams};
use tutor::io::catalog::Catalog;
use tutor::io::config::{TutorConfig, load_config, write_config};
use tutor::io::content::ContentLoader;
use tutor::io::state_store::StateStore;
use tutor::logging;

#[derive(Parser)]
#[command(name = "tutor", version, about = "Interactive multi-lesson tutorials")]
struct Cli {
    /// Config file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "tutor.toml")]
    config: PathBuf,

    /// Override `content_dir` from the config.
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    /// Override `cache_dir` from the config.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// List tutorials, or start/resume one by name or number.
    Start { tutorial: Option<String> },
    /// Complete the current step and show the next one.
    Next,
    /// Show the current position and overall progress.
    Status,
    /// Go to a tutorial, lesson or step, completing everything before it.
    Jump {
        tutorial: String,
        #[arg(long)]
        lesson: Option<String>,
        #[arg(long)]
        step: Option<String>,
    },
    /// Clear all progress (preview unless `--confirm`).
    Reset {
        #[arg(long)]
        confirm: bool,
    },
    /// Check content and stored state for problems.
    Check,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    if let Command::Init { force } = cli.command {
        return cmd_init(&cli.config, force);
    }

    let config = resolve_config(&cli)?;
    let paths = config.paths()?;
    debug!(
        content_dir = %paths.content_dir.display(),
        cache_dir = %paths.cache_dir.display(),
        "resolved tutor paths"
    );
    let store = StateStore::new(paths.clone());
    let mut content = ContentLoader::new(
        Catalog::new(paths.content_dir()),
        config.content_cache_capacity,
    );
    let mut engine = Engine::new(&store, &mut content);

    let response = match cli.command {
        Command::Init { .. } => unreachable!("handled above"),
        Command::Start { tutorial } => engine.start(&StartParams {
            tutorial_name: tutorial,
        }),
        Command::Next => engine.next(),
        Command::Status => engine.status(),
        Command::Jump {
            tutorial,
            lesson,
            step,
        } => engine.jump(&JumpParams {
            tutorial_name: tutorial,
            lesson_name: lesson,
            step_name: step,
        }),
        Command::Reset { confirm } => engine.reset(&ResetParams {
            confirm: Some(confirm),
        }),
        Command::Check => engine.diagnose(),
    };
    println!("{response}");
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<TutorConfig> {
    let mut config = load_config(&cli.config)?;
    if let Some(dir) = &cli.content_dir {
        config.content_dir = dir.clone();
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &TutorConfig::default())?;
    println!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_start_without_name() {
        let cli = Cli::parse_from(["tutor", "start"]);
        assert!(matches!(cli.command, Command::Start { tutorial: None }));
        assert_eq!(cli.config, PathBuf::from("tutor.toml"));
    }

    #[test]
    fn parse_jump_with_lesson_and_step() {
        let cli = Cli::parse_from([
            "tutor", "jump", "rust", "--lesson", "basics", "--step", "hello",
        ]);
        match cli.command {
            Command::Jump {
                tutorial,
                lesson,
                step,
            } => {
                assert_eq!(tutorial, "rust");
                assert_eq!(lesson.as_deref(), Some("basics"));
                assert_eq!(step.as_deref(), Some("hello"));
            }
            _ => panic!("expected jump"),
        }
    }

    #[test]
    fn global_overrides_apply_after_subcommand() {
        let cli = Cli::parse_from(["tutor", "status", "--content-dir", "docs/tutorials"]);
        let temp = tempfile::tempdir().expect("tempdir");
        let cli = Cli {
            config: temp.path().join("missing.toml"),
            ..cli
        };
        let config = resolve_config(&cli).expect("config");
        assert_eq!(config.content_dir, PathBuf::from("docs/tutorials"));
        assert_eq!(config.content_cache_capacity, 10);
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("tutor.toml");
        cmd_init(&path, false).expect("first init");
        assert!(cmd_init(&path, false).is_err());
        cmd_init(&path, true).expect("forced init");
        assert_eq!(load_config(&path).expect("load"), TutorConfig::default());
    }
}
