use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::core::audio::{AudioSink, Muted, TerminalBell};
use crate::games::slot::assets::{AssetBundle, Manifest, AUDIO_CUES, VISUAL_ASSETS};
use crate::games::slot;

#[derive(Parser)]
#[command(name = "slotterm")]
#[command(about = "🎰 Pick up to five symbols, spin the reel, hope for a match")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub play: PlayArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play the slot game (default)
    Play(PlayArgs),
    /// Check an asset manifest and list its entries
    Assets {
        /// Manifest to check; the built-in one when omitted
        manifest: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// Asset manifest to load instead of the built-in art
    #[arg(long, env = "SLOTTERM_ASSETS")]
    pub assets: Option<PathBuf>,

    /// Seed for reproducible draws
    #[arg(long, env = "SLOTTERM_SEED")]
    pub seed: Option<u64>,

    /// Disable audio cues
    #[arg(long)]
    pub mute: bool,

    /// Where logs go while the game owns the terminal
    #[arg(long, env = "SLOTTERM_LOG_FILE", default_value = "slotterm.log")]
    pub log_file: PathBuf,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play(args)) => play(args).await,
        Some(Commands::Assets { manifest }) => {
            init_stderr_logging();
            list_assets(manifest.as_deref())
        }
        None => play(cli.play).await,
    }
}

async fn play(args: PlayArgs) -> Result<()> {
    init_file_logging(&args.log_file)?;

    // Assets must all resolve before the terminal is taken over.
    let bundle = load_bundle(args.assets.as_deref())?;
    let audio: Arc<dyn AudioSink> = if args.mute {
        Arc::new(Muted)
    } else {
        Arc::new(TerminalBell::new(bundle.cues.clone()))
    };

    info!(assets = ?args.assets, mute = args.mute, "launching");
    let terminal = ratatui::init();
    let result = slot::run_game(bundle, args.seed, audio, terminal).await;
    ratatui::restore();
    result
}

pub fn load_bundle(path: Option<&Path>) -> Result<AssetBundle> {
    match path {
        Some(path) => AssetBundle::load(path)
            .with_context(|| format!("failed to load assets from {}", path.display())),
        None => AssetBundle::builtin().context("failed to load built-in assets"),
    }
}

fn list_assets(path: Option<&Path>) -> Result<()> {
    let manifest = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Manifest::from_json(&json)?
        }
        None => Manifest::embedded()?,
    };

    println!("🖼️  Visuals:");
    for name in VISUAL_ASSETS {
        match manifest.visuals.get(name) {
            Some(entry) => println!("   {:<12} {}", name, entry.file.display()),
            None => println!("   {:<12} MISSING", name),
        }
    }
    println!("🔔 Audio cues:");
    for name in AUDIO_CUES {
        match manifest.audio.get(name) {
            Some(entry) => println!("   {:<12} {} bell(s)", name, entry.bells),
            None => println!("   {:<12} MISSING", name),
        }
    }

    // Resolve every file too, so a broken path is caught here rather than at launch.
    load_bundle(path)?;
    println!("✅ All assets resolved");
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_file_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_flags_mean_play() {
        let cli = Cli::try_parse_from(["slotterm", "--seed", "42", "--mute"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.play.seed, Some(42));
        assert!(cli.play.mute);
    }

    #[test]
    fn assets_subcommand_takes_a_path() {
        let cli = Cli::try_parse_from(["slotterm", "assets", "assets/manifest.json"]).unwrap();
        match cli.command {
            Some(Commands::Assets { manifest }) => {
                assert_eq!(manifest, Some(PathBuf::from("assets/manifest.json")))
            }
            _ => panic!("expected the assets subcommand"),
        }
    }

    #[test]
    fn missing_manifest_is_fatal() {
        let err = load_bundle(Some(Path::new("/nonexistent/manifest.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to load assets"));
    }
}
