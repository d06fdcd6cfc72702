//! HDialogue CLI - browse and play Hades dialogue from the command line

pub mod args;
pub mod commands;
pub mod progress;

use std::io;

use clap::{ArgGroup, Parser};

use crate::audio::CommandPlayer;
use crate::catalog::EntityKind;
use args::CommonArgs;

#[derive(Parser)]
#[command(name = "hdialogue", version)]
#[command(about = "Play Hades dialogue voiceovers with subtitles", long_about = None)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["npc", "enemy", "loot", "show"]),
))]
struct Cli {
    /// NPC to play dialogue for
    #[arg(short, long, value_name = "ID")]
    npc: Option<String>,

    /// Enemy to play dialogue for
    #[arg(short, long, value_name = "ID")]
    enemy: Option<String>,

    /// Boon giver (loot) to play dialogue for
    #[arg(short, long, value_name = "ID")]
    loot: Option<String>,

    /// Show the available NPCs, enemies and loot
    #[arg(short, long)]
    show: bool,

    /// Dialogue id to play, or "list" to print the ids
    #[arg(short, long, value_name = "ID|list")]
    which: Option<String>,

    /// Only play dialogue whose id starts with this prefix
    #[arg(short, long, value_name = "PREFIX", conflicts_with = "which")]
    prefix: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

impl Cli {
    fn target(&self) -> Option<(EntityKind, &str)> {
        self.npc
            .as_deref()
            .map(|id| (EntityKind::Npc, id))
            .or_else(|| self.enemy.as_deref().map(|id| (EntityKind::Enemy, id)))
            .or_else(|| self.loot.as_deref().map(|id| (EntityKind::Loot, id)))
    }
}

/// Run the HDialogue CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.common.init_logging();

    let config = cli.common.resolve_config()?;
    let dialogue = progress::load_dialogue(&config)?;
    let mut stdout = io::stdout();

    let Some((kind, id)) = cli.target() else {
        commands::show(&dialogue.catalog, &mut stdout)?;
        return Ok(());
    };

    let entity = dialogue.catalog.get_entity(kind, id)?;
    match cli.which.as_deref() {
        Some("list") => commands::list(entity, &mut stdout)?,
        Some(which) => {
            let player = CommandPlayer::new(&config.media_player)?;
            commands::play_one(entity, which, player, &mut stdout)?;
        }
        None => {
            let player = CommandPlayer::new(&config.media_player)?;
            commands::play_all(
                entity,
                cli.prefix.as_deref(),
                player,
                &mut io::stdin().lock(),
                &mut stdout,
            )?;
        }
    }
    Ok(())
}
