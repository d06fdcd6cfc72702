//! # HDPlay
//!
//! Interactive console menu for browsing and playing *Hades* dialogue.
//! Uses the `hdialogue` library for loading and playback.

pub mod interrupt;
pub mod layout;
pub mod menu;

use clap::Parser;
use hdialogue::audio::CommandPlayer;
use hdialogue::cli::args::CommonArgs;
use hdialogue::cli::progress;

use interrupt::KeyInterrupt;
use menu::Menu;

#[derive(Parser)]
#[command(name = "hdplay", version)]
#[command(about = "Play Hades in-game dialogue (interactive console version)", long_about = None)]
struct Cli {
    /// Columns to use when showing options
    #[arg(short, long)]
    columns: Option<usize>,

    /// Minimum rows before columns get used
    #[arg(short, long)]
    min_rows: Option<usize>,

    #[command(flatten)]
    common: CommonArgs,
}

/// Run the interactive player
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.common.init_logging();

    let config = cli.common.resolve_config_with(|config| {
        if let Some(columns) = cli.columns {
            config.interactive.columns = columns.max(1);
        }
        if let Some(min_rows) = cli.min_rows {
            config.interactive.min_rows = min_rows;
        }
    })?;

    let dialogue = progress::load_dialogue(&config)?;
    let player = CommandPlayer::new(&config.media_player)?;
    tracing::info!("Playing through {}", player.program());

    Menu::new(&dialogue.catalog, player, KeyInterrupt)
        .with_layout(config.interactive.clone())
        .with_autoplay_delay(config.autoplay_delay())
        .run()
}
