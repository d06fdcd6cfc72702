//! CLI progress display utilities
//!
//! Step indicators, a loading spinner and the post-load summary shared by
//! both front ends.

use std::time::{Duration, Instant};

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::catalog::{DiagnosticKind, summarize};
use crate::config::AppConfig;
use crate::dialogue::{Dialogue, LoadStep};

// =============================================================================
// Emoji Constants (with ASCII fallbacks for terminals without emoji support)
// =============================================================================

/// Magnifying glass - for scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Document - for script loading
pub static DOCUMENT: Emoji<'_, '_> = Emoji("📄 ", "");
/// Link - for indexing operations
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
/// Warning sign - for diagnostics
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");

// =============================================================================
// Step-Based Progress
// =============================================================================

/// Print a step indicator: `[1/3] 📄 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// Print an error line in bold red.
pub fn print_error(msg: &str) {
    println!("{}", style(msg).red().bold());
}

/// Create a simple spinner
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn simple_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// =============================================================================
// Startup
// =============================================================================

/// Load everything with step output and a spinner, then print a summary.
pub fn load_dialogue(config: &AppConfig) -> anyhow::Result<Dialogue> {
    const TOTAL: usize = 3;
    let start = Instant::now();
    let spinner = simple_spinner("Starting...");

    let result = Dialogue::load_with_progress(config, |step| match step {
        LoadStep::ScanningAudio(dir) => {
            spinner.suspend(|| print_step(1, TOTAL, LOOKING_GLASS, "Scanning audio files..."));
            spinner.set_message(dir.display().to_string());
        }
        LoadStep::LoadingScript(path) => {
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            spinner.suspend(|| print_step(2, TOTAL, DOCUMENT, &format!("Loading {name}...")));
            spinner.set_message(path.display().to_string());
        }
        LoadStep::BuildingCatalog => {
            spinner.suspend(|| print_step(3, TOTAL, LINK, "Building catalog..."));
            spinner.set_message("resolving cues");
        }
    });
    spinner.finish_and_clear();
    let dialogue = result?;

    let counts = dialogue.catalog.counts();
    println!(
        "  {} NPCs, {} enemies, {} loot, {} dialogue sets, {} cues ({} audio files)",
        counts.npcs,
        counts.enemies,
        counts.loot,
        counts.dialogue_sets,
        counts.cues,
        dialogue.library.len()
    );
    print_diagnostics(&dialogue);
    print_done(start.elapsed());
    println!();
    Ok(dialogue)
}

/// Diagnostics summary: one count line per kind, failed sources in full.
pub fn print_diagnostics(dialogue: &Dialogue) {
    for (kind, count) in summarize(&dialogue.diagnostics) {
        println!(
            "  {}{}",
            WARNING,
            style(format!("{count} {}", kind.label())).yellow()
        );
    }
    for diagnostic in dialogue
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::SourceFailed)
    {
        print_error(&format!("  {}: {}", diagnostic.context, diagnostic.message));
    }
}
