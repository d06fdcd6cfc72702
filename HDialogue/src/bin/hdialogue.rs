//! HDialogue CLI binary

fn main() -> anyhow::Result<()> {
    hdialogue::cli::run_cli()
}
