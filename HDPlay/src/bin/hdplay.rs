//! HDPlay interactive player binary

fn main() -> anyhow::Result<()> {
    hdplay::run()
}
