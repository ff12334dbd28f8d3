use anyhow::Result;

fn main() -> Result<()> {
    rasterbench::cli::run()
}
