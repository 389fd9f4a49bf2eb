use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    slotterm::cli::run_cli().await
}
