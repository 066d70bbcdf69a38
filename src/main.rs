#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = trackademic_api::run().await {
        eprintln!("trackademic-api fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
