use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = quill_relay::config::from_env();
    let app = quill_relay::build_with(&config)?;
    let addr = quill_relay::bind_addr(&config);

    app.listen(addr).await?;

    Ok(())
}
