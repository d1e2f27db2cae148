#[tokio::main]
async fn main() -> zapbot::error::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("zapbot=info"))
        .init();
    log::info!("Starting zapbot Slack bot");

    // reqwest and tungstenite both pull in rustls; pin the process-wide provider.
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        log::debug!("A rustls crypto provider was already installed");
    }

    match zapbot::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
