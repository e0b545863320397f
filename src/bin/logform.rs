use std::io::Write;

use tracing_subscriber::EnvFilter;

use maintlog::capture::identity;
use maintlog::capture::{CaptureForm, LogClient, terminal};
use maintlog::config::CaptureConfig;
use maintlog::directory::{self, DirectoryLookup};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = CaptureConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let current_user = identity::current_user();
    let lookup = directory::lookup_systems(&config.directory).await;

    let mut stdout = std::io::stdout();
    if let DirectoryLookup::Unavailable(e) = &lookup {
        writeln!(stdout, "Directory unavailable ({e}); system names must be typed in.")?;
    }

    let mut form = CaptureForm::new(current_user, lookup.into_systems());
    let client = LogClient::new(&config.api)?;
    tracing::debug!(url = client.url(), "Submitting to log service");

    let stdin = std::io::stdin();
    terminal::run(&mut form, &client, stdin.lock(), &mut stdout).await?;

    Ok(())
}
