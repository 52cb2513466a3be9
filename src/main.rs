// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, open the connection store, build
//   the API client and hand both to the UI loop.

use anyhow::Context;
use quick_content_cli::{config, logging, ui::main_menu, ConnectionStore, ContentClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // `QUICK_CONTENT_CONNECTIONS` overrides the per-user default path.
    let store = ConnectionStore::new(config::connections_path()?);
    let client = ContentClient::new().context("Failed to build HTTP client")?;

    // Blocks until the user chooses "Exit".
    main_menu(client, store).await?;
    Ok(())
}
