use std::time::Duration;

use anyhow::{Context, Result};
use mongodb::{Client, Database, bson::doc, options::ClientOptions};

/// Used when the connection string does not name a database.
pub const DEFAULT_DATABASE: &str = "plant_tracker";

/// Builds the client and picks the database named in the connection string.
///
/// The driver connects lazily, so an unreachable server only produces a
/// warning here; requests will fail until it comes back.
pub async fn connect(database_url: &str) -> Result<Database> {
    let mut options = ClientOptions::parse(database_url)
        .await
        .context("Invalid MongoDB connection string")?;
    options.server_selection_timeout = Some(Duration::from_secs(10));
    options.app_name = Some("plant-tracker".to_string());

    let client = Client::with_options(options).context("Failed to create MongoDB client")?;
    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

    match database.run_command(doc! { "ping": 1 }).await {
        Ok(_) => tracing::info!(database = database.name(), "Connected to MongoDB"),
        Err(e) => tracing::warn!(
            database = database.name(),
            "MongoDB ping failed, continuing without a live connection: {e}"
        ),
    }

    Ok(database)
}
