use anyhow::Context;
use tokio_postgres::{Client, NoTls};

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresConfig {
    fn connection_str(&self) -> String {
        format!(
            "postgresql://{}:{}@{}",
            self.username, self.password, self.hostname
        )
    }
}

/// Opens a connection, drives it on a background task and makes sure `schema` exists
pub async fn connect(config: &PostgresConfig, schema: &str) -> anyhow::Result<Client> {
    tracing::info!("Connecting to postgres at {}", config.hostname);
    let (client, connection) = tokio_postgres::connect(&config.connection_str(), NoTls)
        .await
        .context("Failed to start postgres")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("connection error: {}", e);
        }
    });

    client
        .batch_execute(schema)
        .await
        .context("Failed to setup table")?;
    Ok(client)
}
