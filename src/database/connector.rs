//! Opening and closing live database sessions

use super::{ConnectionHandle, ConnectionParams};
use crate::config::DatabaseKind;
use anyhow::{Context, Result};
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, info};

/// Open a session for `kind`, waiting for the handshake to finish
pub async fn connect(kind: DatabaseKind, params: &ConnectionParams) -> Result<ConnectionHandle> {
    info!(
        "Connecting to {} at {}:{} as '{}'",
        kind, params.host, params.port, params.user
    );

    let handle = match kind {
        DatabaseKind::Mysql => ConnectionHandle::Mysql {
            conn: connect_mysql(params).await?,
            params: params.clone(),
        },
        DatabaseKind::Postgres => ConnectionHandle::Postgres {
            conn: connect_postgres(params).await?,
        },
        DatabaseKind::Mongodb => ConnectionHandle::Mongodb {
            client: connect_mongodb(params).await?,
        },
    };

    info!("Connected to {} database '{}'", kind, params.database);
    Ok(handle)
}

async fn connect_mysql(params: &ConnectionParams) -> Result<MySqlConnection> {
    let options = MySqlConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .username(&params.user)
        .password(&params.password)
        .database(&params.database);

    MySqlConnection::connect_with(&options)
        .await
        .context("MySQL handshake failed")
}

async fn connect_postgres(params: &ConnectionParams) -> Result<PgConnection> {
    let options = PgConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .username(&params.user)
        .password(&params.password)
        .database(&params.database);

    PgConnection::connect_with(&options)
        .await
        .context("PostgreSQL handshake failed")
}

/// Build a server-level connection string with percent-encoded credentials
pub fn mongodb_uri(params: &ConnectionParams) -> String {
    if params.user.is_empty() {
        format!("mongodb://{}:{}/", params.host, params.port)
    } else {
        format!(
            "mongodb://{}:{}@{}:{}/",
            urlencoding::encode(&params.user),
            urlencoding::encode(&params.password),
            params.host,
            params.port
        )
    }
}

async fn connect_mongodb(params: &ConnectionParams) -> Result<Client> {
    let options = ClientOptions::parse(mongodb_uri(params))
        .await
        .context("Invalid MongoDB connection string")?;
    let client = Client::with_options(options).context("Failed to create MongoDB client")?;

    // The driver connects lazily; ping so that failures surface here
    client
        .database("admin")
        .run_command(doc! { "ping": 1 }, None)
        .await
        .context("MongoDB server did not answer ping")?;

    Ok(client)
}

/// Close a session
pub async fn release(handle: ConnectionHandle) -> Result<()> {
    let kind = handle.kind();
    debug!("Closing {} connection", kind);

    match handle {
        ConnectionHandle::Mysql { conn, .. } => {
            conn.close().await.context("Failed to close MySQL connection")?
        }
        ConnectionHandle::Postgres { conn } => conn
            .close()
            .await
            .context("Failed to close PostgreSQL connection")?,
        ConnectionHandle::Mongodb { client } => client.shutdown().await,
    }

    info!("Released {} connection", kind);
    Ok(())
}
