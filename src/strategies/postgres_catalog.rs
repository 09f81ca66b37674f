//! PostgreSQL catalog export
//!
//! Known limitation: this writes one JSON line per table of the `public` schema
//! as reported by `information_schema.tables`. It exports table metadata, not
//! table contents.

use super::{prepare_artifact_path, write_artifact, BackupArtifact};
use crate::config::DatabaseKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use std::path::Path;
use tracing::info;

pub const CATALOG_QUERY: &str = "\
SELECT table_catalog::text AS table_catalog, \
       table_schema::text AS table_schema, \
       table_name::text AS table_name, \
       table_type::text AS table_type \
FROM information_schema.tables \
WHERE table_schema = 'public' \
ORDER BY table_name";

/// One row of the table catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogRow {
    pub table_catalog: String,
    pub table_schema: String,
    pub table_name: String,
    pub table_type: String,
}

/// Serialize rows as newline-joined JSON objects
pub fn render_rows(rows: &[CatalogRow]) -> Result<String> {
    let lines = rows
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to serialize catalog rows")?;
    Ok(lines.join("\n"))
}

/// Write the public schema catalog of `dbname` to `<dest_dir>/<dbname>-backup.sql`
pub async fn export(
    conn: &mut PgConnection,
    dbname: &str,
    dest_dir: &Path,
) -> Result<BackupArtifact> {
    let rows: Vec<CatalogRow> = sqlx::query_as(CATALOG_QUERY)
        .fetch_all(&mut *conn)
        .await
        .context("Catalog query failed")?;

    info!(
        "Exporting catalog of {} table(s) from PostgreSQL database '{}'",
        rows.len(),
        dbname
    );

    let body = render_rows(&rows)?;
    let path = prepare_artifact_path(dest_dir, dbname, DatabaseKind::Postgres.artifact_extension()).await?;
    write_artifact(&path, body.as_bytes()).await?;

    Ok(BackupArtifact::raw(path, DatabaseKind::Postgres))
}
