//! MongoDB document export
//!
//! Every collection is read fully into memory and written as one pretty-printed
//! JSON array. Large collections are bounded by available memory.

use super::{prepare_artifact_path, write_artifact, BackupArtifact};
use crate::config::DatabaseKind;
use anyhow::{Context, Result};
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// All documents of one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDump {
    pub collection: String,
    pub docs: Vec<serde_json::Value>,
}

/// Render a BSON document as relaxed Extended JSON
pub fn document_to_json(doc: Document) -> serde_json::Value {
    Bson::Document(doc).into_relaxed_extjson()
}

pub fn render_export(dumps: &[CollectionDump]) -> Result<String> {
    serde_json::to_string_pretty(dumps).context("Failed to serialize collections")
}

/// Read every collection of `dbname`, ordered by name
pub async fn collect_collections(client: &Client, dbname: &str) -> Result<Vec<CollectionDump>> {
    let db = client.database(dbname);

    let mut names = db
        .list_collection_names(None)
        .await
        .with_context(|| format!("Failed to list collections of '{}'", dbname))?;
    names.sort();

    let mut dumps = Vec::with_capacity(names.len());
    for name in names {
        let cursor = db
            .collection::<Document>(&name)
            .find(None, None)
            .await
            .with_context(|| format!("Failed to query collection '{}'", name))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .with_context(|| format!("Failed to read collection '{}'", name))?;

        debug!("Collection '{}': {} document(s)", name, docs.len());

        dumps.push(CollectionDump {
            collection: name,
            docs: docs.into_iter().map(document_to_json).collect(),
        });
    }

    Ok(dumps)
}

/// Write collections to `<dest_dir>/<dbname>-backup.json`
pub async fn write_export(
    dumps: &[CollectionDump],
    dbname: &str,
    dest_dir: &Path,
) -> Result<BackupArtifact> {
    let body = render_export(dumps)?;
    let path = prepare_artifact_path(dest_dir, dbname, DatabaseKind::Mongodb.artifact_extension()).await?;
    write_artifact(&path, body.as_bytes()).await?;
    Ok(BackupArtifact::raw(path, DatabaseKind::Mongodb))
}

pub async fn export(client: &Client, dbname: &str, dest_dir: &Path) -> Result<BackupArtifact> {
    let dumps = collect_collections(client, dbname).await?;

    info!(
        "Exporting {} collection(s) from MongoDB database '{}'",
        dumps.len(),
        dbname
    );

    write_export(&dumps, dbname, dest_dir).await
}
