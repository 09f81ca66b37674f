//! Full MySQL dump through `mysqldump`

use super::{prepare_artifact_path, BackupArtifact};
use crate::config::DatabaseKind;
use crate::database::ConnectionParams;
use crate::utils::command::{ensure_program, run_command_to_file};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

pub const DUMP_PROGRAM: &str = "mysqldump";

/// Arguments for a consistent single-database dump
///
/// The password is never part of the argument list, it travels in `MYSQL_PWD`.
pub fn dump_args(params: &ConnectionParams, dbname: &str) -> Vec<String> {
    let mut args = vec![
        "--protocol=TCP".to_string(),
        "--host".to_string(),
        params.host.clone(),
        "--port".to_string(),
        params.port.to_string(),
    ];

    if !params.user.is_empty() {
        args.push("--user".to_string());
        args.push(params.user.clone());
    }

    args.extend([
        "--single-transaction".to_string(),
        "--routines".to_string(),
        "--triggers".to_string(),
        dbname.to_string(),
    ]);

    args
}

/// Dump `dbname` to `<dest_dir>/<dbname>-backup.sql`
pub async fn export(
    params: &ConnectionParams,
    dbname: &str,
    dest_dir: &Path,
) -> Result<BackupArtifact> {
    let program = ensure_program(DUMP_PROGRAM)?;
    let path = prepare_artifact_path(dest_dir, dbname, DatabaseKind::Mysql.artifact_extension()).await?;

    info!("Dumping MySQL database '{}' to {:?}", dbname, path);

    let args = dump_args(params, dbname);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let envs = [("MYSQL_PWD", params.password.as_str())];

    run_command_to_file(&program.to_string_lossy(), &arg_refs, &envs, &path)
        .await
        .with_context(|| format!("mysqldump of '{}' failed", dbname))?;

    Ok(BackupArtifact::raw(path, DatabaseKind::Mysql))
}
