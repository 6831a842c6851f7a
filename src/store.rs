use std::fs;
use std::io;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tempfile::Builder;
use tracing::info;

use crate::checkv;
use crate::domain::Tool;
use crate::error::VirokitError;
use crate::genomad;
use crate::runner::{self, ProcessRunner};
use crate::schema::{CheckvDb, DirectorySchema, GenomadDb, Virsorter2Db};
use crate::virsorter2;

/// Shared per-user cache of fetched reference databases.
#[derive(Debug, Clone)]
pub struct Store {
    cache_root: Utf8PathBuf,
}

impl Store {
    pub fn new() -> Result<Self, VirokitError> {
        let cache_root = BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("virokit"))
                    .ok()
            })
            .ok_or_else(|| {
                VirokitError::Filesystem("unable to resolve cache directory".to_string())
            })?;
        Ok(Self { cache_root })
    }

    pub fn new_with_root(cache_root: Utf8PathBuf) -> Self {
        Self { cache_root }
    }

    pub fn cache_root(&self) -> &Utf8Path {
        &self.cache_root
    }

    pub fn database_dir(&self, tool: Tool) -> Utf8PathBuf {
        self.cache_root.join("databases").join(tool.to_string())
    }

    pub fn provenance_path(&self, tool: Tool) -> Utf8PathBuf {
        self.cache_root
            .join("databases")
            .join(format!("{tool}.json"))
    }

    /// Fetch a reference database through its own tool, validate the
    /// downloaded tree, and only then move it into the cache. A tree that
    /// fails validation is discarded wholesale with its staging directory.
    pub fn fetch_database(
        &self,
        runner: &dyn ProcessRunner,
        tool: Tool,
        threads: u32,
    ) -> Result<FetchedDb, VirokitError> {
        let databases_root = self.cache_root.join("databases");
        fs::create_dir_all(databases_root.as_std_path())
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;

        let staging = Builder::new()
            .prefix("virokit-fetch")
            .tempdir_in(databases_root.as_std_path())
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
        let staging_path = Utf8PathBuf::from_path_buf(staging.path().to_path_buf())
            .map_err(|_| VirokitError::Filesystem("invalid staging dir".to_string()))?;

        match tool {
            Tool::Checkv => checkv::fetch_db(runner, &staging_path)?,
            Tool::Genomad => genomad::fetch_db(runner, &staging_path)?,
            Tool::Virsorter2 => virsorter2::fetch_db(runner, &staging_path, threads)?,
        }

        database_schema(tool)?.ensure_valid(&staging_path)?;

        let dest = self.database_dir(tool);
        atomic_rename_dir(staging.path(), dest.as_std_path())
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;

        let provenance = DbProvenance {
            tool: tool.to_string(),
            tool_version: runner::tool_version(tool.program()),
            fetched_at: Utc::now().to_rfc3339(),
            resolved_path: dest.to_string(),
        };
        write_provenance(&self.provenance_path(tool), &provenance)?;
        info!(%tool, path = %dest, "database fetched and validated");

        Ok(FetchedDb {
            path: dest,
            provenance,
        })
    }
}

/// Provenance record written next to each fetched database tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbProvenance {
    pub tool: String,
    pub tool_version: Option<String>,
    pub fetched_at: String,
    pub resolved_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchedDb {
    pub path: Utf8PathBuf,
    #[serde(flatten)]
    pub provenance: DbProvenance,
}

pub fn database_schema(tool: Tool) -> Result<DirectorySchema, VirokitError> {
    match tool {
        Tool::Checkv => CheckvDb::schema(),
        Tool::Genomad => GenomadDb::schema(),
        Tool::Virsorter2 => Virsorter2Db::schema(),
    }
}

fn write_provenance(path: &Utf8Path, provenance: &DbProvenance) -> Result<(), VirokitError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    let content = serde_json::to_vec_pretty(provenance)
        .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
    fs::write(tmp_path.as_std_path(), &content)
        .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
    fs::rename(tmp_path.as_std_path(), path.as_std_path())
        .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
    Ok(())
}

pub fn atomic_rename_dir(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        fs::remove_dir_all(to)?;
    }
    fs::rename(from, to)
}

/// Move a tool output file to its destination, creating parent directories.
/// Falls back to copy-and-remove when the rename crosses filesystems (the
/// scratch directory may live on another mount than the results root).
pub fn relocate_file(source: &Utf8Path, dest: &Utf8Path) -> Result<(), VirokitError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
    }
    if fs::rename(source.as_std_path(), dest.as_std_path()).is_ok() {
        return Ok(());
    }
    fs::copy(source.as_std_path(), dest.as_std_path())
        .map_err(|err| VirokitError::Filesystem(format!("move {source} to {dest}: {err}")))?;
    fs::remove_file(source.as_std_path())
        .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
    Ok(())
}

/// The databases unpack into a single versioned directory under the fetch
/// root; the tools want that inner directory, not the root itself.
pub fn inner_database_dir(root: &Utf8Path) -> Result<Utf8PathBuf, VirokitError> {
    let mut dirs = Vec::new();
    let entries = fs::read_dir(root.as_std_path())
        .map_err(|err| VirokitError::Filesystem(format!("read {root}: {err}")))?;
    for entry in entries {
        let entry = entry.map_err(|err| VirokitError::Filesystem(err.to_string()))?;
        let path = Utf8PathBuf::from_path_buf(entry.path()).map_err(|path| {
            VirokitError::Filesystem(format!("non-UTF-8 path: {}", path.display()))
        })?;
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    dirs.into_iter()
        .next()
        .ok_or_else(|| VirokitError::EmptyInput(root.to_path_buf()))
}
