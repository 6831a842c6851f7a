use std::fs;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::Tool;
use crate::error::VirokitError;
use crate::genomad::GenomadOptions;

/// On-disk shape of `virokit.json`. Everything is optional; the resolved
/// form fills in defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub databases: DatabaseEntries,
    #[serde(default)]
    pub threads: Option<u32>,
    #[serde(default)]
    pub genomad: Option<GenomadEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DatabaseEntries {
    #[serde(default)]
    pub checkv: Option<String>,
    #[serde(default)]
    pub genomad: Option<String>,
    #[serde(default)]
    pub virsorter2: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GenomadEntry {
    #[serde(default)]
    pub splits: Option<u32>,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub min_number_genes: Option<u32>,
    #[serde(default)]
    pub conservative_taxonomy: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub checkv_db: Option<Utf8PathBuf>,
    pub genomad_db: Option<Utf8PathBuf>,
    pub virsorter2_db: Option<Utf8PathBuf>,
    pub threads: u32,
    pub genomad: GenomadOptions,
}

impl ResolvedConfig {
    pub fn database(&self, tool: Tool) -> Option<&Utf8Path> {
        match tool {
            Tool::Checkv => self.checkv_db.as_deref(),
            Tool::Genomad => self.genomad_db.as_deref(),
            Tool::Virsorter2 => self.virsorter2_db.as_deref(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, VirokitError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("virokit.json"),
        };

        if path.is_none() && !config_path.exists() {
            return Err(VirokitError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| VirokitError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| VirokitError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        let defaults = GenomadOptions::default();
        let genomad = config.genomad.unwrap_or_default();
        ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            checkv_db: config.databases.checkv.map(Utf8PathBuf::from),
            genomad_db: config.databases.genomad.map(Utf8PathBuf::from),
            virsorter2_db: config.databases.virsorter2.map(Utf8PathBuf::from),
            threads: config.threads.unwrap_or(1),
            genomad: GenomadOptions {
                splits: genomad.splits.unwrap_or(defaults.splits),
                min_score: genomad.min_score.unwrap_or(defaults.min_score),
                min_number_genes: genomad
                    .min_number_genes
                    .unwrap_or(defaults.min_number_genes),
                conservative_taxonomy: genomad
                    .conservative_taxonomy
                    .unwrap_or(defaults.conservative_taxonomy),
            },
        }
    }
}
