use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::VirokitError;

/// The external binaries this crate orchestrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Checkv,
    Genomad,
    Virsorter2,
}

impl Tool {
    /// Name of the executable on PATH.
    pub fn program(&self) -> &'static str {
        match self {
            Tool::Checkv => "checkv",
            Tool::Genomad => "genomad",
            Tool::Virsorter2 => "virsorter",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Checkv => write!(f, "checkv"),
            Tool::Genomad => write!(f, "genomad"),
            Tool::Virsorter2 => write!(f, "virsorter2"),
        }
    }
}

/// Identifier of a biological sample, derived from an output file name.
///
/// File names produced by the analysis steps follow the
/// `<sample>_<suffix>` convention; the prefix before the first underscore
/// is the sample identifier. A file name without an underscore is its own
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleId(String);

impl SampleId {
    pub fn from_file_name(file_name: &str) -> Result<Self, VirokitError> {
        let prefix = file_name.split('_').next().unwrap_or("");
        if prefix.is_empty() {
            return Err(VirokitError::InvalidSampleName(file_name.to_string()));
        }
        Ok(Self(prefix.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SampleId {
    type Err = VirokitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
            return Err(VirokitError::InvalidSampleName(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn sample_id_from_file_name() {
        let id = SampleId::from_file_name("sampleA_quality_summary.tsv").unwrap();
        assert_eq!(id.as_str(), "sampleA");
    }

    #[test]
    fn sample_id_keeps_whole_name_without_underscore() {
        let id = SampleId::from_file_name("sampleA.tsv").unwrap();
        assert_eq!(id.as_str(), "sampleA.tsv");
    }

    #[test]
    fn sample_id_rejects_leading_underscore() {
        let err = SampleId::from_file_name("_contigs.fa").unwrap_err();
        assert_matches!(err, VirokitError::InvalidSampleName(_));
    }

    #[test]
    fn tool_programs() {
        assert_eq!(Tool::Checkv.program(), "checkv");
        assert_eq!(Tool::Genomad.program(), "genomad");
        assert_eq!(Tool::Virsorter2.program(), "virsorter");
    }
}
