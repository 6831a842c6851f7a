use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::SampleId;
use crate::error::VirokitError;

/// Per-sample assembly files follow the `<sample>_contigs.fa` convention.
pub const CONTIGS_SUFFIX: &str = "_contigs.fa";

/// Discover the per-sample contig files in an input directory.
///
/// Returns an ordered sample-id to path map; iteration order is the sorted
/// order of sample identifiers. Files not matching the naming convention are
/// ignored. Zero matching files is an error: an analysis over no samples has
/// no meaning.
pub fn discover_samples(
    directory: &Utf8Path,
) -> Result<BTreeMap<SampleId, Utf8PathBuf>, VirokitError> {
    let mut samples = BTreeMap::new();
    let entries = fs::read_dir(directory.as_std_path())
        .map_err(|err| VirokitError::Filesystem(format!("read {directory}: {err}")))?;
    for entry in entries {
        let entry = entry.map_err(|err| VirokitError::Filesystem(err.to_string()))?;
        let name = entry.file_name().into_string().map_err(|name| {
            VirokitError::Filesystem(format!("non-UTF-8 file name: {}", name.display()))
        })?;
        if !name.ends_with(CONTIGS_SUFFIX) || !entry.path().is_file() {
            continue;
        }
        let sample = SampleId::from_file_name(&name)?;
        samples.insert(sample, directory.join(&name));
    }

    if samples.is_empty() {
        return Err(VirokitError::EmptyInput(directory.to_path_buf()));
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::VirokitError;

    #[test]
    fn discovers_sorted_samples() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        std::fs::write(root.join("b_contigs.fa"), ">c1\nACGT\n").unwrap();
        std::fs::write(root.join("a_contigs.fa"), ">c1\nACGT\n").unwrap();
        std::fs::write(root.join("notes.txt"), "ignored").unwrap();

        let samples = discover_samples(root).unwrap();
        let ids: Vec<&str> = samples.keys().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let err = discover_samples(root).unwrap_err();
        assert_matches!(err, VirokitError::EmptyInput(_));
    }
}
