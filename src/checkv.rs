use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::domain::SampleId;
use crate::error::VirokitError;
use crate::runner::ProcessRunner;
use crate::samples::discover_samples;
use crate::store::{inner_database_dir, relocate_file};

/// Destination directories for the per-sample CheckV outputs.
#[derive(Debug, Clone)]
pub struct CheckvOutputs {
    pub viruses: Utf8PathBuf,
    pub proviruses: Utf8PathBuf,
    pub quality_summary: Utf8PathBuf,
    pub contamination: Utf8PathBuf,
    pub completeness: Utf8PathBuf,
    pub complete_genomes: Utf8PathBuf,
}

impl CheckvOutputs {
    pub fn under(root: &Utf8Path) -> Self {
        Self {
            viruses: root.join("viruses"),
            proviruses: root.join("proviruses"),
            quality_summary: root.join("quality_summary"),
            contamination: root.join("contamination"),
            completeness: root.join("completeness"),
            complete_genomes: root.join("complete_genomes"),
        }
    }
}

/// `checkv download_database` populates the destination itself.
pub fn fetch_db(runner: &dyn ProcessRunner, dest: &Utf8Path) -> Result<(), VirokitError> {
    runner.run(
        "checkv",
        &["download_database".to_string(), dest.to_string()],
    )
}

fn end_to_end(
    runner: &dyn ProcessRunner,
    tmp: &Utf8Path,
    contigs: &Utf8Path,
    database: &Utf8Path,
    num_threads: u32,
) -> Result<(), VirokitError> {
    runner.run(
        "checkv",
        &[
            "end_to_end".to_string(),
            contigs.to_string(),
            tmp.to_string(),
            "-d".to_string(),
            database.to_string(),
            "-t".to_string(),
            num_threads.to_string(),
        ],
    )
}

/// Run `checkv end_to_end` for every sample in `sequences` and collect the
/// outputs under their per-sample destinations. Each sample runs in its own
/// scratch directory, removed when the sample completes.
pub fn run_analysis(
    runner: &dyn ProcessRunner,
    sequences: &Utf8Path,
    database: &Utf8Path,
    num_threads: u32,
    outputs: &CheckvOutputs,
) -> Result<Vec<SampleId>, VirokitError> {
    let samples = discover_samples(sequences)?;
    let database = inner_database_dir(database)?;

    for (sample, contigs) in &samples {
        let tmp = tempfile::tempdir()
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
        let tmp_path = Utf8Path::from_path(tmp.path())
            .ok_or_else(|| VirokitError::Filesystem("invalid temp dir".to_string()))?;

        end_to_end(runner, tmp_path, contigs, &database, num_threads)?;

        let moves = [
            ("viruses.fna", outputs.viruses.join(format!("{sample}_contigs.fa"))),
            (
                "proviruses.fna",
                outputs.proviruses.join(format!("{sample}_contigs.fa")),
            ),
            (
                "quality_summary.tsv",
                outputs
                    .quality_summary
                    .join(format!("{sample}_quality_summary.tsv")),
            ),
            (
                "contamination.tsv",
                outputs
                    .contamination
                    .join(format!("{sample}_contamination.tsv")),
            ),
            (
                "completeness.tsv",
                outputs
                    .completeness
                    .join(format!("{sample}_completeness.tsv")),
            ),
            (
                "complete_genomes.tsv",
                outputs
                    .complete_genomes
                    .join(format!("{sample}_complete_genomes.tsv")),
            ),
        ];
        for (name, dest) in moves {
            relocate_file(&tmp_path.join(name), &dest)?;
        }
        info!(sample = %sample, "checkv analysis finished");
    }

    Ok(samples.into_keys().collect())
}
