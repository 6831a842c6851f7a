use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::domain::SampleId;
use crate::error::VirokitError;
use crate::runner::ProcessRunner;
use crate::samples::discover_samples;
use crate::store::relocate_file;

/// Destination directories for the per-sample VirSorter2 outputs.
#[derive(Debug, Clone)]
pub struct Virsorter2Outputs {
    pub viruses: Utf8PathBuf,
    pub scores: Utf8PathBuf,
    pub boundaries: Utf8PathBuf,
}

impl Virsorter2Outputs {
    pub fn under(root: &Utf8Path) -> Self {
        Self {
            viruses: root.join("viruses"),
            scores: root.join("scores"),
            boundaries: root.join("boundaries"),
        }
    }
}

/// `virsorter setup` downloads and unpacks the database into the
/// destination and drops a `Done_all_setup` marker when finished.
pub fn fetch_db(
    runner: &dyn ProcessRunner,
    dest: &Utf8Path,
    num_threads: u32,
) -> Result<(), VirokitError> {
    runner.run(
        "virsorter",
        &[
            "setup".to_string(),
            "-d".to_string(),
            dest.to_string(),
            "-j".to_string(),
            num_threads.to_string(),
        ],
    )
}

fn run_sample(
    runner: &dyn ProcessRunner,
    tmp: &Utf8Path,
    contigs: &Utf8Path,
    database: &Utf8Path,
    num_threads: u32,
) -> Result<(), VirokitError> {
    runner.run(
        "virsorter",
        &[
            "run".to_string(),
            "-w".to_string(),
            tmp.to_string(),
            "-i".to_string(),
            contigs.to_string(),
            "--db-dir".to_string(),
            database.to_string(),
            "-j".to_string(),
            num_threads.to_string(),
            "all".to_string(),
        ],
    )
}

/// Run `virsorter run` for every sample and collect the detector's combined
/// sequences plus score and boundary tables. Unlike the other two tools the
/// database root is used directly; there is no inner wrapper directory.
pub fn run_analysis(
    runner: &dyn ProcessRunner,
    sequences: &Utf8Path,
    database: &Utf8Path,
    num_threads: u32,
    outputs: &Virsorter2Outputs,
) -> Result<Vec<SampleId>, VirokitError> {
    let samples = discover_samples(sequences)?;

    for (sample, contigs) in &samples {
        let tmp = tempfile::tempdir()
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
        let tmp_path = Utf8Path::from_path(tmp.path())
            .ok_or_else(|| VirokitError::Filesystem("invalid temp dir".to_string()))?;

        run_sample(runner, tmp_path, contigs, database, num_threads)?;

        let moves = [
            (
                "final-viral-combined.fa",
                outputs.viruses.join(format!("{sample}_contigs.fa")),
            ),
            (
                "final-viral-score.tsv",
                outputs.scores.join(format!("{sample}_viral_score.tsv")),
            ),
            (
                "final-viral-boundary.tsv",
                outputs
                    .boundaries
                    .join(format!("{sample}_viral_boundary.tsv")),
            ),
        ];
        for (name, dest) in moves {
            relocate_file(&tmp_path.join(name), &dest)?;
        }
        info!(sample = %sample, "virsorter2 analysis finished");
    }

    Ok(samples.into_keys().collect())
}
