use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::domain::SampleId;
use crate::error::VirokitError;
use crate::runner::ProcessRunner;
use crate::samples::discover_samples;
use crate::store::{inner_database_dir, relocate_file};

/// Classification thresholds forwarded to `genomad end-to-end`.
#[derive(Debug, Clone, Copy)]
pub struct GenomadOptions {
    pub splits: u32,
    pub min_score: f64,
    pub min_number_genes: u32,
    pub conservative_taxonomy: bool,
}

impl Default for GenomadOptions {
    fn default() -> Self {
        Self {
            splits: 8,
            min_score: 0.7,
            min_number_genes: 1,
            conservative_taxonomy: false,
        }
    }
}

/// Destination directories for the per-sample geNomad outputs.
#[derive(Debug, Clone)]
pub struct GenomadOutputs {
    pub viruses: Utf8PathBuf,
    pub proviruses: Utf8PathBuf,
    pub plasmids: Utf8PathBuf,
    pub virus_summary: Utf8PathBuf,
}

impl GenomadOutputs {
    pub fn under(root: &Utf8Path) -> Self {
        Self {
            viruses: root.join("viruses"),
            proviruses: root.join("proviruses"),
            plasmids: root.join("plasmids"),
            virus_summary: root.join("virus_summary"),
        }
    }
}

/// `genomad download-database` populates the destination itself. Notebook
/// checkpoint directories occasionally leak into the archive and would fail
/// schema validation, so they are removed after the download.
pub fn fetch_db(runner: &dyn ProcessRunner, dest: &Utf8Path) -> Result<(), VirokitError> {
    runner.run(
        "genomad",
        &["download-database".to_string(), dest.to_string()],
    )?;

    let checkpoints = dest.join("genomad_db").join(".ipynb_checkpoints");
    if checkpoints.as_std_path().exists() {
        fs::remove_dir_all(checkpoints.as_std_path())
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
    }
    Ok(())
}

fn end_to_end(
    runner: &dyn ProcessRunner,
    tmp: &Utf8Path,
    contigs: &Utf8Path,
    database: &Utf8Path,
    num_threads: u32,
    options: &GenomadOptions,
) -> Result<(), VirokitError> {
    let mut args = vec![
        "end-to-end".to_string(),
        "--cleanup".to_string(),
        "--splits".to_string(),
        options.splits.to_string(),
        "--min-score".to_string(),
        options.min_score.to_string(),
        "--min-number-genes".to_string(),
        options.min_number_genes.to_string(),
        "--threads".to_string(),
        num_threads.to_string(),
        "--disable-nn-classification".to_string(),
    ];
    if options.conservative_taxonomy {
        args.push("--conservative-taxonomy".to_string());
    }
    args.extend([contigs.to_string(), tmp.to_string(), database.to_string()]);
    runner.run("genomad", &args)
}

/// Run `genomad end-to-end` for every sample and collect the classifier's
/// sequence and summary outputs under their per-sample destinations.
pub fn run_analysis(
    runner: &dyn ProcessRunner,
    sequences: &Utf8Path,
    database: &Utf8Path,
    num_threads: u32,
    options: &GenomadOptions,
    outputs: &GenomadOutputs,
) -> Result<Vec<SampleId>, VirokitError> {
    let samples = discover_samples(sequences)?;
    let database = inner_database_dir(database)?;

    for (sample, contigs) in &samples {
        let tmp = tempfile::tempdir()
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
        let tmp_path = Utf8Path::from_path(tmp.path())
            .ok_or_else(|| VirokitError::Filesystem("invalid temp dir".to_string()))?;

        end_to_end(runner, tmp_path, contigs, &database, num_threads, options)?;

        // geNomad lays its outputs out under per-stage directories named
        // after the input file stem.
        let moves = [
            (
                format!("{sample}_contigs_summary/{sample}_contigs_virus.fna"),
                outputs.viruses.join(format!("{sample}_contigs.fa")),
            ),
            (
                format!("{sample}_contigs_find_proviruses/{sample}_contigs_provirus.fna"),
                outputs.proviruses.join(format!("{sample}_contigs.fa")),
            ),
            (
                format!("{sample}_contigs_summary/{sample}_contigs_plasmid.fna"),
                outputs.plasmids.join(format!("{sample}_contigs.fa")),
            ),
            (
                format!("{sample}_contigs_summary/{sample}_contigs_virus_summary.tsv"),
                outputs
                    .virus_summary
                    .join(format!("{sample}_virus_summary.tsv")),
            ),
        ];
        for (name, dest) in moves {
            relocate_file(&tmp_path.join(name), &dest)?;
        }
        info!(sample = %sample, "genomad analysis finished");
    }

    Ok(samples.into_keys().collect())
}
