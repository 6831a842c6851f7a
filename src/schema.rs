use std::fmt;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::Serialize;

use crate::error::VirokitError;
use crate::formats::{self, FileKind};

/// How many files a schema entry expects its pattern to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one file must match.
    One,
    /// At most one file may match.
    OptionalOne,
    /// One or more files must match.
    Collection,
}

/// One declarative rule of a directory layout: files whose tree-relative,
/// slash-normalized path fully matches `pattern` are validated as `kind`.
#[derive(Debug, Clone, Copy)]
pub struct SchemaEntry {
    pub pattern: &'static str,
    pub kind: FileKind,
    pub cardinality: Cardinality,
}

#[derive(Debug)]
struct CompiledEntry {
    pattern: &'static str,
    regex: Regex,
    kind: FileKind,
    cardinality: Cardinality,
}

/// An immutable, ordered collection of layout rules for one database or
/// results tree. Constructed once from a static entry list, consulted
/// (never mutated) during validation.
#[derive(Debug)]
pub struct DirectorySchema {
    name: &'static str,
    entries: Vec<CompiledEntry>,
}

/// A single defect found during tree validation: the pattern or path it
/// concerns, plus a human-addressed diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub subject: String,
    pub message: String,
}

/// Every defect found in one validation pass. Validation never stops at the
/// first problem; a database is downloaded once and the full defect list
/// decides between re-download and patching.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_pass(&self) -> bool {
        self.violations.is_empty()
    }

    /// Convert the report into an error when it holds any violation.
    pub fn into_result(self) -> Result<(), VirokitError> {
        if self.is_pass() {
            return Ok(());
        }
        Err(VirokitError::LayoutInvalid {
            problems: self.violations.len(),
            report: self.to_string(),
        })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}: {}", violation.subject, violation.message)?;
        }
        Ok(())
    }
}

impl DirectorySchema {
    pub fn new(
        name: &'static str,
        entries: &[SchemaEntry],
    ) -> Result<Self, VirokitError> {
        let compiled = entries
            .iter()
            .map(|entry| {
                let regex = Regex::new(&format!("^(?:{})$", entry.pattern))
                    .map_err(|err| VirokitError::Parse(err.to_string()))?;
                Ok(CompiledEntry {
                    pattern: entry.pattern,
                    regex,
                    kind: entry.kind,
                    cardinality: entry.cardinality,
                })
            })
            .collect::<Result<Vec<_>, VirokitError>>()?;
        Ok(Self {
            name,
            entries: compiled,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Validate the tree under `root` against every entry, accumulating all
    /// defects into one report.
    pub fn validate(&self, root: &Utf8Path) -> Result<ValidationReport, VirokitError> {
        let files = walk_files(root)?;
        let mut report = ValidationReport::default();

        for entry in &self.entries {
            let matched: Vec<&Utf8PathBuf> = files
                .iter()
                .filter(|relative| entry.regex.is_match(relative.as_str()))
                .collect();

            match entry.cardinality {
                Cardinality::One | Cardinality::Collection if matched.is_empty() => {
                    report.violations.push(Violation {
                        subject: entry.pattern.to_string(),
                        message: VirokitError::MissingRequiredFile(
                            entry.pattern.to_string(),
                        )
                        .to_string(),
                    });
                    continue;
                }
                Cardinality::One | Cardinality::OptionalOne if matched.len() > 1 => {
                    report.violations.push(Violation {
                        subject: entry.pattern.to_string(),
                        message: format!(
                            "pattern matched {} files, expected at most one",
                            matched.len()
                        ),
                    });
                }
                _ => {}
            }

            for relative in matched {
                if let Err(err) = formats::validate_file(&root.join(relative), entry.kind)
                {
                    report.violations.push(Violation {
                        subject: relative.to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Validate and fail on the first non-empty report.
    pub fn ensure_valid(&self, root: &Utf8Path) -> Result<(), VirokitError> {
        self.validate(root)?.into_result()
    }
}

/// All regular files under `root` as sorted, slash-normalized relative
/// paths. Sorting keeps reports deterministic across platforms whose
/// directory listing order differs.
fn walk_files(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, VirokitError> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = fs::read_dir(dir.as_std_path())
            .map_err(|err| VirokitError::Filesystem(format!("read {dir}: {err}")))?;
        for entry in entries {
            let entry = entry.map_err(|err| VirokitError::Filesystem(err.to_string()))?;
            let path = Utf8PathBuf::from_path_buf(entry.path())
                .map_err(|path| {
                    VirokitError::Filesystem(format!("non-UTF-8 path: {}", path.display()))
                })?;
            if path.is_dir() {
                stack.push(path);
            } else {
                let relative = path
                    .strip_prefix(root)
                    .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
                files.push(Utf8PathBuf::from(relative.as_str().replace('\\', "/")));
            }
        }
    }
    files.sort();
    Ok(files)
}

/// CheckV reference database layout. The download places everything inside
/// a single versioned outer directory (e.g. `checkv-db-v1.5/`).
pub struct CheckvDb;

impl CheckvDb {
    pub fn schema() -> Result<DirectorySchema, VirokitError> {
        DirectorySchema::new(
            "checkv-db",
            &[
                SchemaEntry {
                    pattern: r"[^/]+/README\.txt",
                    kind: FileKind::Binary,
                    cardinality: Cardinality::One,
                },
                SchemaEntry {
                    pattern: r"[^/]+/hmm_db/.+/.+\.hmm",
                    kind: FileKind::Profile,
                    cardinality: Cardinality::Collection,
                },
                SchemaEntry {
                    pattern: r"[^/]+/hmm_db/.+\.tsv",
                    kind: FileKind::Tabular,
                    cardinality: Cardinality::Collection,
                },
                SchemaEntry {
                    pattern: r"[^/]+/genome_db/.+\.tsv",
                    kind: FileKind::Tabular,
                    cardinality: Cardinality::Collection,
                },
                SchemaEntry {
                    pattern: r"[^/]+/genome_db/.+\.dmnd",
                    kind: FileKind::Binary,
                    cardinality: Cardinality::Collection,
                },
                SchemaEntry {
                    pattern: r"[^/]+/genome_db/.+\.faa",
                    kind: FileKind::Binary,
                    cardinality: Cardinality::Collection,
                },
                SchemaEntry {
                    pattern: r"[^/]+/genome_db/.+\.fna",
                    kind: FileKind::Binary,
                    cardinality: Cardinality::Collection,
                },
                SchemaEntry {
                    pattern: r"[^/]+/genome_db/.+\.log",
                    kind: FileKind::Binary,
                    cardinality: Cardinality::Collection,
                },
            ],
        )
    }

    pub fn readme_path(outer: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/README.txt"))
    }

    pub fn hmm_profile_path(outer: &str, dir: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/hmm_db/{dir}/{name}.hmm"))
    }

    pub fn hmm_table_path(outer: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/hmm_db/{name}.tsv"))
    }

    pub fn genome_table_path(outer: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/genome_db/{name}.tsv"))
    }

    pub fn genome_index_path(outer: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/genome_db/{name}.dmnd"))
    }

    pub fn genome_proteins_path(outer: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/genome_db/{name}.faa"))
    }

    pub fn genome_sequences_path(outer: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/genome_db/{name}.fna"))
    }

    pub fn genome_log_path(outer: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/genome_db/{name}.log"))
    }
}

/// VirSorter2 reference database layout. Unlike CheckV there is no outer
/// wrapper directory; `group/`, `hmm/` and `rbs/` sit directly under the
/// root, next to the tool's `Done_all_setup` marker.
pub struct Virsorter2Db;

impl Virsorter2Db {
    pub fn schema() -> Result<DirectorySchema, VirokitError> {
        DirectorySchema::new(
            "virsorter2-db",
            &[
                SchemaEntry {
                    pattern: r"Done_all_setup",
                    kind: FileKind::Binary,
                    cardinality: Cardinality::One,
                },
                SchemaEntry {
                    pattern: r"group/[^/]+/model",
                    kind: FileKind::Binary,
                    cardinality: Cardinality::Collection,
                },
                // The file name misspells "category"; that is the tool's own
                // spelling and the pattern must follow it.
                SchemaEntry {
                    pattern: r"rbs/rbs-catetory\.tsv",
                    kind: formats::RBS_CATEGORY,
                    cardinality: Cardinality::One,
                },
                SchemaEntry {
                    pattern: r"rbs/rbs-catetory-notes\.tsv",
                    kind: formats::RBS_CATEGORY_NOTES,
                    cardinality: Cardinality::One,
                },
                SchemaEntry {
                    pattern: r"group/[^/]+/hallmark-gene\.list",
                    kind: formats::HALLMARK_GENE_LIST,
                    cardinality: Cardinality::Collection,
                },
                SchemaEntry {
                    pattern: r"hmm/.+/.+\.hmm",
                    kind: FileKind::Profile,
                    cardinality: Cardinality::Collection,
                },
                SchemaEntry {
                    pattern: r"hmm/.+/.+\.tsv",
                    kind: FileKind::Tabular,
                    cardinality: Cardinality::Collection,
                },
            ],
        )
    }

    pub fn setup_marker_path() -> Utf8PathBuf {
        Utf8PathBuf::from("Done_all_setup")
    }

    pub fn group_model_path(group: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("group/{group}/model"))
    }

    pub fn hallmark_gene_list_path(group: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("group/{group}/hallmark-gene.list"))
    }

    pub fn hmm_profile_path(dir: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("hmm/{dir}/{name}.hmm"))
    }

    pub fn hmm_table_path(dir: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("hmm/{dir}/{name}.tsv"))
    }

    pub fn rbs_category_path() -> Utf8PathBuf {
        Utf8PathBuf::from("rbs/rbs-catetory.tsv")
    }

    pub fn rbs_category_notes_path() -> Utf8PathBuf {
        Utf8PathBuf::from("rbs/rbs-catetory-notes.tsv")
    }
}

/// geNomad reference database layout: one outer directory holding the
/// marker index blobs, their metadata tables and a version marker.
pub struct GenomadDb;

impl GenomadDb {
    pub fn schema() -> Result<DirectorySchema, VirokitError> {
        DirectorySchema::new(
            "genomad-db",
            &[
                SchemaEntry {
                    pattern: r"[^/]+/version\.txt",
                    kind: FileKind::Binary,
                    cardinality: Cardinality::One,
                },
                SchemaEntry {
                    pattern: r"[^/]+/genomad_db[^/]*",
                    kind: FileKind::Binary,
                    cardinality: Cardinality::Collection,
                },
                SchemaEntry {
                    pattern: r"[^/]+/[^/]+_metadata\.tsv",
                    kind: FileKind::Tabular,
                    cardinality: Cardinality::Collection,
                },
            ],
        )
    }

    pub fn version_path(outer: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/version.txt"))
    }

    pub fn index_path(outer: &str, suffix: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/genomad_db{suffix}"))
    }

    pub fn metadata_table_path(outer: &str, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{outer}/{name}_metadata.tsv"))
    }
}

/// A flat results bundle of per-sample metadata tables, one
/// `<sample>_<metric>.tsv` file per sample.
pub struct MetadataBundle;

impl MetadataBundle {
    pub fn schema() -> Result<DirectorySchema, VirokitError> {
        DirectorySchema::new(
            "sample-metadata",
            &[SchemaEntry {
                pattern: r"[^/]+\.tsv",
                kind: FileKind::Tabular,
                cardinality: Cardinality::Collection,
            }],
        )
    }

    pub fn table_path(name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{name}.tsv"))
    }
}
