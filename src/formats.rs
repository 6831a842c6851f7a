use std::fs::File;

use camino::Utf8Path;

use crate::error::VirokitError;
use crate::profile;

/// Structural kind of a file inside a database or results tree.
///
/// The kind decides which validator runs against the file's content.
/// `Binary` files are opaque by policy: index and model blobs written by the
/// external tools are only readable by those tools, so existence is the
/// whole check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Tabular,
    Binary,
    Profile,
    TwoColumn { fields: [&'static str; 2] },
    ThreeColumn { fields: [&'static str; 3] },
}

pub const RBS_CATEGORY: FileKind = FileKind::TwoColumn {
    fields: ["RBS", "category"],
};

pub const RBS_CATEGORY_NOTES: FileKind = FileKind::TwoColumn {
    fields: ["RBS", "note"],
};

pub const HALLMARK_GENE_LIST: FileKind = FileKind::ThreeColumn {
    fields: ["gene", "description", "property"],
};

/// Validate a single file against its declared kind.
pub fn validate_file(path: &Utf8Path, kind: FileKind) -> Result<(), VirokitError> {
    match kind {
        FileKind::Tabular => validate_tabular(path),
        FileKind::Binary => Ok(()),
        FileKind::Profile => profile::validate_profile(path),
        FileKind::TwoColumn { fields } => validate_columns(path, &fields, true),
        FileKind::ThreeColumn { fields } => validate_columns(path, &fields, false),
    }
}

/// A general tab-separated table: header row plus at least one data row,
/// at least two columns. Cells are text; the empty string is a value.
fn validate_tabular(path: &Utf8Path) -> Result<(), VirokitError> {
    let file = open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(file);

    let columns = reader
        .headers()
        .map_err(|err| VirokitError::Parse(err.to_string()))?
        .len();

    let mut rows = 0usize;
    for record in reader.records() {
        record.map_err(|err| VirokitError::Parse(err.to_string()))?;
        rows += 1;
    }

    if rows == 0 {
        return Err(VirokitError::EmptyFile(path.to_path_buf()));
    }
    if columns < 2 {
        return Err(VirokitError::MalformedTable {
            path: path.to_path_buf(),
            columns,
        });
    }
    Ok(())
}

/// A fixed-width annotation table with named fields, no header row and no
/// empty cells. Line numbers in diagnostics are 1-indexed over data rows
/// (comment lines, when skipped, do not count).
fn validate_columns(
    path: &Utf8Path,
    fields: &[&'static str],
    skip_comments: bool,
) -> Result<(), VirokitError> {
    let file = open(path)?;
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true);
    if skip_comments {
        builder.comment(Some(b'#'));
    }
    let mut reader = builder.from_reader(file);

    let mut line = 0usize;
    for record in reader.records() {
        let record = record.map_err(|err| VirokitError::Parse(err.to_string()))?;
        line += 1;
        if record.len() != fields.len() {
            return Err(VirokitError::FieldCount {
                path: path.to_path_buf(),
                line,
                expected: fields.len(),
                found: record.len(),
            });
        }
        for (cell, field) in record.iter().zip(fields) {
            if cell.trim().is_empty() {
                return Err(VirokitError::EmptyField {
                    path: path.to_path_buf(),
                    line,
                    field,
                });
            }
        }
    }

    if line == 0 {
        return Err(VirokitError::EmptyFile(path.to_path_buf()));
    }
    Ok(())
}

fn open(path: &Utf8Path) -> Result<File, VirokitError> {
    File::open(path.as_std_path())
        .map_err(|err| VirokitError::Filesystem(format!("open {path}: {err}")))
}
