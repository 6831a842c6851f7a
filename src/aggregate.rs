use std::fs::{self, File};
use std::io::Write;

use camino::Utf8Path;
use serde::Serialize;

use crate::domain::SampleId;
use crate::error::VirokitError;

/// Label of the leading column naming the sample each row came from.
pub const SAMPLE_ID_COLUMN: &str = "sample_id";

/// Label of the synthetic dense row index. Distinct from the sample column;
/// assigned by aggregation order, not by source file.
pub const INDEX_COLUMN: &str = "id";

/// One long-form table combining every per-sample metadata file.
///
/// `columns` starts with the index and sample-identifier labels followed by
/// the source files' own header; every row carries its stringified index in
/// the first cell and its sample identifier in the second.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CombinedTable {
    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<(), VirokitError> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        out.write_record(&self.columns)
            .map_err(|err| VirokitError::Parse(err.to_string()))?;
        for row in &self.rows {
            out.write_record(row)
                .map_err(|err| VirokitError::Parse(err.to_string()))?;
        }
        out.flush()
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

/// Merge a directory of single-sample, single-metric tables into one table.
///
/// File names are sorted lexicographically before reading so the output is
/// identical regardless of the filesystem's native listing order. Every file
/// must share the header of the first; divergent headers are rejected rather
/// than silently misaligned.
pub fn combine_sample_metadata(directory: &Utf8Path) -> Result<CombinedTable, VirokitError> {
    let mut file_names = Vec::new();
    let entries = fs::read_dir(directory.as_std_path())
        .map_err(|err| VirokitError::Filesystem(format!("read {directory}: {err}")))?;
    for entry in entries {
        let entry = entry.map_err(|err| VirokitError::Filesystem(err.to_string()))?;
        let file_type = entry
            .file_type()
            .map_err(|err| VirokitError::Filesystem(err.to_string()))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().into_string().map_err(|name| {
            VirokitError::Filesystem(format!("non-UTF-8 file name: {}", name.display()))
        })?;
        file_names.push(name);
    }

    if file_names.is_empty() {
        return Err(VirokitError::EmptyInput(directory.to_path_buf()));
    }
    file_names.sort();

    let mut header: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for name in &file_names {
        let path = directory.join(name);
        let sample = SampleId::from_file_name(name)?;

        let file = File::open(path.as_std_path())
            .map_err(|err| VirokitError::Filesystem(format!("open {path}: {err}")))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(file);

        let file_header: Vec<String> = reader
            .headers()
            .map_err(|err| VirokitError::Parse(err.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        match &header {
            None => header = Some(file_header),
            Some(expected) if *expected != file_header => {
                return Err(VirokitError::ColumnMismatch {
                    path,
                    expected: expected.join(", "),
                    found: file_header.join(", "),
                });
            }
            Some(_) => {}
        }

        for record in reader.records() {
            let record = record.map_err(|err| VirokitError::Parse(err.to_string()))?;
            let mut row = Vec::with_capacity(record.len() + 2);
            row.push(String::new()); // index, assigned after concatenation
            row.push(sample.as_str().to_string());
            row.extend(record.iter().map(str::to_string));
            rows.push(row);
        }
    }

    for (index, row) in rows.iter_mut().enumerate() {
        row[0] = index.to_string();
    }

    let mut columns = vec![INDEX_COLUMN.to_string(), SAMPLE_ID_COLUMN.to_string()];
    columns.extend(header.unwrap_or_default());

    Ok(CombinedTable { columns, rows })
}
