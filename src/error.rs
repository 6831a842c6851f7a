use std::path::PathBuf;

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum VirokitError {
    #[error("file could not be parsed as TSV: {0}")]
    Parse(String),

    #[error("the file is empty: {0}")]
    EmptyFile(Utf8PathBuf),

    #[error("no input files found in directory: {0}")]
    EmptyInput(Utf8PathBuf),

    #[error("not a tab-separated table ({columns} column(s)): {path}")]
    MalformedTable { path: Utf8PathBuf, columns: usize },

    #[error("expected {expected} fields but found {found} on line {line}: {path}")]
    FieldCount {
        path: Utf8PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("empty {field} field on line {line}: {path}")]
    EmptyField {
        path: Utf8PathBuf,
        line: usize,
        field: &'static str,
    },

    #[error("invalid profile file {path}: {message}")]
    InvalidProfile { path: Utf8PathBuf, message: String },

    #[error("no file matches required pattern: {0}")]
    MissingRequiredFile(String),

    #[error("directory layout has {problems} problem(s):\n{report}")]
    LayoutInvalid { problems: usize, report: String },

    #[error(
        "columns in {path} do not match the first input file (expected [{expected}], found [{found}])"
    )]
    ColumnMismatch {
        path: Utf8PathBuf,
        expected: String,
        found: String,
    },

    #[error("invalid sample file name: {0}")]
    InvalidSampleName(String),

    #[error("missing config file virokit.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("{tool} failed (return code {code}), inspect stdout and stderr to learn more")]
    ToolFailed { tool: String, code: i32 },

    #[error("{tool} was terminated by a signal")]
    ToolKilled { tool: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
