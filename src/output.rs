use std::io::{self, Write};

use serde::Serialize;

use crate::schema::Violation;
use crate::store::FetchedDb;

#[derive(Debug, Clone, Serialize)]
pub struct ValidateResult {
    pub schema: String,
    pub path: String,
    pub pass: bool,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub tool: String,
    pub samples: Vec<String>,
    pub output_root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombineResult {
    pub rows: usize,
    pub columns: Vec<String>,
    pub output: Option<String>,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_fetch(result: &FetchedDb) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_validate(result: &ValidateResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_analysis(result: &AnalysisResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_combine(result: &CombineResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
