use std::fs;

use camino::Utf8Path;

use crate::error::VirokitError;

/// Probability rows must sum to one within this tolerance.
const TOLERANCE: f64 = 0.0001;

/// A parsed HMMER3 text profile, reduced to the fields the validator needs.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub length: usize,
    pub alphabet_size: usize,
}

/// Parse the first profile in the file and check its internal consistency.
///
/// The grammar is the HMMER3 save format: a key-value header section up to
/// the `HMM` symbol line, then per-node triplets of match-emission,
/// insert-emission and state-transition rows, terminated by `//`. Scores are
/// negative natural logs of probabilities; `*` stands for probability zero.
pub fn validate_profile(path: &Utf8Path) -> Result<(), VirokitError> {
    parse_profile(path).map(|_| ())
}

pub fn parse_profile(path: &Utf8Path) -> Result<Profile, VirokitError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| VirokitError::Filesystem(format!("open {path}: {err}")))?;
    let invalid = |message: String| VirokitError::InvalidProfile {
        path: path.to_path_buf(),
        message,
    };

    let mut lines = content.lines();

    let first = lines
        .next()
        .ok_or_else(|| invalid("file is empty".to_string()))?;
    if !first.starts_with("HMMER3") {
        return Err(invalid("missing HMMER3 format line".to_string()));
    }

    let mut name: Option<String> = None;
    let mut length: Option<usize> = None;
    let mut symbols: Option<usize> = None;

    // Header section runs until the HMM symbol line.
    for line in lines.by_ref() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("NAME") => {
                name = tokens.next().map(str::to_string);
            }
            Some("LENG") => {
                let value = tokens
                    .next()
                    .ok_or_else(|| invalid("LENG field has no value".to_string()))?;
                let parsed = value
                    .parse::<usize>()
                    .map_err(|_| invalid(format!("unparseable LENG value: {value}")))?;
                if parsed == 0 {
                    return Err(invalid("LENG must be positive".to_string()));
                }
                length = Some(parsed);
            }
            Some("HMM") => {
                symbols = Some(tokens.count());
                break;
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| invalid("missing NAME header field".to_string()))?;
    let length = length.ok_or_else(|| invalid("missing LENG header field".to_string()))?;
    let alphabet_size =
        symbols.ok_or_else(|| invalid("missing HMM symbol line".to_string()))?;
    if alphabet_size == 0 {
        return Err(invalid("HMM symbol line names no symbols".to_string()));
    }

    // Transition column header (m->m ... d->d).
    lines
        .next()
        .ok_or_else(|| invalid("truncated after HMM symbol line".to_string()))?;

    let mut nodes = 0usize;
    let mut state = BodyRow::Insert;
    for line in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => continue,
            ["//", ..] => break,
            ["COMPO", rest @ ..] => {
                check_emission_row(path, rest, alphabet_size, "COMPO")?;
            }
            rest => match state {
                BodyRow::Insert => {
                    check_emission_row(path, rest, alphabet_size, "insert emission")?;
                    state = BodyRow::Transition;
                }
                BodyRow::Transition => {
                    check_transition_row(path, rest)?;
                    state = BodyRow::Match;
                }
                BodyRow::Match => {
                    // First token is the node number, trailing tokens are
                    // MAP/CONS/RF/MM/CS annotation columns.
                    if rest.len() < alphabet_size + 1 {
                        return Err(invalid(format!(
                            "match emission row has {} fields, expected at least {}",
                            rest.len(),
                            alphabet_size + 1
                        )));
                    }
                    check_emission_row(
                        path,
                        &rest[1..=alphabet_size],
                        alphabet_size,
                        "match emission",
                    )?;
                    nodes += 1;
                    state = BodyRow::Insert;
                }
            },
        }
    }

    if nodes != length {
        return Err(invalid(format!(
            "LENG is {length} but the body has {nodes} match state(s)"
        )));
    }

    Ok(Profile {
        name,
        length,
        alphabet_size,
    })
}

#[derive(Debug, Clone, Copy)]
enum BodyRow {
    Insert,
    Transition,
    Match,
}

fn score_to_probability(path: &Utf8Path, token: &str) -> Result<f64, VirokitError> {
    if token == "*" {
        return Ok(0.0);
    }
    token
        .parse::<f64>()
        .map(|score| (-score).exp())
        .map_err(|_| VirokitError::InvalidProfile {
            path: path.to_path_buf(),
            message: format!("unparseable score value: {token}"),
        })
}

fn check_emission_row(
    path: &Utf8Path,
    tokens: &[&str],
    expected: usize,
    row: &str,
) -> Result<(), VirokitError> {
    if tokens.len() < expected {
        return Err(VirokitError::InvalidProfile {
            path: path.to_path_buf(),
            message: format!(
                "{row} row has {} fields, expected {expected}",
                tokens.len()
            ),
        });
    }
    let mut sum = 0.0f64;
    for token in &tokens[..expected] {
        sum += score_to_probability(path, token)?;
    }
    check_sum(path, sum, row)
}

/// Seven transition scores per node; the three groups leaving the match,
/// insert and delete states must each sum to one.
fn check_transition_row(path: &Utf8Path, tokens: &[&str]) -> Result<(), VirokitError> {
    if tokens.len() != 7 {
        return Err(VirokitError::InvalidProfile {
            path: path.to_path_buf(),
            message: format!("transition row has {} fields, expected 7", tokens.len()),
        });
    }
    let mut probabilities = [0.0f64; 7];
    for (slot, token) in probabilities.iter_mut().zip(tokens) {
        *slot = score_to_probability(path, token)?;
    }
    check_sum(path, probabilities[..3].iter().sum(), "match transition")?;
    check_sum(path, probabilities[3..5].iter().sum(), "insert transition")?;
    check_sum(path, probabilities[5..].iter().sum(), "delete transition")
}

fn check_sum(path: &Utf8Path, sum: f64, row: &str) -> Result<(), VirokitError> {
    if (sum - 1.0).abs() > TOLERANCE {
        return Err(VirokitError::InvalidProfile {
            path: path.to_path_buf(),
            message: format!("{row} probabilities sum to {sum:.5}, expected 1"),
        });
    }
    Ok(())
}
