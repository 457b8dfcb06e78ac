//! FASTA parser.
//!
//! Handles single-line and multi-line records. Sequence letters are kept as
//! written (case preserved), only whitespace inside sequence lines is removed.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//! >another_sequence
//! TGCATGCATGCA...
//! ```

use thiserror::Error;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FastaError {
    #[error("Empty FASTA file")]
    EmptyFile,

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// A single FASTA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Identifier (header text up to the first whitespace, without '>')
    pub id: String,
    /// Sequence letters with whitespace removed
    pub sequence: String,
}

/// Parses FASTA content from a string.
///
/// Records with a header but no sequence lines are skipped. Returns
/// `EmptyFile` when no record carries sequence data.
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<FastaRecord>> {
    let mut records = Vec::new();
    let mut current_id: Option<&str> = None;
    let mut current_seq = String::new();

    for (line_number, line) in content.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                if !current_seq.is_empty() {
                    records.push(FastaRecord {
                        id: id.to_string(),
                        sequence: std::mem::take(&mut current_seq),
                    });
                }
            }

            let id = header.split_whitespace().next().unwrap_or(header);

            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }

            current_id = Some(id);
            current_seq.clear();
        } else {
            if current_id.is_none() {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            }

            if line.chars().all(|c| !c.is_whitespace()) {
                current_seq.push_str(line);
            } else {
                current_seq.extend(line.chars().filter(|c| !c.is_whitespace()));
            }
        }
    }

    // Don't forget the last record
    if let Some(id) = current_id {
        if !current_seq.is_empty() {
            records.push(FastaRecord {
                id: id.to_string(),
                sequence: current_seq,
            });
        }
    }

    if records.is_empty() {
        return Err(FastaError::EmptyFile);
    }

    Ok(records)
}
