//! GenBank flat-file sequence extraction.
//!
//! Only what the statistics need is read: the locus name from the `LOCUS`
//! line and the letters of the `ORIGIN` block. Features and qualifiers are
//! ignored.
//!
//! ```text
//! LOCUS       NC_045512  29903 bp ss-RNA  linear  VRL 18-JUL-2020
//! ...
//! ORIGIN
//!         1 attaaaggtt tataccttcc caggtaacaa accaaccaac tttcgatctc
//!        61 ttgtagatct gttctctaaa cgaacttta
//! //
//! ```

use thiserror::Error;

/// Errors that can occur during GenBank extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenBankError {
    #[error("Missing LOCUS line")]
    MissingLocus,

    #[error("Record '{0}' has no ORIGIN sequence")]
    MissingOrigin(String),
}

/// A GenBank record reduced to its name and sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenBankRecord {
    /// Locus name (second token of the LOCUS line)
    pub locus: String,
    /// ORIGIN letters with position numbers and whitespace removed
    pub sequence: String,
}

/// Parses GenBank content, returning every record that carries sequence.
pub fn parse_genbank_str(content: &str) -> Result<Vec<GenBankRecord>, GenBankError> {
    let mut records = Vec::new();
    let mut locus: Option<String> = None;
    let mut sequence = String::new();
    let mut in_origin = false;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("LOCUS") {
            locus = Some(rest.split_whitespace().next().unwrap_or_default().to_string());
            sequence.clear();
            in_origin = false;
        } else if line.starts_with("ORIGIN") {
            if locus.is_none() {
                return Err(GenBankError::MissingLocus);
            }
            in_origin = true;
        } else if line.starts_with("//") {
            let name = locus.take().ok_or(GenBankError::MissingLocus)?;
            if sequence.is_empty() {
                return Err(GenBankError::MissingOrigin(name));
            }
            records.push(GenBankRecord {
                locus: name,
                sequence: std::mem::take(&mut sequence),
            });
            in_origin = false;
        } else if in_origin {
            sequence.extend(line.chars().filter(|c| c.is_alphabetic()));
        }
    }

    // Tolerate a missing final "//" terminator
    if let Some(name) = locus {
        if !sequence.is_empty() {
            records.push(GenBankRecord { locus: name, sequence });
        } else if records.is_empty() {
            return Err(GenBankError::MissingOrigin(name));
        }
    }

    if records.is_empty() {
        return Err(GenBankError::MissingLocus);
    }

    Ok(records)
}
