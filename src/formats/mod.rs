//! Genome upload reader.
//!
//! Accepts `.fasta`, `.txt` and `.gb` files (plus the usual aliases) and
//! extracts a single sequence from the decoded text:
//! 1. FASTA text (first non-empty line starts with `>`): last record wins
//! 2. GenBank text (first non-empty line starts with `LOCUS`): ORIGIN letters
//! 3. Anything else, or a FASTA/GenBank parse failure: the whole payload
//!    with whitespace removed

pub mod fasta;
pub mod genbank;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

/// Number of characters shown in the sequence preview.
pub const PREVIEW_CHARS: usize = 100;

/// Where the extracted sequence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Fasta,
    GenBank,
    Raw,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Fasta => write!(f, "FASTA"),
            SourceFormat::GenBank => write!(f, "GenBank"),
            SourceFormat::Raw => write!(f, "raw text"),
        }
    }
}

/// Errors that can occur while reading an upload.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported file type '{0}' (expected .fasta, .txt or .gb)")]
    UnsupportedExtension(String),

    #[error("File is not valid UTF-8 text: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("No sequence data found")]
    NoSequence,
}

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// A loaded genome file.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Path the file was read from
    pub path: PathBuf,
    /// Decoded file text, headers included
    pub raw: String,
    /// Record identifier, when the format carries one
    pub record_id: Option<String>,
    /// Extracted sequence letters (case preserved)
    pub sequence: String,
    /// Format the sequence was extracted from
    pub format: SourceFormat,
}

impl Upload {
    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(OsStr::to_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// First hundred characters of the sequence followed by `...`.
    pub fn preview(&self) -> String {
        let head: String = self.sequence.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

/// Checks the file extension against the accepted upload types.
pub fn check_extension<P: AsRef<Path>>(path: P) -> UploadResult<()> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "fasta" | "fa" | "fna" | "txt" | "gb" | "gbk" => Ok(()),
        _ => Err(UploadError::UnsupportedExtension(ext)),
    }
}

/// Detects the sequence format by examining the content.
pub fn detect_format_from_content(content: &str) -> SourceFormat {
    let first = content.lines().map(str::trim).find(|l| !l.is_empty());
    match first {
        Some(line) if line.starts_with('>') => SourceFormat::Fasta,
        Some(line) if line.starts_with("LOCUS") => SourceFormat::GenBank,
        _ => SourceFormat::Raw,
    }
}

/// Removes every whitespace character.
fn strip_whitespace(content: &str) -> String {
    content.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Extracts one sequence from decoded upload text.
///
/// Returns the source format, the record identifier if any, and the
/// sequence. Parse failures fall back to the raw payload.
pub fn extract_sequence(content: &str) -> UploadResult<(SourceFormat, Option<String>, String)> {
    if content.trim().is_empty() {
        return Err(UploadError::EmptyFile);
    }

    let extracted = match detect_format_from_content(content) {
        SourceFormat::Fasta => match fasta::parse_fasta_str(content) {
            Ok(mut records) => records
                .pop()
                .map(|r| (SourceFormat::Fasta, Some(r.id), r.sequence)),
            Err(e) => {
                warn!("FASTA parsing failed ({}), using raw content", e);
                None
            }
        },
        SourceFormat::GenBank => match genbank::parse_genbank_str(content) {
            Ok(mut records) => records
                .pop()
                .map(|r| (SourceFormat::GenBank, Some(r.locus), r.sequence)),
            Err(e) => {
                warn!("GenBank parsing failed ({}), using raw content", e);
                None
            }
        },
        SourceFormat::Raw => None,
    };

    let (format, id, sequence) =
        extracted.unwrap_or_else(|| (SourceFormat::Raw, None, strip_whitespace(content)));

    if sequence.is_empty() {
        return Err(UploadError::NoSequence);
    }

    Ok((format, id, sequence))
}

/// Builds an upload from file bytes.
pub fn upload_from_bytes(path: PathBuf, bytes: Vec<u8>) -> UploadResult<Upload> {
    let raw = String::from_utf8(bytes)?;
    let (format, record_id, sequence) = extract_sequence(&raw)?;

    Ok(Upload {
        path,
        raw,
        record_id,
        sequence,
        format,
    })
}

/// Reads and decodes a genome file.
pub fn load_upload<P: AsRef<Path>>(path: P) -> UploadResult<Upload> {
    let path = path.as_ref();
    check_extension(path)?;

    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Err(UploadError::EmptyFile);
    }

    let upload = upload_from_bytes(path.to_path_buf(), bytes)?;
    info!(
        "Loaded {} ({}, {} characters)",
        path.display(),
        upload.format,
        upload.sequence.chars().count()
    );
    Ok(upload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format_from_content(">seq1\nACGT\n"), SourceFormat::Fasta);
        assert_eq!(detect_format_from_content("\n\n  >seq1\nACGT\n"), SourceFormat::Fasta);
        assert_eq!(
            detect_format_from_content("LOCUS       X  4 bp\nORIGIN\n 1 acgt\n//\n"),
            SourceFormat::GenBank
        );
        assert_eq!(detect_format_from_content("ACGT\nACGT\n"), SourceFormat::Raw);
    }

    #[test]
    fn test_check_extension() {
        assert!(check_extension("genome.fasta").is_ok());
        assert!(check_extension("genome.FASTA").is_ok());
        assert!(check_extension("genome.txt").is_ok());
        assert!(check_extension("genome.gb").is_ok());
        assert!(matches!(
            check_extension("genome.pdf"),
            Err(UploadError::UnsupportedExtension(ext)) if ext == "pdf"
        ));
        assert!(check_extension("genome").is_err());
    }

    #[test]
    fn test_extract_fasta_last_record_wins() {
        let (format, id, seq) = extract_sequence(">a\nAAAA\n>b\nCCCC\n").unwrap();
        assert_eq!(format, SourceFormat::Fasta);
        assert_eq!(id.as_deref(), Some("b"));
        assert_eq!(seq, "CCCC");
    }

    #[test]
    fn test_extract_raw_fallback() {
        let (format, id, seq) = extract_sequence("ATGC ATGC\nATGC\r\n").unwrap();
        assert_eq!(format, SourceFormat::Raw);
        assert_eq!(id, None);
        assert_eq!(seq, "ATGCATGCATGC");
    }

    #[test]
    fn test_extract_broken_fasta_falls_back() {
        // Empty identifier makes the FASTA parser fail
        let (format, _, seq) = extract_sequence(">\nACGT\n").unwrap();
        assert_eq!(format, SourceFormat::Raw);
        assert_eq!(seq, ">ACGT");
    }

    #[test]
    fn test_extract_genbank() {
        let content = "LOCUS       V1  8 bp\nORIGIN\n        1 acgtacgt\n//\n";
        let (format, id, seq) = extract_sequence(content).unwrap();
        assert_eq!(format, SourceFormat::GenBank);
        assert_eq!(id.as_deref(), Some("V1"));
        assert_eq!(seq, "acgtacgt");
    }

    #[test]
    fn test_extract_empty() {
        assert!(matches!(extract_sequence("  \n\n"), Err(UploadError::EmptyFile)));
    }

    #[test]
    fn test_invalid_utf8() {
        let result = upload_from_bytes(PathBuf::from("x.fasta"), vec![0xff, 0xfe, 0x41]);
        assert!(matches!(result, Err(UploadError::InvalidEncoding(_))));
    }

    #[test]
    fn test_load_upload_from_file() {
        let mut file = tempfile::Builder::new().suffix(".fasta").tempfile().unwrap();
        write!(file, ">virus test genome\nATGCATGC\nATGC\n").unwrap();

        let upload = load_upload(file.path()).unwrap();
        assert_eq!(upload.format, SourceFormat::Fasta);
        assert_eq!(upload.record_id.as_deref(), Some("virus"));
        assert_eq!(upload.sequence, "ATGCATGCATGC");
        assert!(upload.raw.starts_with(">virus test genome"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_upload("definitely_missing_genome.fasta");
        assert!(matches!(result, Err(UploadError::IoError(_))));
    }

    #[test]
    fn test_preview() {
        let long = "A".repeat(250);
        let upload = upload_from_bytes(PathBuf::from("x.txt"), long.into_bytes()).unwrap();
        assert_eq!(upload.preview().len(), PREVIEW_CHARS + 3);
        assert!(upload.preview().ends_with("..."));
    }
}
