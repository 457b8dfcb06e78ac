//! Plain-text report for batch mode.
//!
//! Sections are tab-separated so the output can be piped into other tools.

use std::io::{self, Write};

use crate::formats::Upload;
use crate::prompt::AnalysisCategory;
use crate::stats::{codon_usage, composition, kmer_frequency, SequenceSummary};

/// Writes sequence information and all three statistics.
///
/// Statistics that cannot be computed are reported as a `warning:` line.
pub fn write_stats_report<W: Write>(out: &mut W, upload: &Upload, kmer_size: usize) -> io::Result<()> {
    let summary = SequenceSummary::from_sequence(&upload.sequence);

    writeln!(out, "# {}", upload.file_name())?;
    writeln!(out, "format\t{}", upload.format)?;
    if let Some(id) = &upload.record_id {
        writeln!(out, "record\t{}", id)?;
    }
    writeln!(out, "length\t{}", summary.length)?;
    writeln!(out, "gc_percent\t{:.2}", summary.gc_percent)?;
    writeln!(out, "preview\t{}", upload.preview())?;

    let comp = composition(&upload.sequence);
    writeln!(out)?;
    writeln!(out, "## Nucleotide Composition")?;
    for (base, count) in comp.counts() {
        writeln!(out, "{}\t{}", base, count)?;
    }
    if comp.other > 0 {
        writeln!(out, "other\t{}", comp.other)?;
    }

    writeln!(out)?;
    match kmer_frequency(&upload.sequence, kmer_size) {
        Ok(kmers) => {
            writeln!(out, "## Top {}-mer Frequencies", kmers.k)?;
            for (kmer, count) in &kmers.entries {
                writeln!(out, "{}\t{}", kmer, count)?;
            }
        }
        Err(e) => writeln!(out, "warning: {}", e)?,
    }

    writeln!(out)?;
    match codon_usage(&upload.sequence) {
        Ok(codons) => {
            writeln!(out, "## Codon Usage Frequency")?;
            for (codon, count) in codons.annotated() {
                writeln!(out, "{}\t{}", codon, count)?;
            }
        }
        Err(e) => writeln!(out, "warning: {}", e)?,
    }

    Ok(())
}

/// Appends one LLM analysis reply under its category heading.
pub fn write_analysis<W: Write>(out: &mut W, category: AnalysisCategory, reply: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "## {}", category.label())?;
    writeln!(out, "{}", reply.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::upload_from_bytes;
    use std::path::PathBuf;

    fn report_for(content: &str, k: usize) -> String {
        let upload = upload_from_bytes(PathBuf::from("virus.fasta"), content.as_bytes().to_vec()).unwrap();
        let mut buf = Vec::new();
        write_stats_report(&mut buf, &upload, k).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_stats_report_sections() {
        let report = report_for(">v1 test virus\nATGAAATGA\n", 3);

        assert!(report.starts_with("# virus.fasta\n"));
        assert!(report.contains("record\tv1\n"));
        assert!(report.contains("length\t9\n"));
        assert!(report.contains("preview\tATGAAATGA...\n"));
        assert!(report.contains("A\t5\nT\t2\nG\t2\nC\t0\n"));
        assert!(report.contains("## Top 3-mer Frequencies\n"));
        assert!(report.contains("ATG/M\t1\nAAA/K\t1\nTGA/*\t1\n"));
        assert!(!report.contains("other\t"));
    }

    #[test]
    fn test_stats_report_partial_codon_warning() {
        let report = report_for(">v1\nACGTN\n", 2);

        assert!(report.contains("other\t1\n"));
        assert!(report.contains(
            "warning: Sequence length is not a multiple of 3 for codon analysis"
        ));
        assert!(!report.contains("## Codon Usage Frequency"));
    }

    #[test]
    fn test_write_analysis() {
        let mut buf = Vec::new();
        write_analysis(&mut buf, AnalysisCategory::DrugTargetSites, "Looks fine.\n\n").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\n## Drug Target Sites\nLooks fine.\n");
    }
}
