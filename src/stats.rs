//! Sequence statistics.
//!
//! Three single-pass counters, each returning a frequency structure that can
//! describe itself as a chart:
//! - `composition`: A/T/G/C counts, case-folded
//! - `kmer_frequency`: top 20 k-mers, case preserved
//! - `codon_usage`: non-overlapping triplets from offset 0, case preserved
//!
//! Lengths and windows are measured in characters, not bytes.

use std::ops::RangeInclusive;

use indexmap::IndexMap;
use thiserror::Error;

use crate::genetic_code::translate_codon;

/// Accepted k-mer sizes.
pub const KMER_SIZE_RANGE: RangeInclusive<usize> = 2..=6;
/// Default k-mer size.
pub const DEFAULT_KMER_SIZE: usize = 3;
/// Number of k-mers kept in a frequency result.
pub const TOP_KMERS: usize = 20;
/// The four canonical bases, in display order.
pub const CANONICAL_BASES: [char; 4] = ['A', 'T', 'G', 'C'];

/// Inputs a statistic cannot be computed for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Sequence length is not a multiple of 3 for codon analysis (length {len})")]
    LengthNotMultipleOfThree { len: usize },

    #[error("K-mer size must be between 2 and 6 (got {0})")]
    InvalidKmerSize(usize),
}

/// How a chart should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Share of a whole (pie-style)
    Proportion,
    /// One bar per label
    Bar,
}

/// Renderable chart descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// (label, value) pairs in display order
    pub bars: Vec<(String, u64)>,
}

impl ChartSpec {
    /// Sum of all values.
    pub fn total(&self) -> u64 {
        self.bars.iter().map(|(_, v)| v).sum()
    }

    /// Largest value, zero for an empty chart.
    pub fn max_value(&self) -> u64 {
        self.bars.iter().map(|(_, v)| *v).max().unwrap_or(0)
    }

    /// Widest label in characters.
    pub fn max_label_width(&self) -> usize {
        self.bars
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0)
    }
}

/// Nucleotide composition over the canonical bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Composition {
    /// Counts in `CANONICAL_BASES` order
    counts: [u64; 4],
    /// Characters outside A/T/G/C (after upper-casing)
    pub other: u64,
}

impl Composition {
    /// Count for one base (case-insensitive). Zero for non-canonical bases.
    pub fn get(&self, base: char) -> u64 {
        let base = base.to_ascii_uppercase();
        CANONICAL_BASES
            .iter()
            .position(|&b| b == base)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }

    /// (base, count) pairs in A, T, G, C order.
    pub fn counts(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        CANONICAL_BASES.iter().copied().zip(self.counts.iter().copied())
    }

    /// Number of canonical-base characters.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn chart(&self) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Proportion,
            title: "Nucleotide Composition".to_string(),
            x_label: "Base".to_string(),
            y_label: "Count".to_string(),
            bars: self.counts().map(|(b, n)| (b.to_string(), n)).collect(),
        }
    }
}

/// Counts the canonical bases of a sequence, case-insensitively.
pub fn composition(sequence: &str) -> Composition {
    let mut result = Composition::default();

    for c in sequence.chars().flat_map(char::to_uppercase) {
        match CANONICAL_BASES.iter().position(|&b| b == c) {
            Some(i) => result.counts[i] += 1,
            None => result.other += 1,
        }
    }

    result
}

/// The most frequent k-mers of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerFrequency {
    pub k: usize,
    /// At most `TOP_KMERS` entries, descending count, first-seen order on ties
    pub entries: Vec<(String, u64)>,
}

impl KmerFrequency {
    pub fn get(&self, kmer: &str) -> Option<u64> {
        self.entries.iter().find(|(key, _)| key == kmer).map(|(_, n)| *n)
    }

    pub fn chart(&self) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            title: format!("Top {}-mer Frequencies", self.k),
            x_label: format!("{}-mer", self.k),
            y_label: "Frequency".to_string(),
            bars: self.entries.clone(),
        }
    }
}

/// Counts every k-length window and keeps the top 20.
///
/// A sequence shorter than `k` yields an empty result.
pub fn kmer_frequency(sequence: &str, k: usize) -> Result<KmerFrequency, StatsError> {
    if !KMER_SIZE_RANGE.contains(&k) {
        return Err(StatsError::InvalidKmerSize(k));
    }

    let chars: Vec<char> = sequence.chars().collect();
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for window in chars.windows(k) {
        *counts.entry(window.iter().collect()).or_insert(0) += 1;
    }

    // sort_by is stable: equal counts keep first-seen order
    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(TOP_KMERS);

    Ok(KmerFrequency { k, entries })
}

/// Codon counts in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodonUsage {
    pub entries: Vec<(String, u64)>,
}

impl CodonUsage {
    pub fn get(&self, codon: &str) -> Option<u64> {
        self.entries.iter().find(|(key, _)| key == codon).map(|(_, n)| *n)
    }

    /// Number of codons counted.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Entries labelled `CODON/AA` with the standard genetic code.
    pub fn annotated(&self) -> Vec<(String, u64)> {
        self.entries
            .iter()
            .map(|(codon, n)| (format!("{}/{}", codon, translate_codon(codon)), *n))
            .collect()
    }

    pub fn chart(&self) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            title: "Codon Usage Frequency".to_string(),
            x_label: "Codon".to_string(),
            y_label: "Frequency".to_string(),
            bars: self.annotated(),
        }
    }
}

/// Splits a sequence into consecutive triplets and counts them.
///
/// Fails with `LengthNotMultipleOfThree` unless the length divides by 3.
pub fn codon_usage(sequence: &str) -> Result<CodonUsage, StatsError> {
    let chars: Vec<char> = sequence.chars().collect();
    if chars.len() % 3 != 0 {
        return Err(StatsError::LengthNotMultipleOfThree { len: chars.len() });
    }

    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for codon in chars.chunks_exact(3) {
        *counts.entry(codon.iter().collect()).or_insert(0) += 1;
    }

    Ok(CodonUsage {
        entries: counts.into_iter().collect(),
    })
}

/// Length and GC content shown next to the sequence preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceSummary {
    /// Length in characters
    pub length: usize,
    /// G+C share of the canonical bases, in percent
    pub gc_percent: f64,
}

impl SequenceSummary {
    pub fn from_sequence(sequence: &str) -> Self {
        let comp = composition(sequence);
        let total = comp.total();
        let gc_percent = if total == 0 {
            0.0
        } else {
            (comp.get('G') + comp.get('C')) as f64 * 100.0 / total as f64
        };

        Self {
            length: sequence.chars().count(),
            gc_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composition_example() {
        let comp = composition("ATGCATGCATGC");
        assert_eq!(comp.get('A'), 3);
        assert_eq!(comp.get('T'), 3);
        assert_eq!(comp.get('G'), 3);
        assert_eq!(comp.get('C'), 3);
        assert_eq!(comp.other, 0);
    }

    #[test]
    fn test_composition_case_folded() {
        let comp = composition("aaTtgN-n");
        assert_eq!(comp.get('A'), 2);
        assert_eq!(comp.get('T'), 2);
        assert_eq!(comp.get('G'), 1);
        assert_eq!(comp.get('C'), 0);
        assert_eq!(comp.other, 3);
        assert_eq!(comp.total(), 5);
    }

    #[test]
    fn test_composition_sum_matches_canonical_count() {
        for seq in ["", "ACGT", "acgtnnRY", "xyz", "GGGGccccAAAA--", "ßacg"] {
            let expected = seq
                .to_uppercase()
                .chars()
                .filter(|c| CANONICAL_BASES.contains(c))
                .count() as u64;
            assert_eq!(composition(seq).total(), expected, "sequence {:?}", seq);
        }
    }

    #[test]
    fn test_composition_empty() {
        let comp = composition("");
        assert!(comp.counts().all(|(_, n)| n == 0));
    }

    #[test]
    fn test_composition_chart() {
        let chart = composition("AAC").chart();
        assert_eq!(chart.kind, ChartKind::Proportion);
        assert_eq!(
            chart.bars,
            vec![
                ("A".to_string(), 2),
                ("T".to_string(), 0),
                ("G".to_string(), 0),
                ("C".to_string(), 1)
            ]
        );
        assert_eq!(chart.total(), 3);
    }

    #[test]
    fn test_kmer_example() {
        let kmers = kmer_frequency("ATGCATGCATGC", 3).unwrap();
        assert_eq!(
            kmers.entries,
            vec![
                ("ATG".to_string(), 3),
                ("TGC".to_string(), 3),
                ("GCA".to_string(), 2),
                ("CAT".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_kmer_case_preserved() {
        let kmers = kmer_frequency("acAC", 2).unwrap();
        assert_eq!(kmers.get("ac"), Some(1));
        assert_eq!(kmers.get("AC"), Some(1));
        assert_eq!(kmers.get("cA"), Some(1));
    }

    #[test]
    fn test_kmer_shorter_than_k() {
        let kmers = kmer_frequency("ACG", 4).unwrap();
        assert!(kmers.entries.is_empty());
        assert!(kmer_frequency("", 2).unwrap().entries.is_empty());
    }

    #[test]
    fn test_kmer_top_twenty_with_ties() {
        // 25 distinct 2-mers, each seen once
        let seq: String = ('A'..='Z').collect();
        let kmers = kmer_frequency(&seq, 2).unwrap();
        assert_eq!(kmers.entries.len(), TOP_KMERS);
        // All counts tie, so first-seen order is kept
        assert_eq!(kmers.entries[0].0, "AB");
        assert_eq!(kmers.entries[19].0, "TU");
    }

    #[test]
    fn test_kmer_ordering_invariants() {
        let seq = "ATATATGGGCCCATGATGAAATTTCCGGATCGATCGTAGCTAGCTAGGCTA";
        for k in KMER_SIZE_RANGE {
            let kmers = kmer_frequency(seq, k).unwrap();
            assert!(kmers.entries.len() <= TOP_KMERS);
            assert!(kmers.entries.iter().all(|(key, _)| key.chars().count() == k));
            assert!(kmers.entries.windows(2).all(|w| w[0].1 >= w[1].1));
        }
    }

    #[test]
    fn test_kmer_invalid_size() {
        assert_eq!(kmer_frequency("ACGT", 1), Err(StatsError::InvalidKmerSize(1)));
        assert_eq!(kmer_frequency("ACGT", 7), Err(StatsError::InvalidKmerSize(7)));
    }

    #[test]
    fn test_kmer_chart_labels() {
        let chart = kmer_frequency("ATGCATGCATGC", 3).unwrap().chart();
        assert_eq!(chart.title, "Top 3-mer Frequencies");
        assert_eq!(chart.x_label, "3-mer");
        assert_eq!(chart.max_value(), 3);
    }

    #[test]
    fn test_codon_usage() {
        let codons = codon_usage("ATGATGTAA").unwrap();
        assert_eq!(
            codons.entries,
            vec![("ATG".to_string(), 2), ("TAA".to_string(), 1)]
        );
        assert_eq!(codons.total(), 3);
    }

    #[test]
    fn test_codon_usage_scan_order() {
        let codons = codon_usage("CCCAAACCCGGG").unwrap();
        let keys: Vec<&str> = codons.entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["CCC", "AAA", "GGG"]);
    }

    #[test]
    fn test_codon_usage_rejects_partial_codon() {
        assert_eq!(
            codon_usage("ATGCATGCATG"),
            Err(StatsError::LengthNotMultipleOfThree { len: 11 })
        );
    }

    #[test]
    fn test_codon_usage_iff_divisible() {
        for len in 0..12 {
            let seq = "ACG".repeat(4)[..len].to_string();
            match codon_usage(&seq) {
                Ok(codons) => {
                    assert_eq!(len % 3, 0);
                    assert_eq!(codons.total() as usize, len / 3);
                    assert!(codons.entries.iter().all(|(k, _)| k.len() == 3));
                }
                Err(_) => assert_ne!(len % 3, 0),
            }
        }
    }

    #[test]
    fn test_codon_chart_annotated() {
        let chart = codon_usage("atgTAA").unwrap().chart();
        assert_eq!(
            chart.bars,
            vec![("atg/M".to_string(), 1), ("TAA/*".to_string(), 1)]
        );
    }

    #[test]
    fn test_sequence_summary() {
        let summary = SequenceSummary::from_sequence("GGCCAATTNN");
        assert_eq!(summary.length, 10);
        assert!((summary.gc_percent - 50.0).abs() < f64::EPSILON);

        let empty = SequenceSummary::from_sequence("");
        assert_eq!(empty.length, 0);
        assert_eq!(empty.gc_percent, 0.0);
    }
}
