//! Analysis catalog and prompt templates.
//!
//! Prompts are plain text and fully deterministic: the same inputs always
//! produce byte-identical output.

use std::str::FromStr;

/// Maximum number of sequence characters embedded in an analysis prompt.
pub const SEQUENCE_EXCERPT_CHARS: usize = 1000;

/// Analyses the assistant can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisCategory {
    BasicGenomeInformation,
    ProteinStructureAnalysis,
    MutationAnalysis,
    PhylogeneticRelationships,
    PotentialVariants,
    DrugTargetSites,
}

impl AnalysisCategory {
    /// Every category, in menu order.
    pub const ALL: [AnalysisCategory; 6] = [
        AnalysisCategory::BasicGenomeInformation,
        AnalysisCategory::ProteinStructureAnalysis,
        AnalysisCategory::MutationAnalysis,
        AnalysisCategory::PhylogeneticRelationships,
        AnalysisCategory::PotentialVariants,
        AnalysisCategory::DrugTargetSites,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnalysisCategory::BasicGenomeInformation => "Basic Genome Information",
            AnalysisCategory::ProteinStructureAnalysis => "Protein Structure Analysis",
            AnalysisCategory::MutationAnalysis => "Mutation Analysis",
            AnalysisCategory::PhylogeneticRelationships => "Phylogenetic Relationships",
            AnalysisCategory::PotentialVariants => "Potential Variants",
            AnalysisCategory::DrugTargetSites => "Drug Target Sites",
        }
    }
}

impl std::fmt::Display for AnalysisCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalizes "Drug Target Sites", "drug-target-sites" and
/// "drug_target_sites" to the same key.
fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for AnalysisCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        AnalysisCategory::ALL
            .into_iter()
            .find(|c| normalize_label(c.label()) == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = AnalysisCategory::ALL.iter().map(|c| c.label()).collect();
                format!("unknown analysis '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Charts that can be drawn for a loaded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualizationKind {
    Composition,
    KmerFrequency,
    CodonUsage,
}

impl VisualizationKind {
    /// Every visualization, in menu order.
    pub const ALL: [VisualizationKind; 3] = [
        VisualizationKind::Composition,
        VisualizationKind::KmerFrequency,
        VisualizationKind::CodonUsage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VisualizationKind::Composition => "Sequence Composition",
            VisualizationKind::KmerFrequency => "K-mer Frequency Analysis",
            VisualizationKind::CodonUsage => "Codon Usage",
        }
    }
}

/// First `SEQUENCE_EXCERPT_CHARS` characters of the sequence text.
pub fn sequence_excerpt(sequence: &str) -> &str {
    match sequence.char_indices().nth(SEQUENCE_EXCERPT_CHARS) {
        Some((end, _)) => &sequence[..end],
        None => sequence,
    }
}

/// Builds the prompt for one analysis category.
pub fn build_analysis_prompt(category: AnalysisCategory, sequence: &str) -> String {
    format!(
        "As a computational biology expert, analyze this viral genome sequence for {}. Sequence: {}...",
        category.label().to_lowercase(),
        sequence_excerpt(sequence)
    )
}

/// Builds the prompt for a free-form sidebar question.
pub fn build_freeform_prompt(question: &str, has_active_sequence: bool) -> String {
    let context = if has_active_sequence {
        "\nContext: Working with viral genome sequence. "
    } else {
        ""
    };
    format!(
        "You are a computational biology and viral genomics expert. {}Question: {}",
        context, question
    )
}
