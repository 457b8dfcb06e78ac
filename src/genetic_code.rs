//! Standard genetic code lookup.
//!
//! Only NCBI table 1 is needed here: codon usage bars are labelled with the
//! amino acid each codon encodes (`ATG/M`).

/// NCBI table 1 amino acids, codons enumerated in TCAG order
/// (TTT, TTC, TTA, TTG, TCT, ...).
const STANDARD_NCBIEAA: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// Position of a nucleotide in TCAG order. RNA `U` reads as `T`.
fn base_index(b: u8) -> Option<usize> {
    match b.to_ascii_uppercase() {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

/// Translates a single codon with the standard genetic code.
///
/// Case-insensitive. Anything that is not exactly three unambiguous
/// nucleotides translates to `X`; stop codons translate to `*`.
pub fn translate_codon(codon: &str) -> char {
    let bytes = codon.as_bytes();
    if bytes.len() != 3 {
        return 'X';
    }

    match (base_index(bytes[0]), base_index(bytes[1]), base_index(bytes[2])) {
        (Some(b1), Some(b2), Some(b3)) => STANDARD_NCBIEAA[b1 * 16 + b2 * 4 + b3] as char,
        _ => 'X',
    }
}
