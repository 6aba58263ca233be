//! One-letter amino acid codes and the free monomers they stand for

use std::collections::BTreeMap;

/// The twenty proteinogenic amino acids, `(symbol, monomer id)`
pub const AMINO_ACIDS: [(char, &str); 20] = [
    ('A', "Alanine"),
    ('R', "Arginine"),
    ('N', "Asparagine"),
    ('D', "Aspartate"),
    ('C', "Cysteine"),
    ('E', "Glutamate"),
    ('Q', "Glutamine"),
    ('G', "Glycine"),
    ('H', "Histidine"),
    ('I', "Isoleucine"),
    ('L', "Leucine"),
    ('K', "Lysine"),
    ('M', "Methionine"),
    ('F', "Phenylalanine"),
    ('P', "Proline"),
    ('S', "Serine"),
    ('T', "Threonine"),
    ('W', "Tryptophan"),
    ('Y', "Tyrosine"),
    ('V', "Valine"),
];

/// Symbol → monomer alphabet for protein sequences
pub fn amino_acid_alphabet() -> BTreeMap<char, String> {
    AMINO_ACIDS
        .iter()
        .map(|(symbol, id)| (*symbol, id.to_string()))
        .collect()
}

/// Monomer ids in table order
pub fn amino_acid_ids() -> Vec<String> {
    AMINO_ACIDS.iter().map(|(_, id)| id.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_covers_every_monomer_once() {
        let alphabet = amino_acid_alphabet();
        assert_eq!(alphabet.len(), 20);

        let mut ids = amino_acid_ids();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
        assert_eq!(alphabet.get(&'W').map(String::as_str), Some("Tryptophan"));
    }
}
