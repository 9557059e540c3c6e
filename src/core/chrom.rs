//! Chromosome ordering
//!
//! Maps chromosome labels to integers that sort like `sort -V` for the
//! usual human/mouse naming (`chr1 < chr2 < chr10 < chrX < chrY < chrM`).
//! Labels that are neither numeric nor a known alias fall back to a
//! SHA-1 digest reduced modulo 10^8, which is stable across runs but may
//! collide: two colliding labels compare as the same chromosome.

use sha1::{Digest, Sha1};

/// Modulus applied to the hash fallback
pub const HASH_MODULUS: u64 = 100_000_000;

/// Convert a chromosome label to a sortable integer
///
/// # Examples
/// ```
/// use wigtools::core::chrom_to_sortable;
///
/// assert_eq!(chrom_to_sortable("chr1"), 1);
/// assert_eq!(chrom_to_sortable("X"), 23);
/// assert_eq!(chrom_to_sortable("chrMT"), 26);
/// assert!(chrom_to_sortable("chr2") < chrom_to_sortable("chr10"));
/// ```
pub fn chrom_to_sortable(chrom: &str) -> u64 {
    let stripped = chrom.strip_prefix("chr").unwrap_or(chrom);
    let aliased = match stripped {
        "X" => "23",
        "Y" => "24",
        "M" => "25",
        "MT" => "26",
        other => other,
    };

    if !aliased.is_empty() && aliased.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(number) = aliased.parse::<u64>() {
            return number;
        }
    }
    hash_label(stripped)
}

/// Big-endian SHA-1 digest of the label, modulo [`HASH_MODULUS`]
fn hash_label(label: &str) -> u64 {
    Sha1::digest(label.as_bytes())
        .iter()
        .fold(0u64, |acc, &byte| (acc * 256 + byte as u64) % HASH_MODULUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_chroms() {
        assert_eq!(chrom_to_sortable("1"), 1);
        assert_eq!(chrom_to_sortable("27"), 27);
        assert_eq!(chrom_to_sortable("chr99"), 99);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(chrom_to_sortable("X"), 23);
        assert_eq!(chrom_to_sortable("Y"), 24);
        assert_eq!(chrom_to_sortable("M"), 25);
        assert_eq!(chrom_to_sortable("MT"), 26);
        assert_eq!(chrom_to_sortable("chrX"), 23);
        // numeric 23 and X share a slot
        assert_eq!(chrom_to_sortable("chr23"), chrom_to_sortable("chrX"));
    }

    #[test]
    fn test_aliases_are_case_sensitive() {
        assert_ne!(chrom_to_sortable("x"), 23);
        assert_ne!(chrom_to_sortable("Chr1"), 1);
    }

    #[test]
    fn test_hash_fallback() {
        // SHA-1("abc") = a9993e36...9cd0d89d
        assert_eq!(chrom_to_sortable("abc"), 66479517);
        assert_eq!(chrom_to_sortable("chrabc"), 66479517);
        assert!(chrom_to_sortable("scaffold_1") < HASH_MODULUS);
    }

    #[test]
    fn test_huge_number_falls_back_to_hash() {
        let label = "123456789012345678901234567890";
        assert!(chrom_to_sortable(label) < HASH_MODULUS);
    }
}
