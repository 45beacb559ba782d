// streamguard-entity/src/entropy/mod.rs
//! Byte-level Shannon entropy, used to tell random-looking identifiers
//! (licence numbers, account IDs) apart from filler like `AAAA-0000`.

use libm::log2;

/// Bits of information per byte in `token`. Empty input scores `0.0`.
pub fn shannon_bits(token: &[u8]) -> f64 {
    if token.is_empty() {
        return 0.0;
    }

    let mut histogram = [0u32; 256];
    token.iter().for_each(|&b| histogram[usize::from(b)] += 1);

    let total = token.len() as f64;
    histogram
        .iter()
        .filter(|&&n| n != 0)
        .map(|&n| {
            let share = f64::from(n) / total;
            -share * log2(share)
        })
        .sum()
}

/// [`shannon_bits`] scaled so that a 16-symbol alphabet scores `1.0`.
/// Anything richer is clamped to `1.0`.
pub fn normalized_entropy(token: &[u8]) -> f64 {
    (shannon_bits(token) / 4.0).min(1.0)
}
