// streamguard-entity/src/validators.rs
//! Checksum and structural validation for numeric identifiers.
//!
//! These checks operate on raw bytes so they can run in `no_std`. Any
//! non-digit separators (spaces, dashes) are skipped.

/// Validates a number using the Luhn (mod 10) algorithm.
///
/// Returns `false` when the input contains no digits at all.
pub fn is_valid_luhn(input: &[u8]) -> bool {
    let mut sum = 0u32;
    let mut alternate = false;
    let mut seen = 0usize;

    for &b in input.iter().rev() {
        if !b.is_ascii_digit() {
            continue;
        }
        let mut digit = u32::from(b - b'0');
        if alternate {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        alternate = !alternate;
        seen += 1;
    }

    seen > 0 && sum % 10 == 0
}

/// Validates a US Social Security Number against the SSA structural rules.
///
/// Expects exactly nine digits once separators are removed. Area numbers
/// `000`, `666` and `900-999`, group `00` and serial `0000` are invalid.
pub fn is_valid_ssn(input: &[u8]) -> bool {
    let mut digits = [0u16; 9];
    let mut count = 0usize;
    for &b in input {
        if b.is_ascii_digit() {
            if count == 9 {
                return false;
            }
            digits[count] = u16::from(b - b'0');
            count += 1;
        }
    }
    if count != 9 {
        return false;
    }

    let area = digits[0] * 100 + digits[1] * 10 + digits[2];
    let group = digits[3] * 10 + digits[4];
    let serial = digits[5] * 1000 + digits[6] * 100 + digits[7] * 10 + digits[8];

    let invalid_area = area == 0 || area == 666 || area >= 900;
    !(invalid_area || group == 0 || serial == 0)
}
