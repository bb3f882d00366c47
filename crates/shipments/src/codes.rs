//! Human-facing reference codes: order numbers and QR lookup codes.
//!
//! Both are built from the Crockford base32 alphabet (no I, L, O or U) so they
//! survive being read aloud or typed from a printed label.

use chrono::NaiveDate;
use uuid::Uuid;

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Bytes of a v4 UUID that carry the fixed version and variant bits.
const FIXED_UUID_BYTES: [usize; 2] = [6, 8];

fn random_symbols(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        let uuid = Uuid::new_v4();
        let random = uuid
            .as_bytes()
            .iter()
            .enumerate()
            .filter(|(i, _)| !FIXED_UUID_BYTES.contains(i))
            .map(|(_, b)| *b);
        for b in random {
            if out.len() == len {
                break;
            }
            out.push(ALPHABET[(b as usize) % ALPHABET.len()] as char);
        }
    }
    out
}

/// `ORD-20260301-7QK2MZ`
pub fn generate_order_number(date: NaiveDate) -> String {
    format!("ORD-{}-{}", date.format("%Y%m%d"), random_symbols(6))
}

/// `PKG-4D9XR2MB7T`, printed as a QR code on the package label.
pub fn generate_qr_code() -> String {
    format!("PKG-{}", random_symbols(10))
}

/// `INV-202603-K3M9QX`
pub fn generate_invoice_number(date: NaiveDate) -> String {
    format!("INV-{}-{}", date.format("%Y%m"), random_symbols(6))
}

/// Normalize a code typed or scanned by a user before lookup.
pub fn normalize_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn order_number_shape() {
        let n = generate_order_number(date());
        assert!(n.starts_with("ORD-20260301-"));
        assert_eq!(n.len(), "ORD-20260301-".len() + 6);
    }

    #[test]
    fn qr_code_uses_unambiguous_symbols() {
        for _ in 0..50 {
            let code = generate_qr_code();
            let body = code.strip_prefix("PKG-").unwrap();
            assert_eq!(body.len(), 10);
            assert!(body.bytes().all(|b| ALPHABET.contains(&b)));
            assert!(!body.contains(['I', 'L', 'O', 'U']));
        }
    }

    #[test]
    fn every_position_uses_the_whole_alphabet() {
        let mut seen = vec![std::collections::HashSet::new(); 10];
        for _ in 0..2_000 {
            let code = generate_qr_code();
            for (pos, b) in code.strip_prefix("PKG-").unwrap().bytes().enumerate() {
                seen[pos].insert(b);
            }
        }
        for (pos, symbols) in seen.iter().enumerate() {
            assert_eq!(symbols.len(), ALPHABET.len(), "position {pos}");
        }
    }

    #[test]
    fn codes_do_not_repeat_in_practice() {
        let a = generate_qr_code();
        let b = generate_qr_code();
        assert_ne!(a, b);
    }

    #[test]
    fn invoice_number_shape() {
        assert!(generate_invoice_number(date()).starts_with("INV-202603-"));
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_code("  pkg-4d9xr2mb7t\n"), "PKG-4D9XR2MB7T");
    }
}
