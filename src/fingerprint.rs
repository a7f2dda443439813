//! Byte-sum fingerprint used to place values in a shard's slot table.
//!
//! This is a checksum, not a hash: any two byte strings whose byte sums are
//! congruent modulo 65 535 collide. Index 0 is never produced.

/// Number of slots in every shard table. Slot 0 is unreachable.
pub const SLOT_COUNT: usize = 1 << 16;

const MODULUS: u64 = (SLOT_COUNT - 1) as u64;

/// Maps `bytes` to a slot index in `1..=65535`.
///
/// ```
/// use direct_cache::fingerprint;
///
/// assert_eq!(fingerprint(b""), 1);
/// assert_eq!(fingerprint(b"ab"), 97 + 98 + 1);
/// assert_eq!(fingerprint(b"ab"), fingerprint(b"ba"));
/// ```
pub fn fingerprint(bytes: &[u8]) -> u16 {
    let sum: u64 = bytes.iter().map(|&b| u64::from(b)).sum();
    // sum % MODULUS < 65535, so the +1 stays within u16
    (sum % MODULUS) as u16 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_maps_to_first_slot() {
        assert_eq!(fingerprint(b""), 1);
    }

    #[test]
    fn never_produces_zero() {
        // 257 * 255 = 65535 wraps to 0 before the offset
        let wrap = vec![255u8; 257];
        assert_eq!(fingerprint(&wrap), 1);

        let top = vec![255u8; 256];
        assert_eq!(fingerprint(&top), 65280 + 1);
    }

    #[test]
    fn byte_order_is_ignored() {
        assert_eq!(fingerprint(b"hello"), fingerprint(b"olleh"));
        assert_ne!(fingerprint(b"hello"), fingerprint(b"hellp"));
    }

    #[test]
    fn multibyte_utf8_sums_every_byte() {
        let s = "你好";
        let expected: u64 = s.bytes().map(u64::from).sum::<u64>() % 65535 + 1;
        assert_eq!(u64::from(fingerprint(s.as_bytes())), expected);
    }

    #[test]
    fn long_inputs_stay_in_range() {
        let big = vec![0xABu8; 1_000_000];
        let fp = fingerprint(&big);
        assert!(fp >= 1);
        assert!(usize::from(fp) < SLOT_COUNT);
    }
}
