/// Default number of digits in a generated code
pub const DEFAULT_DIGITS: u8 = 6;

/// Minimum number of digits in a generated code
pub const MIN_DIGITS: u8 = 6;

/// Maximum number of digits in a generated code
///
/// `10^19` is the largest power of ten that fits the `u64` modulus used by [truncate].
pub const MAX_DIGITS: u8 = 19;

/// Encode a counter as the 8-byte big-endian message fed to the keyed hash
pub fn encode_counter(counter: u64) -> [u8; 8] {
    counter.to_be_bytes()
}

/// Dynamic truncation of an HMAC digest to a zero-padded decimal code
///
/// The low nibble of the final byte selects a 4-byte window; its top bit is cleared so the
/// value is a non-negative 31-bit integer, which is then reduced modulo `10^digits`.
///
/// # Panics
///
/// The digest must be at least `offset + 4` bytes long. Every digest produced by
/// [RingHmac](crate::RingHmac) is, but a foreign [HmacProvider](crate::HmacProvider) returning
/// fewer than 19 bytes may trigger an out-of-bounds index.
pub fn truncate(digest: &[u8], digits: u8) -> String {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let value = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    let code = match 10_u64.checked_pow(digits.into()) {
        Some(modulus) => u64::from(value) % modulus,
        None => u64::from(value),
    };
    format!("{:0>width$}", code, width = digits as usize)
}

/// Compare two codes without short-circuiting on the first differing byte
pub(crate) fn codes_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4226 section 5.4
    const SECTION_5_4_DIGEST: [u8; 20] = [
        0x1f, 0x86, 0x98, 0x69, 0x0e, 0x02, 0xca, 0x16, 0x61, 0x85, 0x50, 0xef, 0x7f, 0x19, 0xda,
        0x8e, 0x94, 0x5b, 0x55, 0x5a,
    ];

    #[test]
    fn truncate_example_section_5_4() {
        assert_eq!(truncate(&SECTION_5_4_DIGEST, 6), "872921");
        assert_eq!(truncate(&SECTION_5_4_DIGEST, 9), "357872921");
        assert_eq!(truncate(&SECTION_5_4_DIGEST, 10), "1357872921");
    }

    #[test]
    fn truncate_keeps_leading_zeros() {
        let mut digest = [0u8; 20];
        assert_eq!(truncate(&digest, 6), "000000");
        digest[3] = 42;
        assert_eq!(truncate(&digest, 6), "000042");
        assert_eq!(truncate(&digest, 8), "00000042");
    }

    #[test]
    fn truncate_masks_top_bit() {
        let mut digest = [0xffu8; 20];
        // offset 0
        digest[19] = 0xf0;
        digest[0..4].copy_from_slice(&[0xff, 0xff, 0xff, 0xff]);
        // 0x7fffffff = 2147483647
        assert_eq!(truncate(&digest, 10), "2147483647");
        assert_eq!(truncate(&digest, 6), "483647");
    }

    #[test]
    fn truncate_uses_last_nibble_as_offset() {
        let mut digest = [0u8; 32];
        digest[31] = 0x0c;
        digest[12..16].copy_from_slice(&[0x00, 0x01, 0xe2, 0x40]);
        assert_eq!(truncate(&digest, 6), "123456");
    }

    #[test]
    fn truncate_max_digits() {
        let code = truncate(&SECTION_5_4_DIGEST, MAX_DIGITS);
        assert_eq!(code.len(), MAX_DIGITS as usize);
        assert!(code.ends_with("001357872921"));
    }

    #[test]
    fn counter_is_big_endian() {
        assert_eq!(encode_counter(0), [0; 8]);
        assert_eq!(encode_counter(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(
            encode_counter(0x0102_0304_0506_0708),
            [1, 2, 3, 4, 5, 6, 7, 8]
        );
        assert_eq!(encode_counter(u64::MAX), [0xff; 8]);
    }

    #[test]
    fn codes_match_compares_whole_string() {
        assert!(codes_match("123456", "123456"));
        assert!(!codes_match("123456", "123457"));
        assert!(!codes_match("123456", "1234567"));
        assert!(!codes_match("", "0"));
    }
}
