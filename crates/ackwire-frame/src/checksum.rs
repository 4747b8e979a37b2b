//! 8-bit additive checksum.

/// Sum of all payload bytes, truncated to 8 bits.
///
/// Wraps on overflow. An empty payload yields 0.
pub fn compute(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |acc, &byte| acc.wrapping_add(byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_zero() {
        assert_eq!(compute(&[]), 0);
    }

    #[test]
    fn simple_sum() {
        assert_eq!(compute(&[0x10, 0x20]), 0x30);
        assert_eq!(compute(&[0x10, 0x20, 0x30]), 0x60);
    }

    #[test]
    fn wraps_instead_of_saturating() {
        assert_eq!(compute(&[0xFF, 0x01]), 0x00);
        assert_eq!(compute(&[0xAA, 0xBB, 0xCC]), 0x31);
        assert_eq!(compute(&[0xFF; 255]), 0x01);
    }

    #[test]
    fn matches_truncated_wide_sum() {
        for len in 1..=255usize {
            let payload: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
            let wide: u32 = payload.iter().map(|&b| u32::from(b)).sum();
            assert_eq!(compute(&payload), (wide & 0xFF) as u8, "len {len}");
        }
    }
}
