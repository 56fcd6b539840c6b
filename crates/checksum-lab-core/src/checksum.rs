use std::sync::LazyLock;

use checksum_lab_tree::{Grammar, seq, srange};

pub const CHECKSUM_GRAMMAR_START: &str = "<checksum>";

static CHECKSUM_GRAMMAR: LazyLock<Grammar> = LazyLock::new(|| {
    Grammar::new()
        .rule(CHECKSUM_GRAMMAR_START, vec![seq(&["<byte>", "<byte>"])])
        .rule("<byte>", vec![seq(&["<hexdigit>", "<hexdigit>", " "])])
        .rule("<hexdigit>", srange("0123456789ABCDEF"))
});

/// Two bytes, each as two uppercase hex digits and a trailing space.
pub fn checksum_grammar() -> &'static Grammar {
    &CHECKSUM_GRAMMAR
}

/// 16-bit Internet checksum (RFC 1071 ones' complement sum) over big-endian
/// words. A trailing odd byte is padded with a zero low byte.
pub fn internet_checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = data.chunks_exact(2);

    for chunk in &mut chunks {
        let value = u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
        sum = sum.wrapping_add(value);
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    if let Some(&byte) = chunks.remainder().first() {
        sum = sum.wrapping_add((byte as u32) << 8);
    }

    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !(sum as u16)
}

/// Renders a checksum as `"XX YY "`. Values below 0x100 keep their high
/// `"00 "` byte so the field stays two bytes wide.
pub fn format_checksum(value: u16) -> String {
    let [high, low] = value.to_be_bytes();
    format!("{high:02X} {low:02X} ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use checksum_lab_tree::Parser;

    #[test]
    fn test_checksum_zeros() {
        assert_eq!(internet_checksum(&[0u8; 20]), 0xFFFF);
        assert_eq!(internet_checksum(&[]), 0xFFFF);
    }

    #[test]
    fn test_checksum_ones() {
        assert_eq!(internet_checksum(&[0xFFu8; 20]), 0x0000);
    }

    #[test]
    fn test_rfc1071_example() {
        let data = [0x00, 0x01, 0xF2, 0x03, 0xF4, 0xF5, 0xF6, 0xF7];
        assert_eq!(internet_checksum(&data), 0x220D);
    }

    #[test]
    fn test_odd_length_pads_low_byte() {
        assert_eq!(internet_checksum(&[0x12, 0x34, 0x56]), !(0x1234u16 + 0x5600));
    }

    #[test]
    fn test_carry_folds_back() {
        // 0xFFFF + 0x0001 wraps to 0x0001 after the end-around carry
        assert_eq!(internet_checksum(&[0xFF, 0xFF, 0x00, 0x01]), !0x0001);
    }

    #[test]
    fn test_checksum_verifies_to_zero() {
        let mut packet = vec![0x08, 0x00, 0x00, 0x00, 0x12, 0x34, 0x00, 0x07, 0x61, 0x62];
        let sum = internet_checksum(&packet);
        packet[2..4].copy_from_slice(&sum.to_be_bytes());
        assert_eq!(internet_checksum(&packet), 0);
    }

    #[test]
    fn test_format_keeps_two_bytes() {
        assert_eq!(format_checksum(0xF7FD), "F7 FD ");
        assert_eq!(format_checksum(0x00AB), "00 AB ");
        assert_eq!(format_checksum(0x0ABC), "0A BC ");
        assert_eq!(format_checksum(0), "00 00 ");
    }

    #[test]
    fn test_formatted_value_parses_with_checksum_grammar() {
        let parser = Parser::new(checksum_grammar(), CHECKSUM_GRAMMAR_START).unwrap();
        for value in [0u16, 0x00AB, 0xBEEF, 0xFFFF] {
            let tree = parser.parse(&format_checksum(value)).unwrap();
            assert_eq!(tree.render(), format_checksum(value));
        }
    }
}
