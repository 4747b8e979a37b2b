//! Hex text helpers for frame dumps.

/// Render bytes as space separated upper-case pairs: `02 01 41 41 03`.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

/// Parse hex text. Whitespace, `:` and `,` separators and `0x` prefixes
/// are ignored.
pub fn from_hex(input: &str) -> Result<Vec<u8>, String> {
    let cleaned: String = input
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .map(|token| {
            token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token)
        })
        .collect();

    if cleaned.len() % 2 != 0 {
        return Err(format!(
            "odd number of hex digits ({}) in {input:?}",
            cleaned.len()
        ));
    }

    let digits = cleaned.as_bytes();
    digits
        .chunks(2)
        .map(|pair| {
            let hi = nibble(pair[0])?;
            let lo = nibble(pair[1])?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn nibble(digit: u8) -> Result<u8, String> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(format!("invalid hex digit {:?}", other as char)),
    }
}
