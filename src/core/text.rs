//! Fixed-width string encoding shared by both codecs.

use crate::core::layout::StringEncoding;

/// Byte length of `chars` characters, `None` on overflow.
pub(crate) fn encoded_len(chars: usize, encoding: StringEncoding) -> Option<usize> {
    chars.checked_mul(encoding.unit_width())
}

/// Encodes `value` as `size` characters, space-padded and truncated.
///
/// With no size the whole string is written.
pub(crate) fn encode_string(value: &str, size: Option<usize>, encoding: StringEncoding) -> Vec<u8> {
    match encoding {
        StringEncoding::Ascii => {
            let mut out: Vec<u8> = value
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect();
            if let Some(size) = size {
                out.resize(size, b' ');
            }
            out
        }
        StringEncoding::Unicode => {
            let mut units: Vec<u16> = value.encode_utf16().collect();
            if let Some(size) = size {
                units.resize(size, u16::from(b' '));
            }
            units.iter().flat_map(|unit| unit.to_le_bytes()).collect()
        }
    }
}

/// Decodes a string, stopping at the first NUL and trimming trailing spaces.
pub(crate) fn decode_string(bytes: &[u8], encoding: StringEncoding) -> String {
    let mut text = match encoding {
        StringEncoding::Ascii => bytes
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect::<String>(),
        StringEncoding::Unicode => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .take_while(|&unit| unit != 0)
                .collect();
            String::from_utf16_lossy(&units)
        }
    };
    let trimmed = text.trim_end_matches(' ').len();
    text.truncate(trimmed);
    text
}
