// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Minimal base64 encoder for attachment bodies (RFC 4648, standard
//! alphabet, padded). Encode-only: the recorder never decodes.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn symbol(index: u8) -> char {
    char::from(ALPHABET[usize::from(index & 0x3f)])
}

/// Encodes `bytes` as padded standard base64.
#[must_use]
pub(crate) fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    let mut chunks = bytes.chunks_exact(3);
    for chunk in &mut chunks {
        out.push(symbol(chunk[0] >> 2));
        out.push(symbol((chunk[0] & 0x03) << 4 | chunk[1] >> 4));
        out.push(symbol((chunk[1] & 0x0f) << 2 | chunk[2] >> 6));
        out.push(symbol(chunk[2] & 0x3f));
    }
    match chunks.remainder() {
        [a] => {
            out.push(symbol(a >> 2));
            out.push(symbol((a & 0x03) << 4));
            out.push_str("==");
        }
        [a, b] => {
            out.push(symbol(a >> 2));
            out.push(symbol((a & 0x03) << 4 | b >> 4));
            out.push(symbol((b & 0x0f) << 2));
            out.push('=');
        }
        _ => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4648_vectors() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"f"), "Zg==");
        assert_eq!(encode(b"fo"), "Zm8=");
        assert_eq!(encode(b"foo"), "Zm9v");
        assert_eq!(encode(b"foob"), "Zm9vYg==");
        assert_eq!(encode(b"fooba"), "Zm9vYmE=");
        assert_eq!(encode(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn binary_input_encodes() {
        assert_eq!(encode(&[0x00, 0xff, 0x10]), "AP8Q");
    }
}
