//! Payload Generator (§4.5): exact-size byte/string payloads, XOR-stream
//! obfuscated with a SHA-256 keystream. Plus the JSON CLOB supplement
//! (§C.3), grounded on `original_source/pkg/lobperformance/json.go`.

use sha2::{Digest, Sha256};

pub(crate) const TEXT_ALPHABET: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_";

/// Shared by [`generate_text_payload`] and the RU row description generator:
/// XOR an `'a'`-filled buffer with `keystream`, then remap each byte into
/// [`TEXT_ALPHABET`] via `b & 0x3F`.
pub(crate) fn remap_keystream_to_text(keystream: &[u8]) -> String {
    let mut buf = vec![b'a'; keystream.len()];
    for (b, k) in buf.iter_mut().zip(keystream.iter()) {
        *b ^= k;
    }
    let remapped: Vec<u8> = buf
        .iter()
        .map(|b| TEXT_ALPHABET[(*b & 0x3F) as usize])
        .collect();
    String::from_utf8(remapped).expect("alphabet remap is always valid ASCII")
}

/// Produces a SHA-256-keyed XOR keystream of `len` bytes, re-hashing an
/// incrementing counter whenever the previous digest is exhausted.
fn xor_keystream(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut counter: u64 = 0;
    while out.len() < len {
        let mut hasher = Sha256::new();
        hasher.update(counter.to_be_bytes());
        let digest = hasher.finalize();
        out.extend_from_slice(&digest);
        counter += 1;
    }
    out.truncate(len);
    out
}

/// Generates an exact-length binary payload: fill with `i mod 256`, then
/// XOR with the SHA-256 keystream.
pub fn generate_binary_payload(size: usize) -> Vec<u8> {
    if size == 0 {
        return Vec::new();
    }
    let mut buf: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
    let keystream = xor_keystream(size);
    for (b, k) in buf.iter_mut().zip(keystream.iter()) {
        *b ^= k;
    }
    buf
}

/// Generates an exact-length ASCII text payload suitable for CLOB/text
/// columns: fill with `'a'`, XOR with the keystream, then remap each byte
/// into the 64-character alphabet via `b & 0x3F`.
pub fn generate_text_payload(size: usize) -> String {
    if size == 0 {
        return String::new();
    }
    remap_keystream_to_text(&xor_keystream(size))
}

/// Generates a `{"id":...,"name":"g","items":["..."]}` JSON document of the
/// exact requested byte length, padding a single `items` entry with a
/// random-alphabet string sized to hit the byte budget exactly. Not wired to
/// `--lobType`; available as a library extension point per SPEC_FULL.md
/// §C.3/§E.
pub fn generate_json_clob(id: u64, size: usize) -> String {
    let prefix = format!("{{\"id\":{id},\"name\":\"g\",\"items\":[\"");
    let suffix = "\"]}";
    let envelope_len = prefix.len() + suffix.len();

    if size < envelope_len {
        // Too small even for the empty envelope; truncate the minimal form.
        let minimal = format!("{{\"id\":{id},\"name\":\"\",\"items\":[]}}");
        return minimal.chars().take(size).collect();
    }

    let content_len = size - envelope_len;
    let content = generate_text_payload(content_len);
    format!("{prefix}{content}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_binary_is_empty() {
        assert_eq!(generate_binary_payload(0), Vec::<u8>::new());
    }

    #[test]
    fn zero_size_text_is_empty() {
        assert_eq!(generate_text_payload(0), "");
    }

    #[test]
    fn binary_payload_has_exact_length() {
        for n in [1usize, 17, 256, 4096] {
            assert_eq!(generate_binary_payload(n).len(), n);
        }
    }

    #[test]
    fn text_payload_has_exact_length_and_alphabet() {
        for n in [1usize, 17, 256, 4096] {
            let s = generate_text_payload(n);
            assert_eq!(s.len(), n);
            assert!(s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
        }
    }

    #[test]
    fn json_clob_has_exact_length_when_large_enough() {
        for n in [64usize, 128, 512, 1024] {
            let doc = generate_json_clob(1, n);
            assert_eq!(doc.len(), n, "size mismatch for n={n}");
        }
    }
}
