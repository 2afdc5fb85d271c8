//! PlantUML server URL encoding.
//!
//! The PlantUML server accepts a diagram in its URL path: the text is
//! DEFLATE-compressed (raw stream, no zlib header) and then encoded with
//! PlantUML's own 64-character alphabet. The alphabet differs from standard
//! base64, so the character mapping is done by hand.

use std::io::Write as _;

use anyhow::{Context, Result};
use flate2::write::DeflateEncoder;
use flate2::Compression;

/// PlantUML's encoding alphabet. Note the ordering: digits first, then
/// upper case, lower case, `-`, `_`.
const ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Compress and encode a diagram document for use in a PlantUML server URL.
pub fn encode(diagram: &str) -> Result<String> {
    let mut deflater = DeflateEncoder::new(Vec::new(), Compression::best());
    deflater
        .write_all(diagram.as_bytes())
        .context("Failed to deflate diagram text")?;
    let compressed = deflater
        .finish()
        .context("Failed to finish deflate stream")?;
    Ok(encode64(&compressed))
}

/// Build the image URL for an encoded diagram.
pub fn diagram_url(server_url: &str, encoded: &str) -> String {
    format!("{}/img/{}", server_url.trim_end_matches('/'), encoded)
}

/// Encode bytes with the PlantUML alphabet: each 3-byte group becomes 4
/// characters, with zero-padding for a short final group (no padding
/// characters are emitted).
fn encode64(data: &[u8]) -> String {
    let mut encoded = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied().unwrap_or(0);
        let b3 = chunk.get(2).copied().unwrap_or(0);

        encoded.push(ALPHABET[usize::from(b1 >> 2)] as char);
        encoded.push(ALPHABET[usize::from(((b1 & 0x03) << 4) | (b2 >> 4))] as char);
        encoded.push(ALPHABET[usize::from(((b2 & 0x0F) << 2) | (b3 >> 6))] as char);
        encoded.push(ALPHABET[usize::from(b3 & 0x3F)] as char);
    }
    encoded
}
