//! Body encoding codec.
//!
//! # Responsibilities
//! - Decode upstream body encodings (gzip / x-gzip / deflate / br)
//! - Re-encode transformed bodies per the client's Accept-Encoding
//!
//! # Design Decisions
//! - The gateway requests `Accept-Encoding: identity` from the upstream, but
//!   still decodes defensively when the upstream ignores it
//! - Only gzip is offered outbound: universal browser support, no brotli
//!   encoder to maintain
//! - Unknown or absent encodings are identity; a corrupt stream is a fatal
//!   per-request error, never partial output
//! - Lengths are always recomputed from the emitted bytes

use std::io::{Read, Write};

use bytes::Bytes;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

/// Internal buffer size for the brotli decoder.
const BROTLI_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to decode {encoding} body: {source}")]
    Decode {
        encoding: &'static str,
        source: std::io::Error,
    },
}

/// Decode an upstream body according to its declared `content-encoding`.
pub fn decode_body(body: &[u8], content_encoding: Option<&str>) -> Result<Bytes, CodecError> {
    let encoding = content_encoding
        .map(|e| e.trim().to_ascii_lowercase())
        .unwrap_or_default();
    match encoding.as_str() {
        "gzip" | "x-gzip" => read_all(GzDecoder::new(body), "gzip"),
        "deflate" => {
            // some servers send raw deflate without the zlib wrapper
            read_all(ZlibDecoder::new(body), "deflate")
                .or_else(|_| read_all(DeflateDecoder::new(body), "deflate"))
        }
        "br" => read_all(brotli::Decompressor::new(body, BROTLI_BUFFER_SIZE), "br"),
        _ => Ok(Bytes::copy_from_slice(body)),
    }
}

fn read_all<R: Read>(mut reader: R, encoding: &'static str) -> Result<Bytes, CodecError> {
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(|source| CodecError::Decode { encoding, source })?;
    Ok(out.into())
}

/// Encode a transformed body for the client.
///
/// Returns the emitted bytes plus the `content-encoding` value to advertise,
/// `None` meaning identity.
pub fn encode_body(body: &[u8], accept_encoding: Option<&str>) -> (Bytes, Option<&'static str>) {
    if accepts_gzip(accept_encoding) {
        let mut encoder = GzEncoder::new(
            Vec::with_capacity(body.len() / 2),
            Compression::default(),
        );
        if encoder.write_all(body).is_ok() {
            if let Ok(compressed) = encoder.finish() {
                return (compressed.into(), Some("gzip"));
            }
        }
    }
    (Bytes::copy_from_slice(body), None)
}

fn accepts_gzip(accept_encoding: Option<&str>) -> bool {
    let Some(value) = accept_encoding else {
        return false;
    };
    value.split(',').any(|entry| {
        let mut parts = entry.split(';');
        let name = parts.next().unwrap_or("").trim();
        if !name.eq_ignore_ascii_case("gzip") && name != "*" {
            return false;
        }
        // a q=0 entry opts out
        !parts.any(|p| {
            let p = p.trim();
            p.eq_ignore_ascii_case("q=0") || p.eq_ignore_ascii_case("q=0.0")
        })
    })
}
