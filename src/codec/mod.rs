//! Payload compression codec
//!
//! Symmetric transform around the JSON payload converter, governed by a
//! single boolean-valued custom frame header. A flagged payload travels as
//! base64-encoded gzip-compressed UTF-8 JSON; base64 keeps the compressed
//! bytes text-safe on the wire. An unflagged payload is plain UTF-8 JSON and
//! passes through both directions byte-for-byte. A payload that claims
//! compression but does not decode is a contract violation: the conversion
//! fails instead of silently falling back to the raw bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::io::{Read, Write};
use thiserror::Error;

/// Frame header signalling that the payload bytes are compressed.
pub const COMPRESSION_HEADER: &str = "x-payload-compressed";

/// A native frame header value. Different client stacks serialize the
/// compression flag differently; all three shapes normalize to one boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl HeaderValue {
    /// Normalize to a boolean flag: a plain boolean, a case-insensitive
    /// "true"/"false" string, or a single-element list wrapping either.
    /// Anything else reads as false.
    pub fn as_flag(&self) -> bool {
        match self {
            HeaderValue::Bool(value) => *value,
            HeaderValue::Text(text) => text.eq_ignore_ascii_case("true"),
            HeaderValue::List(items) => match items.as_slice() {
                [single] => single.eq_ignore_ascii_case("true"),
                _ => false,
            },
        }
    }
}

/// Native frame headers visible to the codec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameHeaders {
    entries: HashMap<String, HeaderValue>,
}

impl FrameHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: HeaderValue) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries.get(name)
    }

    /// The normalized compression flag; an absent header reads as false.
    pub fn compression_flag(&self) -> bool {
        self.get(COMPRESSION_HEADER)
            .map(HeaderValue::as_flag)
            .unwrap_or(false)
    }

    /// Convenience for senders marking the payload compressed.
    pub fn with_compression(mut self) -> Self {
        self.insert(COMPRESSION_HEADER, HeaderValue::Bool(true));
        self
    }
}

/// A frame payload as handed to or produced by the converter.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Binary(Bytes),
    Text(String),
}

impl Payload {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Payload::Binary(bytes.into())
    }
}

/// Codec errors. A failed decompression is fatal for that single message
/// and propagates to the messaging framework's error channel; the payload
/// bytes are already lost, so there is nothing to retry locally.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("flagged-compressed payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("flagged-compressed payload is not valid gzip")]
    Gzip(#[source] std::io::Error),
    #[error("gzip compression failed")]
    Compression(#[source] std::io::Error),
    #[error("payload conversion failed: {0}")]
    Conversion(String),
}

/// The underlying JSON payload converter. The serializer itself is an
/// external collaborator; this codec only wraps it.
pub trait PayloadConverter: Send + Sync {
    /// Convert an inbound payload into an application value.
    fn from_payload(
        &self,
        headers: &FrameHeaders,
        payload: &Payload,
    ) -> Result<serde_json::Value, CodecError>;

    /// Convert an outbound application value into payload bytes.
    fn to_payload(&self, value: &serde_json::Value) -> Result<Payload, CodecError>;
}

/// Plain JSON converter used when no application-specific one is injected.
#[derive(Debug, Default)]
pub struct JsonPayloadConverter;

impl PayloadConverter for JsonPayloadConverter {
    fn from_payload(
        &self,
        _headers: &FrameHeaders,
        payload: &Payload,
    ) -> Result<serde_json::Value, CodecError> {
        let parsed = match payload {
            Payload::Binary(bytes) => serde_json::from_slice(bytes),
            Payload::Text(text) => serde_json::from_str(text),
        };
        parsed.map_err(|e| CodecError::Conversion(e.to_string()))
    }

    fn to_payload(&self, value: &serde_json::Value) -> Result<Payload, CodecError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CodecError::Conversion(e.to_string()))?;
        Ok(Payload::Binary(bytes.into()))
    }
}

/// Compression wrapper around a payload converter, applied symmetrically on
/// the inbound and outbound paths.
pub struct CompressingConverter<C> {
    inner: C,
}

impl<C: PayloadConverter> CompressingConverter<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Inbound path: a flagged binary payload is base64-decoded and
    /// gzip-inflated before the inner conversion; everything else delegates
    /// unchanged.
    pub fn read_inbound(
        &self,
        headers: &FrameHeaders,
        payload: &Payload,
    ) -> Result<serde_json::Value, CodecError> {
        if headers.compression_flag() {
            if let Payload::Binary(bytes) = payload {
                let inflated = decode_compressed(bytes)?;
                return self
                    .inner
                    .from_payload(headers, &Payload::Binary(inflated.into()));
            }
        }
        self.inner.from_payload(headers, payload)
    }

    /// Outbound path: the inner conversion runs first; a binary result with
    /// a flagged outbound header is gzip-deflated and base64-encoded,
    /// otherwise the original bytes pass through unchanged.
    pub fn write_outbound(
        &self,
        value: &serde_json::Value,
        headers: &FrameHeaders,
    ) -> Result<Payload, CodecError> {
        let payload = self.inner.to_payload(value)?;
        match payload {
            Payload::Binary(bytes) if headers.compression_flag() => {
                Ok(Payload::Binary(encode_compressed(&bytes)?.into()))
            }
            other => Ok(other),
        }
    }
}

/// base64-decode, then gzip-inflate.
pub fn decode_compressed(payload: &[u8]) -> Result<Vec<u8>, CodecError> {
    let compressed = BASE64.decode(payload)?;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(CodecError::Gzip)?;
    Ok(inflated)
}

/// gzip-deflate, then base64-encode.
pub fn encode_compressed(payload: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).map_err(CodecError::Compression)?;
    let compressed = encoder.finish().map_err(CodecError::Compression)?;
    Ok(BASE64.encode(compressed).into_bytes())
}
