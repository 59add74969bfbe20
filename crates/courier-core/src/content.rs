//! Typed content envelope.
//!
//! A [`Content`] pairs a content-type tag with an untyped [`Payload`]. Reads
//! are checked against the caller's target type: a byte payload is only
//! decoded when its tag agrees with the target's representation, and a
//! native payload is only returned when its dynamic type is exactly the
//! target type.
//!
//! Target dispatch is over a closed set of kinds (see [`TargetKind`]):
//!
//! | Target              | Required tag                          |
//! |---------------------|---------------------------------------|
//! | `String`            | text/plain, text/html                 |
//! | `Vec<u8>`, `Bytes`  | application/octet-stream              |
//! | anything else       | application/json                      |

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use bytes::{Buf, Bytes};
use serde::de::DeserializeOwned;
use serde::Serialize;

// ── Content types ─────────────────────────────────────────────────────────────

pub const CONTENT_TYPE_TEXT: &str = "text/plain charset=utf-8";
pub const CONTENT_TYPE_TEXT_PLAIN: &str = "text/plain";
pub const CONTENT_TYPE_TEXT_HTML: &str = "text/html";
pub const CONTENT_TYPE_BINARY: &str = "application/octet-stream";
pub const CONTENT_TYPE_JSON: &str = "application/json";

const TEXT_TYPES: [&str; 3] = [
    CONTENT_TYPE_TEXT,
    CONTENT_TYPE_TEXT_PLAIN,
    CONTENT_TYPE_TEXT_HTML,
];

/// Lazy byte-stream handle produced by [`Content::encode`].
pub type ByteStream = bytes::buf::Reader<Bytes>;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content is empty: envelope, content type, or value is missing")]
    EmptyEnvelope,
    #[error("content value type {found} is not of type {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("content type {content_type:?} is invalid for {target}")]
    InvalidContentType {
        content_type: String,
        target: &'static str,
    },
    #[error("JSON decoding failed: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("JSON encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("encoded content is empty")]
    EmptyContent,
    #[error("{0} is not supported as an encode target")]
    UnsupportedTarget(&'static str),
}

// ── Payload ───────────────────────────────────────────────────────────────────

/// A native value held behind a type-erased, shareable handle.
///
/// Implemented only by the wrappers behind [`Payload::value`] and
/// [`Payload::opaque`].
pub trait NativeValue: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
    /// `None` for values that have no structured encoding.
    fn to_json(&self) -> Option<Result<Vec<u8>, serde_json::Error>>;
}

struct Serializable<T>(T);

impl<T: Serialize + Send + Sync + 'static> NativeValue for Serializable<T> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn to_json(&self) -> Option<Result<Vec<u8>, serde_json::Error>> {
        Some(serde_json::to_vec(&self.0))
    }
}

struct Opaque<T>(T);

impl<T: Send + Sync + 'static> NativeValue for Opaque<T> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn to_json(&self) -> Option<Result<Vec<u8>, serde_json::Error>> {
        None
    }
}

/// What a [`Content`] can hold.
#[derive(Clone)]
pub enum Payload {
    /// Raw bytes, as delivered by a transport. Decoded on read.
    Bytes(Bytes),
    /// A string value. Encodes to its UTF-8 bytes.
    Text(String),
    /// Any other native value.
    Native(Arc<dyn NativeValue>),
}

impl Payload {
    /// A native value that encodes to JSON.
    pub fn value<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Payload::Native(Arc::new(Serializable(value)))
    }

    /// A native value with no structured encoding, e.g. a function handle.
    pub fn opaque<T: Send + Sync + 'static>(value: T) -> Self {
        Payload::Native(Arc::new(Opaque(value)))
    }

    fn type_name(&self) -> &'static str {
        match self {
            Payload::Bytes(_) => type_name::<Bytes>(),
            Payload::Text(_) => type_name::<String>(),
            Payload::Native(v) => v.type_name(),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Payload::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Payload::Native(v) => f.debug_tuple("Native").field(&v.type_name()).finish(),
        }
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::Bytes(b)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(b))
    }
}

impl From<&'static [u8]> for Payload {
    fn from(b: &'static [u8]) -> Self {
        Payload::Bytes(Bytes::from_static(b))
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

// ── Target kinds ──────────────────────────────────────────────────────────────

/// The closed set of shapes a payload can be read or encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Text,
    Bytes,
    SharedBytes,
    Stream,
    Structured,
}

impl TargetKind {
    pub fn of<T: 'static>() -> Self {
        let id = TypeId::of::<T>();
        if id == TypeId::of::<String>() {
            TargetKind::Text
        } else if id == TypeId::of::<Vec<u8>>() {
            TargetKind::Bytes
        } else if id == TypeId::of::<Bytes>() {
            TargetKind::SharedBytes
        } else if id == TypeId::of::<ByteStream>() {
            TargetKind::Stream
        } else {
            TargetKind::Structured
        }
    }
}

/// Move a concrete value into the caller's `T`; `TypeMismatch` unless `U` is `T`.
fn cast<T: 'static, U: 'static>(value: U) -> Result<T, ContentError> {
    let boxed: Box<dyn Any> = Box::new(value);
    boxed
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| ContentError::TypeMismatch {
            expected: type_name::<T>(),
            found: type_name::<U>(),
        })
}

// ── Content ───────────────────────────────────────────────────────────────────

/// Content-type tag plus untyped value.
#[derive(Debug, Clone, Default)]
pub struct Content {
    content_type: String,
    value: Option<Payload>,
}

impl Content {
    pub fn new(content_type: impl Into<String>, value: impl Into<Payload>) -> Self {
        Self {
            content_type: content_type.into(),
            value: Some(value.into()),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn value(&self) -> Option<&Payload> {
        self.value.as_ref()
    }

    /// Store `value` under `content_type`, replacing whatever was there.
    /// No validation is done here; mismatches surface on read.
    pub fn write(&mut self, content_type: impl Into<String>, value: impl Into<Payload>) {
        self.content_type = content_type.into();
        self.value = Some(value.into());
    }

    /// True when a value is present and tagged exactly `content_type`.
    pub fn is_valid_for(&self, content_type: &str) -> bool {
        self.value.is_some() && self.content_type == content_type
    }

    fn payload(&self) -> Result<&Payload, ContentError> {
        match &self.value {
            Some(v) if !self.content_type.is_empty() => Ok(v),
            _ => Err(ContentError::EmptyEnvelope),
        }
    }

    /// Read the value as `T`.
    ///
    /// Byte payloads go through [`Content::decode`]. Native payloads must
    /// have a dynamic type of exactly `T`.
    pub fn read<T>(&self) -> Result<T, ContentError>
    where
        T: DeserializeOwned + Default + Clone + 'static,
    {
        match self.payload()? {
            Payload::Bytes(_) => self.decode(),
            Payload::Text(s) => cast(s.clone()),
            Payload::Native(v) => {
                v.as_any()
                    .downcast_ref::<T>()
                    .cloned()
                    .ok_or(ContentError::TypeMismatch {
                        expected: type_name::<T>(),
                        found: v.type_name(),
                    })
            }
        }
    }

    /// Borrow a native value whose dynamic type is exactly `T`.
    ///
    /// Unlike [`Content::read`] this never decodes and places no bounds on
    /// `T`, so it also reaches opaque values.
    pub fn native<T: 'static>(&self) -> Option<&T> {
        match self.value.as_ref()? {
            Payload::Native(v) => v.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Decode a byte payload into `T`, checking the tag first.
    ///
    /// A zero-length payload yields `T::default()` whatever the tag.
    pub fn decode<T>(&self) -> Result<T, ContentError>
    where
        T: DeserializeOwned + Default + 'static,
    {
        let body = match self.payload()? {
            Payload::Bytes(b) => b,
            other => {
                return Err(ContentError::TypeMismatch {
                    expected: type_name::<Bytes>(),
                    found: other.type_name(),
                })
            }
        };
        if body.is_empty() {
            return Ok(T::default());
        }

        match TargetKind::of::<T>() {
            TargetKind::Text => {
                self.require(&TEXT_TYPES, "String")?;
                cast(String::from_utf8_lossy(body).into_owned())
            }
            TargetKind::Bytes => {
                self.require(&[CONTENT_TYPE_BINARY], "Vec<u8>")?;
                cast(body.to_vec())
            }
            TargetKind::SharedBytes => {
                self.require(&[CONTENT_TYPE_BINARY], "Bytes")?;
                cast(body.clone())
            }
            TargetKind::Stream | TargetKind::Structured => {
                self.require(&[CONTENT_TYPE_JSON], type_name::<T>())?;
                serde_json::from_slice(body).map_err(ContentError::Decode)
            }
        }
    }

    /// Encode the value into `Vec<u8>`, `Bytes`, or a [`ByteStream`].
    ///
    /// Strings become their UTF-8 bytes, bytes pass through, and native
    /// values become JSON. Opaque values fail with [`ContentError::Encode`].
    /// Empty output is an error.
    pub fn encode<T: 'static>(&self) -> Result<T, ContentError> {
        let kind = TargetKind::of::<T>();
        if !matches!(
            kind,
            TargetKind::Bytes | TargetKind::SharedBytes | TargetKind::Stream
        ) {
            return Err(ContentError::UnsupportedTarget(type_name::<T>()));
        }

        let buf = match self.payload()? {
            Payload::Bytes(b) => b.clone(),
            Payload::Text(s) => Bytes::from(s.clone().into_bytes()),
            Payload::Native(v) => match v.to_json() {
                Some(Ok(json)) => Bytes::from(json),
                Some(Err(e)) => return Err(ContentError::Encode(e)),
                None => {
                    return Err(ContentError::Encode(serde::ser::Error::custom(format!(
                        "{} has no structured encoding",
                        v.type_name()
                    ))))
                }
            },
        };
        if buf.is_empty() {
            return Err(ContentError::EmptyContent);
        }

        match kind {
            TargetKind::Bytes => cast(buf.to_vec()),
            TargetKind::SharedBytes => cast(buf),
            _ => cast(buf.reader()),
        }
    }

    fn require(&self, allowed: &[&str], target: &'static str) -> Result<(), ContentError> {
        if allowed.contains(&self.content_type.as_str()) {
            Ok(())
        } else {
            Err(ContentError::InvalidContentType {
                content_type: self.content_type.clone(),
                target,
            })
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type: {} value: {}",
            self.content_type,
            self.value.is_some()
        )
    }
}

// ── Optional-envelope entry points ────────────────────────────────────────────

/// [`Content::read`] over a possibly missing envelope.
pub fn read<T>(content: Option<&Content>) -> Result<T, ContentError>
where
    T: DeserializeOwned + Default + Clone + 'static,
{
    content.ok_or(ContentError::EmptyEnvelope)?.read()
}

/// [`Content::decode`] over a possibly missing envelope.
pub fn decode<T>(content: Option<&Content>) -> Result<T, ContentError>
where
    T: DeserializeOwned + Default + 'static,
{
    content.ok_or(ContentError::EmptyEnvelope)?.decode()
}

/// [`Content::encode`] over a possibly missing envelope.
pub fn encode<T: 'static>(content: Option<&Content>) -> Result<T, ContentError> {
    content.ok_or(ContentError::EmptyEnvelope)?.encode()
}
