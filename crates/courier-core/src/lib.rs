//! courier-core: typed content envelopes, header store, and configuration.
//! The exchange and messaging crates depend on this one.

pub mod config;
pub mod content;
pub mod header;

pub use content::{ByteStream, Content, ContentError, Payload};
pub use header::Header;
