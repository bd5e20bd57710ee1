//! Binary Wire Protocol
//!
//! Lossless, versionless framing for the event messages exchanged on
//! a collaboration socket, shared between both directions.
//!
//! ## Frame layout
//!
//! One unsigned tag byte identifying the message kind, followed by the
//! kind's fields in fixed order:
//!
//! - *string*: u32 little-endian byte-length prefix + that many UTF-8
//!   bytes (zero length is valid)
//! - *float*: f32 little-endian IEEE-754
//!
//! Server-relayed frames carry the sender's connection id and username
//! as two trailing strings after the original payload; receivers parse
//! fields in declaration order and simply find the extra strings at
//! the end. Directory snapshots are JSON text and never pass through
//! this codec.

mod message;
mod reader;
mod writer;

pub use message::{append_sender, peek_tag, tag, ClientEvent, ServerEvent};
pub use reader::WireReader;
pub use writer::WireWriter;

use thiserror::Error;

/// Errors produced while encoding or decoding a frame
#[derive(Debug, Error)]
pub enum WireError {
    /// A field read ran past the end of the buffer
    #[error("truncated frame: needed {needed} byte(s), {remaining} remain")]
    Truncated { needed: usize, remaining: usize },

    /// The leading tag byte matches no known message kind
    #[error("unknown message kind: {0}")]
    UnknownKind(u8),

    /// A string is too long for its u32 length prefix
    #[error("string of {0} bytes overflows the length prefix")]
    Overflow(usize),

    /// A string field held invalid UTF-8
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias for codec operations
pub type WireResult<T> = Result<T, WireError>;
