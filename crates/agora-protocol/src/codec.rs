//! Codec trait and the line codec the relay speaks.
//!
//! A "codec" (coder/decoder) converts between bytes and protocol values.
//! The event loop only needs something that implements [`Codec`]; the one
//! implementation today is [`LineCodec`].
//!
//! # One read, one message
//!
//! [`LineCodec::decode`] treats the bytes of a single socket read as one
//! complete client message. It does not buffer across reads, so a message
//! split over two reads arrives as two messages, and two messages that
//! land in the same read arrive as one. Clients that wait for a reply
//! before sending the next line never notice.

use crate::{ProtocolError, ServerLine};

/// Converts inbound bytes into lines and outbound lines into bytes.
pub trait Codec: Send + Sync + 'static {
    /// Decodes the bytes of one read into one message.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are not valid text.
    fn decode(&self, data: &[u8]) -> Result<String, ProtocolError>;

    /// Encodes a server line into its wire form.
    fn encode(&self, line: &ServerLine) -> Vec<u8>;
}

/// Newline-terminated UTF-8 text.
///
/// ## Example
///
/// ```rust
/// use agora_protocol::{Codec, LineCodec, ServerLine};
///
/// let codec = LineCodec;
/// assert_eq!(codec.decode(b"  /nick alice\r\n").unwrap(), "/nick alice");
/// assert_eq!(codec.encode(&ServerLine::Ok), b"OK\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl Codec for LineCodec {
    fn decode(&self, data: &[u8]) -> Result<String, ProtocolError> {
        // Strict: a single invalid byte fails the whole read instead of
        // being replaced with U+FFFD.
        let text = std::str::from_utf8(data)?;
        Ok(text.trim().to_string())
    }

    fn encode(&self, line: &ServerLine) -> Vec<u8> {
        let mut bytes = line.to_string().into_bytes();
        bytes.push(b'\n');
        bytes
    }
}
