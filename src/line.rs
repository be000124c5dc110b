//! Line-based codec for tokio.
//!
//! Reads CRLF- or LF-terminated lines and writes CRLF-terminated lines.
//! Incoming lines longer than the limit are discarded rather than
//! reported, so one oversized line never tears the connection down.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::error::ProtocolError;

/// Default maximum line length in bytes, line terminator included.
pub const MAX_LINE_LEN: usize = 512;

/// Line-based codec that handles newline-terminated messages.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// True while skipping the rest of an oversized line
    discarding: bool,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Create a codec with the standard 512-byte limit.
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    /// The configured limit.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Sanitize an outgoing line.
    ///
    /// - Truncates at the first line ending
    /// - Rejects NUL
    pub fn sanitize(mut data: String) -> Result<String, ProtocolError> {
        if let Some(pos) = data.find(['\r', '\n']) {
            data.truncate(pos);
        }
        if data.contains('\0') {
            return Err(ProtocolError::IllegalControlChar('\0'));
        }
        Ok(data)
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if self.discarding {
                    src.clear();
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                    if src.len() > self.max_len {
                        warn!(limit = self.max_len, "incoming line too long, discarding");
                        src.clear();
                        self.next_index = 0;
                        self.discarding = true;
                    }
                }
                return Ok(None);
            };

            let end = self.next_index + offset + 1;
            self.next_index = 0;

            if self.discarding {
                src.advance(end);
                self.discarding = false;
                continue;
            }

            let line = src.split_to(end);
            if line.len() > self.max_len {
                warn!(
                    actual = line.len(),
                    limit = self.max_len,
                    "incoming line too long, discarding"
                );
                continue;
            }

            let text = String::from_utf8_lossy(&line);
            return Ok(Some(text.trim_end_matches(['\r', '\n']).to_owned()));
        }
    }

    // An unterminated tail at EOF is dropped instead of failing the stream.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if !src.is_empty() {
            warn!(len = src.len(), "discarding unterminated line at end of stream");
            src.clear();
        }
        self.next_index = 0;
        self.discarding = false;
        Ok(None)
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = Self::sanitize(msg)?;
        let actual = line.len() + 2;
        if actual > self.max_len {
            return Err(ProtocolError::MessageTooLong {
                actual,
                limit: self.max_len,
            });
        }

        dst.reserve(actual);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\n:s 001 me :hi\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :test".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(":s 001 me :hi".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"abc\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :abc".to_string()));
    }

    #[test]
    fn test_decode_too_long_is_skipped() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\nPING :x\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :x".to_string()));
    }

    #[test]
    fn test_decode_too_long_across_reads() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("0123456789abcdef");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"still the same line\nPING :y\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :y".to_string()));
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b":s PRIVMSG #c :caf\xe9\r\n"[..]);
        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert!(line.starts_with(":s PRIVMSG #c :caf"));
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }

    #[test]
    fn test_encode_truncates_injected_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode("PRIVMSG #c :hi\r\nQUIT :owned".to_string(), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #c :hi\r\n");
    }

    #[test]
    fn test_encode_rejects_nul_and_long_lines() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::new();

        assert!(matches!(
            codec.encode("PRIVMSG #c :a\0b".to_string(), &mut buf),
            Err(ProtocolError::IllegalControlChar('\0'))
        ));
        assert!(matches!(
            codec.encode("PRIVMSG #channel :hello".to_string(), &mut buf),
            Err(ProtocolError::MessageTooLong { limit: 16, .. })
        ));
        assert!(buf.is_empty());
    }
}
