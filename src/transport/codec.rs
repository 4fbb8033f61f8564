//! Newline-delimited JSON framing.
//!
//! `MessageCodec` turns a byte stream into one `Message` per `\n`-terminated
//! line and back. A line that cannot be decoded is yielded as an
//! `Err(DecodeError)` item rather than a codec error, so the stream keeps
//! going: `Framed*` stops polling a decoder after it returns `Err`.

use std::cmp;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::transport::message::Message;
use crate::utils::error::{DecodeError, TransportError};

/// Default upper bound for one line, excluding the delimiter.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct MessageCodec {
    max_length: usize,
    // Where to resume the newline search on the next call.
    next_index: usize,
    // Inside an oversized line; drop bytes until the next newline.
    discarding: bool,
}

impl MessageCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

impl Decoder for MessageCodec {
    type Item = Result<Message, DecodeError>;
    type Error = TransportError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let read_to = cmp::min(self.max_length.saturating_add(1), buf.len());
            let newline = buf[self.next_index..read_to]
                .iter()
                .position(|b| *b == b'\n');

            match (self.discarding, newline) {
                (true, Some(offset)) => {
                    buf.advance(self.next_index + offset + 1);
                    self.discarding = false;
                    self.next_index = 0;
                }
                (true, None) => {
                    buf.advance(read_to);
                    self.next_index = 0;
                    if buf.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(offset)) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;
                    let frame = buf.split_to(end + 1);
                    let line = trim_line_ending(&frame[..end]);
                    if line.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    return Ok(Some(decode_line(line)));
                }
                (false, None) if buf.len() > self.max_length => {
                    self.discarding = true;
                    return Ok(Some(Err(DecodeError::TooLong {
                        max: self.max_length,
                    })));
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame = self.decode(buf)?;
        if frame.is_none() {
            // An unterminated tail at end of stream is never a complete message.
            buf.clear();
            self.next_index = 0;
            self.discarding = false;
        }
        Ok(frame)
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        // Compact JSON escapes control characters, so the delimiter never
        // appears inside a frame.
        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

/// Parse one line without its delimiter.
pub fn decode_line(line: &[u8]) -> Result<Message, DecodeError> {
    let text = std::str::from_utf8(line).map_err(|_| DecodeError::InvalidUtf8)?;

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DecodeError::Malformed {
            line: text.to_string(),
            reason: e.to_string(),
        })?;

    if !value.is_object() {
        return Err(DecodeError::Malformed {
            line: text.to_string(),
            reason: "expected a JSON object".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|_| DecodeError::Unrecognized {
        line: text.to_string(),
    })
}
