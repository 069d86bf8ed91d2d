//! Frame codec for the REG wire protocol
//!
//! Frame = one JSON message + `\n`. JSON string escaping guarantees the
//! message itself never contains a raw newline.

use bytes::{Bytes, BytesMut};
use reg_core::{RegError, RegResult};
use serde::Serialize;

/// Frame delimiter
pub const FRAME_DELIMITER: u8 = b'\n';

/// Default maximum frame size, delimiter included
pub const MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

/// Newline-delimited JSON codec
#[derive(Clone, Copy, Debug)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> Self {
        FrameCodec { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Serialize a message into one frame
    pub fn encode<T: Serialize>(&self, message: &T) -> RegResult<Bytes> {
        let mut buf =
            serde_json::to_vec(message).map_err(|e| RegError::Internal(e.to_string()))?;
        buf.push(FRAME_DELIMITER);

        if buf.len() > self.max_frame_size {
            return Err(RegError::FrameTooLarge {
                size: buf.len(),
                max: self.max_frame_size,
            });
        }
        Ok(Bytes::from(buf))
    }

    /// Split the next complete frame off `buf`, without its delimiter.
    ///
    /// Returns `Ok(None)` when more bytes are needed. Blank lines are skipped.
    pub fn decode(&self, buf: &mut BytesMut) -> RegResult<Option<Bytes>> {
        loop {
            let Some(pos) = buf.iter().position(|b| *b == FRAME_DELIMITER) else {
                if buf.len() >= self.max_frame_size {
                    return Err(RegError::FrameTooLarge {
                        size: buf.len(),
                        max: self.max_frame_size,
                    });
                }
                return Ok(None);
            };

            if pos + 1 > self.max_frame_size {
                return Err(RegError::FrameTooLarge {
                    size: pos + 1,
                    max: self.max_frame_size,
                });
            }

            let mut frame = buf.split_to(pos + 1).freeze();
            frame.truncate(pos);
            if frame.last() == Some(&b'\r') {
                frame.truncate(pos - 1);
            }
            if frame.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(frame));
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        FrameCodec::new(MAX_FRAME_SIZE)
    }
}
