use core::fmt::Write;

use gwiot_sensor::Snapshot;
use heapless::String;
use thiserror::Error;

/// Payload budget of one frame. The literal header is 41 bytes long, so
/// this is the smallest 8 byte multiple that carries it whole.
///
/// A full frame with negative axes reaches the budget at sequence id
/// 10000; past that, or with a four digit light value, trailing fields
/// are truncated.
pub const MAX_PAYLOAD_LEN: usize = 48;

/// Sent once, as frame 0, in place of readings
pub const HEADER: &str = "0, X, Y, Z, Light, Temp (C), humidity (%)";

const FIELD_SEPARATOR: &str = ", ";

// Fits any i32 fixed point value: sign, ten digits and the point
const FIELD_LEN: usize = 16;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Header needs {needed} bytes, payload budget is {budget}")]
    HeaderOverflow { needed: usize, budget: usize },
    #[error("Sequence id {seq} does not fit a {budget} byte payload")]
    SequenceOverflow { seq: u32, budget: usize },
}

/// Formats telemetry frames into a fixed capacity buffer it owns.
///
/// Frame 0 is the literal [`HEADER`], rejected whole if it cannot fit.
/// Later frames are `<seq>, <value>, ...` over the healthy channels only;
/// a value that would not fit ends the frame there, at a field boundary.
pub struct PayloadEncoder<const N: usize = MAX_PAYLOAD_LEN> {
    buf: String<N>,
    truncated: bool,
}

impl<const N: usize> Default for PayloadEncoder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PayloadEncoder<N> {
    pub const fn new() -> Self {
        Self {
            buf: String::new(),
            truncated: false,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Whether the last encoded frame dropped trailing values
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn encode(&mut self, seq: u32, snapshot: &Snapshot) -> Result<&str, EncodeError> {
        self.buf.clear();
        self.truncated = false;

        if seq == 0 {
            if self.buf.push_str(HEADER).is_err() {
                return Err(EncodeError::HeaderOverflow {
                    needed: HEADER.len(),
                    budget: N,
                });
            }
            return Ok(self.buf.as_str());
        }

        if write!(self.buf, "{seq}").is_err() {
            self.buf.clear();
            return Err(EncodeError::SequenceOverflow { seq, budget: N });
        }

        let mut field: String<FIELD_LEN> = String::new();
        for value in snapshot.values() {
            field.clear();
            let end = self.buf.len();
            let pushed = write!(field, "{value}").is_ok()
                && self
                    .buf
                    .push_str(FIELD_SEPARATOR)
                    .and_then(|()| self.buf.push_str(&field))
                    .is_ok();
            if !pushed {
                self.buf.truncate(end);
                self.truncated = true;
                break;
            }
        }

        if self.truncated {
            log::warn!("Frame {seq} truncated to {} bytes", self.buf.len());
        }

        Ok(self.buf.as_str())
    }
}
