//! Unit-of-work protocol
//!
//! This module defines the bounded messages exchanged between the dispatcher
//! and the workers: the kernel-specific work units (requests) and partial
//! results (responses), plus the envelope that carries them.
//!
//! # Message Flow
//!
//! ```text
//! Dispatcher                      Worker i
//!     |                              |
//!     |------ Unit(work) ----------->|        (round-robin over the pool)
//!     |                              |
//!     |<----- partial result --------|        (blocks until received)
//!     |                              |
//!     ...                            ...
//!     |------ Stop ----------------->|        (once, after exhaustion)
//! ```
//!
//! Every exchange is synchronous request/response: a worker holds at most one
//! outstanding unit, and the dispatcher never reuses a worker before its
//! result arrives. In-process dispatch moves these types over typed channels;
//! for remote transports the same types carry a concrete wire form — a 4-byte
//! little-endian length prefix followed by a MessagePack payload:
//!
//! ```text
//! [4 bytes: payload length][N bytes: MessagePack-serialized message]
//! ```
//!
//! MessagePack keeps the frame compact and supports every serde feature the
//! message types need (notably shared `Arc` signal handles).
//!
//! # Errors
//!
//! [`ProtocolError`] covers dispatcher/worker desynchronization: a worker
//! vanishing mid-exchange, oversized or truncated frames, malformed payloads,
//! and units that violate their declared capacity. All of these are fatal —
//! they indicate a coordination bug, not a user-recoverable condition.

use crate::config::MAX_WORD_LEN;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::sync::Arc;
use thiserror::Error;

/// Sentinel lag value marking an unused slot in a correlation unit.
pub const SENTINEL_LAG: i32 = -1;

/// Upper bound on a single wire frame. Large enough for a unit carrying two
/// full signal vectors, small enough to reject a corrupt length prefix.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Protocol violations. Fatal: the dispatcher and a worker have
/// desynchronized, or a message broke its declared bounds.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("worker {0} closed its channel while a unit was outstanding")]
    WorkerDisconnected(usize),

    #[error("work unit of {len} bytes exceeds the {capacity}-byte unit capacity")]
    UnitOverCapacity { len: usize, capacity: usize },

    #[error("lag index {lag} outside signal of {num_samples} samples")]
    LagOutOfRange { lag: i32, num_samples: usize },

    #[error("frame of {len} bytes exceeds the {max}-byte frame limit")]
    FrameTooLarge { len: usize, max: usize },

    #[error("truncated frame: need {expected} bytes, have {available}")]
    TruncatedFrame { expected: usize, available: usize },

    #[error("malformed frame payload: {0}")]
    Malformed(String),

    #[error("frame io: {0}")]
    Io(#[from] std::io::Error),
}

/// Envelope the dispatcher sends to a worker: either one unit of work or the
/// instruction to terminate. Collapses the original two-message handshake
/// ("more work?" flag, then payload) into one typed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkerMessage<U> {
    Unit(U),
    Stop,
}

/// One bounded slice of a text source.
///
/// The byte buffer ends immediately after a separator byte for every unit
/// except the last one of a source, which may end mid-word at end of input.
/// Capacity is enforced at construction: a chunker that accumulates more
/// bytes than the unit admits has a bug, and silent truncation would corrupt
/// the histograms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalUnit {
    pub source_id: usize,
    pub bytes: Vec<u8>,
}

impl LexicalUnit {
    pub fn new(source_id: usize, bytes: Vec<u8>, capacity: usize) -> Result<Self, ProtocolError> {
        if bytes.len() > capacity {
            return Err(ProtocolError::UnitOverCapacity {
                len: bytes.len(),
                capacity,
            });
        }
        Ok(Self { source_id, bytes })
    }
}

/// Partial lexical aggregates computed from one unit.
///
/// Word lengths index `lengths[len - 1]`; the joint histogram indexes
/// `vowels_by_length[vowels][len - 1]`. A word has at most [`MAX_WORD_LEN`]
/// characters and therefore at most [`MAX_WORD_LEN`] vowels, so the vowel
/// axis needs one extra row for the zero-vowel case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPartial {
    pub source_id: usize,
    pub words: u64,
    pub max_word_len: usize,
    pub max_vowels: usize,
    pub lengths: [u64; MAX_WORD_LEN],
    pub vowels_by_length: [[u64; MAX_WORD_LEN]; MAX_WORD_LEN + 1],
}

impl LexicalPartial {
    pub fn empty(source_id: usize) -> Self {
        Self {
            source_id,
            words: 0,
            max_word_len: 0,
            max_vowels: 0,
            lengths: [0; MAX_WORD_LEN],
            vowels_by_length: [[0; MAX_WORD_LEN]; MAX_WORD_LEN + 1],
        }
    }
}

/// One bounded batch of lag indices for a signal pair.
///
/// Every unit of a source carries handles to the full signal vectors; the
/// vectors are loaded once per source and shared, not copied per unit. The
/// lag slots are fixed-width: the final unit of a source pads unused slots
/// with [`SENTINEL_LAG`] rather than shrinking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationUnit {
    pub source_id: usize,
    pub num_samples: usize,
    pub lags: Vec<i32>,
    pub x: Arc<Vec<f64>>,
    pub y: Arc<Vec<f64>>,
}

impl CorrelationUnit {
    pub fn new(
        source_id: usize,
        num_samples: usize,
        lags: Vec<i32>,
        x: Arc<Vec<f64>>,
        y: Arc<Vec<f64>>,
    ) -> Result<Self, ProtocolError> {
        for &lag in &lags {
            if lag != SENTINEL_LAG && !(0..num_samples as i32).contains(&lag) {
                return Err(ProtocolError::LagOutOfRange { lag, num_samples });
            }
        }
        Ok(Self {
            source_id,
            num_samples,
            lags,
            x,
            y,
        })
    }
}

/// Correlation values for one unit; `values[i]` is meaningful only where
/// `lags[i]` is not the sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationPartial {
    pub source_id: usize,
    pub num_samples: usize,
    pub lags: Vec<i32>,
    pub values: Vec<f64>,
}

/// Serialize a message into a length-prefixed frame.
pub fn encode_frame<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload = rmp_serde::to_vec(msg).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len: payload.len(),
            max: MAX_FRAME_LEN,
        });
    }
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode one frame from a byte slice; returns the message and the number of
/// bytes consumed.
pub fn decode_frame<T: for<'de> Deserialize<'de>>(
    bytes: &[u8],
) -> Result<(T, usize), ProtocolError> {
    if bytes.len() < 4 {
        return Err(ProtocolError::TruncatedFrame {
            expected: 4,
            available: bytes.len(),
        });
    }
    let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    if bytes.len() < 4 + len {
        return Err(ProtocolError::TruncatedFrame {
            expected: 4 + len,
            available: bytes.len(),
        });
    }
    let msg = rmp_serde::from_slice(&bytes[4..4 + len])
        .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    Ok((msg, 4 + len))
}

/// Write one frame to a transport.
pub fn write_frame<T: Serialize, W: Write>(writer: &mut W, msg: &T) -> Result<(), ProtocolError> {
    let frame = encode_frame(msg)?;
    writer.write_all(&frame)?;
    Ok(())
}

/// Read one frame from a transport.
pub fn read_frame<T: for<'de> Deserialize<'de>, R: Read>(
    reader: &mut R,
) -> Result<T, ProtocolError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    rmp_serde::from_slice(&payload).map_err(|e| ProtocolError::Malformed(e.to_string()))
}
