//! Frame codec
//!
//! Builds and validates the DART physical envelope:
//! `[ADDR][CTRL][STX][LNG] body [CRC-L][CRC-H][ETX][SF]`.
//! The two link bytes travel ahead of the start marker; the checksum covers
//! [ADDR ..= body end] and is validated by the residue over
//! [ADDR ..= CRC-H].

use forecourt_link::crc;
use forecourt_link::{LinkError, Result};

use crate::constants::{ETX, FRAME_OVERHEAD, MAX_BODY_LEN, SF, STX, STX_OFFSET};

/// A validated DART frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bus address the frame was sent to or from
    pub address: u8,
    /// Control byte: direction bits plus the sequence toggle
    pub control: u8,
    /// Concatenated transaction records
    pub body: Vec<u8>,
}

/// Assemble a wire frame around `body`.
pub fn build(address: u8, control: u8, body: &[u8]) -> Result<Vec<u8>> {
    if body.len() > MAX_BODY_LEN {
        return Err(LinkError::invalid_input(format!(
            "frame body of {} bytes exceeds the {}-byte length field",
            body.len(),
            MAX_BODY_LEN
        )));
    }

    let mut frame = Vec::with_capacity(FRAME_OVERHEAD + body.len());
    frame.push(address);
    frame.push(control);
    frame.push(STX);
    frame.push(body.len() as u8);
    frame.extend_from_slice(body);

    let checksum = crc::checksum(&frame);
    frame.push((checksum & 0xFF) as u8);
    frame.push((checksum >> 8) as u8);
    frame.push(ETX);
    frame.push(SF);

    Ok(frame)
}

/// Validate a candidate byte range and extract the frame.
///
/// Any violation rejects the whole candidate; a partially-trusted frame is
/// never returned.
pub fn parse(candidate: &[u8]) -> Result<Frame> {
    if candidate.len() < FRAME_OVERHEAD {
        return Err(LinkError::malformed(format!(
            "candidate of {} bytes is below the {}-byte envelope",
            candidate.len(),
            FRAME_OVERHEAD
        )));
    }
    if candidate[STX_OFFSET] != STX {
        return Err(LinkError::malformed("start marker missing"));
    }

    let body_len = candidate[3] as usize;
    if candidate.len() != FRAME_OVERHEAD + body_len {
        return Err(LinkError::malformed(format!(
            "length byte declares {} body bytes but the candidate holds {}",
            body_len,
            candidate.len().saturating_sub(FRAME_OVERHEAD)
        )));
    }
    if candidate[candidate.len() - 2] != ETX || candidate[candidate.len() - 1] != SF {
        return Err(LinkError::malformed("end or stop marker missing"));
    }

    // Residue over [ADDR ..= CRC-H]
    if !crc::validate(&candidate[..candidate.len() - 2]) {
        return Err(LinkError::ChecksumMismatch);
    }

    Ok(Frame {
        address: candidate[0],
        control: candidate[1],
        body: candidate[4..4 + body_len].to_vec(),
    })
}
