//! Stream framer
//!
//! Pulls candidate frame ranges out of an arbitrary, possibly noisy byte
//! buffer. A candidate spans the two link bytes ahead of a start marker
//! through the next stop byte; it carries no validity claim, and every
//! candidate must still pass `frame::parse`. Noise ahead of a frame is
//! discarded, and a malformed frame is skipped by resynchronizing on the
//! next stop byte.

use crate::constants::{LINK_PREFIX, SF, STX};

/// Drain complete frame candidates out of `buffer`.
///
/// Consumed bytes (candidates and skipped noise) are removed; a trailing
/// partial frame stays in the buffer until more bytes arrive. A buffer with
/// no start marker at all is pure noise and is cleared.
pub fn extract(buffer: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let mut candidates = Vec::new();

    loop {
        let Some(stx) = buffer.iter().position(|&b| b == STX) else {
            buffer.clear();
            break;
        };

        // The address and control bytes travel ahead of the start marker;
        // without them this occurrence cannot open a frame.
        if stx < LINK_PREFIX {
            buffer.drain(..=stx);
            continue;
        }

        let Some(offset) = buffer[stx + 1..].iter().position(|&b| b == SF) else {
            // Incomplete frame; wait for more bytes.
            break;
        };
        let sf = stx + 1 + offset;

        candidates.push(buffer[stx - LINK_PREFIX..=sf].to_vec());
        buffer.drain(..=sf);
    }

    candidates
}
