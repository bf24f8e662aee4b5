use thiserror::Error;

use crate::registry::GenomeEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("anchor {anchor} is outside genome '{genome}' (valid positions are 1..={length})")]
    AnchorOutOfRange {
        genome: String,
        anchor: usize,
        length: usize,
    },
    #[error("extracted {actual} bases from genome '{genome}' where {expected} were requested")]
    InternalLengthMismatch {
        genome: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoterWindow {
    pub sequence: Vec<u8>,
    // The window crossed the origin and was completed from the genome's tail.
    pub wrapped: bool,
    // The genome is shorter than the window; `sequence` is the whole genome.
    pub degraded: bool,
}

// Extract the `window_len` bases immediately upstream of the 1-based
// position `anchor`, treating the genome as circular.
//
// The window covers the 1-based inclusive range
// `anchor - window_len ..= anchor - 1`. When that range starts before
// position 1, the missing bases are taken from the end of the genome and
// placed in front of the head bases, so the genome's last base precedes its
// first.
//
// A genome shorter than `window_len` cannot supply a full window even with
// wraparound; the whole genome is returned with `degraded` set. This is the
// only case in which the result is not exactly `window_len` long.
pub fn extract_upstream_window(
    entry: &GenomeEntry,
    anchor: usize,
    window_len: usize,
) -> Result<PromoterWindow, WindowError> {
    let sequence = entry.sequence();
    let length = sequence.len();

    if anchor < 1 || anchor > length {
        return Err(WindowError::AnchorOutOfRange {
            genome: entry.name().to_string(),
            anchor,
            length,
        });
    }

    if length < window_len {
        return Ok(PromoterWindow {
            sequence: sequence.to_vec(),
            wrapped: false,
            degraded: true,
        });
    }

    // 1-based inclusive end of the window; 0 when the anchor is position 1.
    let window_end = anchor - 1;

    let (window, wrapped) = if anchor > window_len {
        // window_start = anchor - window_len >= 1, as a half-open 0-based range.
        let window_start = anchor - window_len;
        (sequence[window_start - 1..window_end].to_vec(), false)
    } else {
        let supplement_len = window_len - window_end;
        let mut window = Vec::with_capacity(window_len);
        window.extend_from_slice(&sequence[length - supplement_len..]);
        window.extend_from_slice(&sequence[..window_end]);
        (window, true)
    };

    if window.len() != window_len {
        return Err(WindowError::InternalLengthMismatch {
            genome: entry.name().to_string(),
            expected: window_len,
            actual: window.len(),
        });
    }

    Ok(PromoterWindow {
        sequence: window,
        wrapped,
        degraded: false,
    })
}
