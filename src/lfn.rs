//! LFN Assembler
//!
//! Long File Name fragments immediately precede the short entry they
//! annotate, stored in reverse order on disk: the fragment bearing the
//! "last" bit (0x40) in its sequence byte comes first under a forward scan,
//! and fragments are walked from there down to sequence number 1.
//! [`LfnAssembler`] is the stateful half of directory decoding; the
//! slot decoder in [`crate::entry`] stays stateless and just reports what
//! kind of slot it saw.

use crate::entry::{LfnFragment, ShortEntry};

const LAST_LONG_ENTRY: u8 = 0x40;
const SEQUENCE_MASK: u8 = !LAST_LONG_ENTRY;

/// Accumulates a run of LFN fragments and attaches the assembled name to
/// the short entry that ends the run.
#[derive(Default)]
pub struct LfnAssembler {
    code_units: Vec<u16>,
    expected_checksum: Option<u8>,
    fragments_seen: u8,
}

impl LfnAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fragment into the accumulator.
    ///
    /// Fragments are prepended: on a forward scan the highest-numbered
    /// (last-in-name) fragment is read first, so each new fragment's code
    /// units belong *before* whatever has already accumulated.
    pub fn push_fragment(&mut self, fragment: LfnFragment) {
        let mut prefix = Vec::with_capacity(13 + self.code_units.len());
        prefix.extend_from_slice(&fragment.code_units);
        prefix.append(&mut self.code_units);
        self.code_units = prefix;
        self.expected_checksum = Some(fragment.checksum);
        self.fragments_seen += 1;
    }

    /// Discard whatever has accumulated so far, without emitting anything
    /// (used on a deleted slot).
    pub fn reset(&mut self) {
        self.code_units.clear();
        self.expected_checksum = None;
        self.fragments_seen = 0;
    }

    fn has_pending(&self) -> bool {
        self.fragments_seen > 0
    }

    /// Take the accumulated name, if any, validating it against `entry`'s
    /// 8.3 checksum. On a mismatch the caller is told to fall back to the
    /// short name and log a warning; the accumulator is reset
    /// either way, ready for the next run.
    pub fn take(&mut self, entry: &ShortEntry) -> Option<String> {
        if !self.has_pending() {
            return None;
        }
        let code_units = std::mem::take(&mut self.code_units);
        let expected = self.expected_checksum.take();
        self.fragments_seen = 0;

        if expected != Some(short_name_checksum(entry)) {
            log::warn!(
                "LFN checksum mismatch for short entry {:?}; falling back to 8.3 name",
                entry.short_name()
            );
            return None;
        }

        let terminator = code_units.iter().position(|&cu| cu == 0x0000);
        let trimmed = match terminator {
            Some(idx) => &code_units[..idx],
            None => code_units
                .iter()
                .rposition(|&cu| cu != 0xFFFF)
                .map(|idx| &code_units[..=idx])
                .unwrap_or(&code_units[..0]),
        };

        Some(String::from_utf16_lossy(trimmed))
    }
}

/// 8-bit checksum over the 11-byte (8+3) short name, as stored in every
/// LFN fragment belonging to that entry.
fn short_name_checksum(entry: &ShortEntry) -> u8 {
    let mut sum: u8 = 0;
    for &byte in entry.filename_raw.iter().chain(entry.extension_raw.iter()) {
        sum = ((sum & 1) << 7).wrapping_add(sum >> 1).wrapping_add(byte);
    }
    sum
}
