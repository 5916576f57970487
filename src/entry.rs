//! Directory Entry Decoder
//!
//! Decodes a single 32-byte directory slot into one of four shapes. The
//! decoder is stateless, a slot decodes the same way regardless
//! of what preceded it; the stateful part (accumulating LFN fragments) lives
//! in [`crate::lfn`].
//!
//! Special notes about the first byte of a slot's name field:
//! - `0x00`: no further entries in this directory.
//! - `0xE5`: deleted, skip.
//! - `0x05`: the actual first character is `0xE5`, a valid Shift-JIS lead
//!   byte. The substitution exists so a name that genuinely starts with
//!   `0xE5` isn't mistaken for a deleted slot.

use bitflags::bitflags;

use crate::cursor::{read_le_u16, read_le_u32};
use crate::timestamp;

bitflags! {
    /// The six attribute bits of a short directory entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attributes: u8 {
        const READ_ONLY    = 0x01;
        const HIDDEN       = 0x02;
        const SYSTEM       = 0x04;
        const VOLUME_LABEL = 0x08;
        const DIRECTORY    = 0x10;
        const ARCHIVE      = 0x20;
    }
}

/// All four low bits set marks a slot as an LFN fragment rather than a
/// short entry; this must be checked before any other attribute bit.
const ATTR_LFN: u8 = 0x0F;

const NAME_FREE_DELETED: u8 = 0xE5;
const NAME_FREE_END: u8 = 0x00;
const NAME_KANJI_ESCAPE: u8 = 0x05;

/// Decoded timestamps attached to a short entry, still DOS-packed, decoded
/// lazily by [`ShortEntry::created`]/[`ShortEntry::written`]/
/// [`ShortEntry::accessed`] so a consumer who never asks for timestamps
/// never pays for an out-of-range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTimestamps {
    pub create_date: u16,
    pub create_time: u16,
    pub create_centiseconds: u8,
    pub write_date: u16,
    pub write_time: u16,
    pub access_date: u16,
}

/// A decoded short (8.3) directory entry, before LFN names are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortEntry {
    pub filename_raw: [u8; 8],
    pub extension_raw: [u8; 3],
    pub attributes: Attributes,
    pub start_cluster: u32,
    pub size: u32,
    pub timestamps: RawTimestamps,
}

impl ShortEntry {
    /// 8.3 name reconstruction: trimmed filename plus extension, joined
    /// with a dot unless the entry is a directory or volume label.
    pub fn short_name(&self) -> String {
        let mut name = self.filename_raw;
        if name[0] == NAME_KANJI_ESCAPE {
            name[0] = NAME_FREE_DELETED;
        }
        let name_len = name.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
        let ext_len = self
            .extension_raw
            .iter()
            .rposition(|&b| b != b' ')
            .map_or(0, |i| i + 1);

        let name_str = String::from_utf8_lossy(&name[..name_len]);
        let ext_str = String::from_utf8_lossy(&self.extension_raw[..ext_len]);

        let joined_without_dot = self.attributes.contains(Attributes::DIRECTORY)
            || self.attributes.contains(Attributes::VOLUME_LABEL);

        if joined_without_dot || ext_str.is_empty() {
            format!("{name_str}{ext_str}")
        } else {
            format!("{name_str}.{ext_str}")
        }
    }

    pub fn created(&self) -> crate::error::Result<chrono::NaiveDateTime> {
        timestamp::decode_creation(
            self.timestamps.create_date,
            self.timestamps.create_time,
            self.timestamps.create_centiseconds,
        )
    }

    pub fn written(&self) -> crate::error::Result<chrono::NaiveDateTime> {
        timestamp::decode_write(self.timestamps.write_date, self.timestamps.write_time)
    }

    pub fn accessed(&self) -> crate::error::Result<chrono::NaiveDate> {
        timestamp::decode_access(self.timestamps.access_date)
    }
}

/// A decoded LFN fragment, carrying 13 UTF-16 code units of the name plus
/// enough bookkeeping for the assembler to order and validate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LfnFragment {
    pub sequence_byte: u8,
    pub code_units: [u16; 13],
    pub checksum: u8,
}

/// The four shapes a 32-byte slot can decode to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirSlot {
    EndOfDirectory,
    Deleted,
    LfnFragment(LfnFragment),
    ShortEntry(ShortEntry),
}

/// Decode one 32-byte directory slot.
pub fn decode(slot: &[u8; 32]) -> DirSlot {
    match slot[0] {
        NAME_FREE_END => return DirSlot::EndOfDirectory,
        NAME_FREE_DELETED => return DirSlot::Deleted,
        _ => {}
    }

    let attr = slot[11];
    if attr == ATTR_LFN {
        return DirSlot::LfnFragment(decode_lfn_fragment(slot));
    }

    DirSlot::ShortEntry(decode_short_entry(slot))
}

fn decode_lfn_fragment(slot: &[u8; 32]) -> LfnFragment {
    let mut code_units = [0u16; 13];
    let mut idx = 0;
    for chunk in slot[1..11].chunks_exact(2) {
        code_units[idx] = read_le_u16(chunk);
        idx += 1;
    }
    for chunk in slot[14..26].chunks_exact(2) {
        code_units[idx] = read_le_u16(chunk);
        idx += 1;
    }
    for chunk in slot[28..32].chunks_exact(2) {
        code_units[idx] = read_le_u16(chunk);
        idx += 1;
    }
    LfnFragment {
        sequence_byte: slot[0],
        code_units,
        checksum: slot[13],
    }
}

fn decode_short_entry(slot: &[u8; 32]) -> ShortEntry {
    let mut filename_raw = [0u8; 8];
    filename_raw.copy_from_slice(&slot[0..8]);
    let mut extension_raw = [0u8; 3];
    extension_raw.copy_from_slice(&slot[8..11]);

    let attributes = Attributes::from_bits_truncate(slot[11]);

    let create_centiseconds = slot[13];
    let create_time = read_le_u16(&slot[14..16]);
    let create_date = read_le_u16(&slot[16..18]);
    let access_date = read_le_u16(&slot[18..20]);
    let cluster_hi = read_le_u16(&slot[20..22]);
    let write_time = read_le_u16(&slot[22..24]);
    let write_date = read_le_u16(&slot[24..26]);
    let cluster_lo = read_le_u16(&slot[26..28]);
    let size = read_le_u32(&slot[28..32]);

    ShortEntry {
        filename_raw,
        extension_raw,
        attributes,
        start_cluster: ((cluster_hi as u32) << 16) | cluster_lo as u32,
        size,
        timestamps: RawTimestamps {
            create_date,
            create_time,
            create_centiseconds,
            write_date,
            write_time,
            access_date,
        },
    }
}
