//! DOS date/time decoding
//!
//! FAT timestamps are packed into 16-bit date and time words plus, for
//! creation time only, a centisecond byte. This module decodes
//! them into `chrono` values rather than leaving callers to unpack bitfields
//! themselves.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

/// Decode a DOS date word into a calendar date.
///
/// Bits 0..4 day (1..31), bits 5..8 month (1..12), bits 9..15 year offset
/// from 1980 (so the representable range is 1980..=2107).
pub fn decode_date(date: u16) -> Result<NaiveDate> {
    let day = (date & 0x1F) as u32;
    let month = ((date >> 5) & 0x0F) as u32;
    let year = 1980 + ((date >> 9) & 0x7F) as i32;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::InvalidTimestamp("date"))
}

/// Decode a DOS time word (seconds resolution is 2 seconds) into a time.
///
/// Bits 0..4 seconds/2 (0..29), bits 5..10 minutes (0..59), bits 11..15
/// hours (0..23).
pub fn decode_time(time: u16) -> Result<NaiveTime> {
    let seconds = ((time & 0x1F) as u32) * 2;
    let minutes = ((time >> 5) & 0x3F) as u32;
    let hours = ((time >> 11) & 0x1F) as u32;
    NaiveTime::from_hms_opt(hours, minutes, seconds).ok_or(Error::InvalidTimestamp("time"))
}

/// Decode a creation timestamp, which adds a centisecond byte (0..199) on
/// top of the date/time words for finer resolution than the 2-second
/// granularity of `decode_time` alone.
pub fn decode_creation(date: u16, time: u16, centiseconds: u8) -> Result<NaiveDateTime> {
    if centiseconds > 199 {
        return Err(Error::InvalidTimestamp("centiseconds"));
    }
    let date = decode_date(date)?;
    let base = decode_time(time)?;
    let extra_seconds = (centiseconds as i64) / 100;
    let millis = ((centiseconds as i64) % 100) * 10;
    let naive = NaiveDateTime::new(date, base)
        + chrono::Duration::seconds(extra_seconds)
        + chrono::Duration::milliseconds(millis);
    Ok(naive)
}

/// Decode a last-write timestamp (date and time words, no centiseconds).
pub fn decode_write(date: u16, time: u16) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::new(decode_date(date)?, decode_time(time)?))
}

/// Decode a last-access timestamp, which on disk carries a date only; the
/// time component defaults to midnight.
pub fn decode_access(date: u16) -> Result<NaiveDate> {
    decode_date(date)
}
