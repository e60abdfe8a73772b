//! Variable-length 7-bit unsigned integer encoding (EXI 7.1.6).
//!
//! Each octet has a continuation bit (MSB) and 7 data bits. The least
//! significant group is written first. The last octet has continuation = 0.
//!
//! Decodiert werden höchstens 10 Gruppen (70 Bits). Der Zwischenstand liegt
//! in einem [`UintProgress`]-Register, damit ein Abbruch mitten in den
//! Gruppen ohne erneutes Lesen bereits verarbeiteter Gruppen fortgesetzt
//! werden kann.

use crate::bitstream::{BitReader, BitWriter};
use crate::{Error, Result};

/// Maximale Anzahl 7-Bit-Gruppen.
pub const MAX_GROUPS: u8 = 10;

/// Fortschrittsregister eines unterbrochenen Unsigned Integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UintProgress {
    /// Bisher akkumulierter Wert.
    value: u128,
    /// Bisher gelesene Bits (Vielfaches von 7).
    bits: u8,
}

impl UintProgress {
    /// `true` solange keine Gruppe eines angefangenen Werts gelesen wurde.
    pub fn is_idle(&self) -> bool {
        self.bits == 0
    }
}

/// Encodes an unsigned integer of at most 70 bits (EXI 7.1.6).
///
/// # Panics
///
/// Panics if `value` needs more than 70 bits.
pub fn encode(writer: &mut BitWriter, value: impl Into<u128>) {
    let mut v = value.into();
    assert!(v >> (MAX_GROUPS as u32 * 7) == 0, "value {v} exceeds 70 bits");
    loop {
        let low7 = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            writer.write_byte(low7);
            break;
        }
        writer.write_byte(0x80 | low7);
    }
}

/// Decodes an unsigned integer, resuming from `progress` (EXI 7.1.6).
///
/// Bei [`Error::NeedMoreData`] bleiben alle bereits gelesenen Gruppen im
/// Register; der nächste Aufruf liest nur die fehlenden Gruppen.
/// Eine 11. Gruppe ist [`Error::IntegerOverflow`].
pub fn decode(reader: &mut BitReader, progress: &mut UintProgress) -> Result<u128> {
    loop {
        if progress.bits == MAX_GROUPS * 7 {
            return Err(Error::IntegerOverflow);
        }
        let byte = reader.read_byte()?;
        progress.value |= u128::from(byte & 0x7F) << progress.bits;
        progress.bits += 7;
        if byte & 0x80 == 0 {
            let value = progress.value;
            *progress = UintProgress::default();
            return Ok(value);
        }
    }
}

/// Wie [`decode`], aber mit Zielbreite `u64`.
pub fn decode_u64(reader: &mut BitReader, progress: &mut UintProgress) -> Result<u64> {
    let value = decode(reader, progress)?;
    u64::try_from(value).map_err(|_| Error::IntegerOverflow)
}
