//! Binary encoding (EXI 7.1.1), restricted to fixed-width hexBinary fields.
//!
//! The length is represented as an Unsigned Integer (EXI 7.1.6) followed by
//! that many octets. Das Schema deklariert eine Maximallänge `n`; der Wert
//! wird rechtsbündig in `n` Bytes abgelegt, führende Bytes sind 0.

use crate::bitstream::{BitReader, BitWriter};
use crate::unsigned_integer::{self, UintProgress};
use crate::{Error, Result};

/// Fortschritt: Länge bereits gelesen oder nicht.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryProgress {
    length: Option<usize>,
    uint: UintProgress,
}

/// Encodes binary data as a length-prefixed sequence of octets (EXI 7.1.1).
pub fn encode(writer: &mut BitWriter, value: &[u8]) {
    unsigned_integer::encode(writer, value.len() as u64);
    writer.write_bytes(value);
}

/// Decodes a binary value into a right-aligned buffer of `max` bytes.
///
/// Die Octets werden erst gelesen, wenn alle im Fenster liegen; eine
/// Länge über `max` ist [`Error::BinaryTooLong`].
pub fn decode(reader: &mut BitReader, progress: &mut BinaryProgress, max: usize) -> Result<Vec<u8>> {
    let length = match progress.length {
        Some(length) => length,
        None => {
            let length = unsigned_integer::decode(reader, &mut progress.uint)?;
            let length = usize::try_from(length)
                .ok()
                .filter(|&l| l <= max)
                .ok_or(Error::BinaryTooLong {
                    length: u64::try_from(length).unwrap_or(u64::MAX),
                    max,
                })?;
            progress.length = Some(length);
            length
        }
    };
    reader.ensure_octets(length)?;
    let mut value = vec![0u8; max];
    for byte in &mut value[max - length..] {
        *byte = reader.read_byte()?;
    }
    progress.length = None;
    Ok(value)
}
