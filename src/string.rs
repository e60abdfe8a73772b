//! String values (EXI 7.1.10, 7.3.3).
//!
//! Ein String-Wert beginnt mit einem Unsigned Integer:
//! - `0`: Compact ID in der feldlokalen Tabelle
//! - `1`: Compact ID in der globalen Tabelle
//! - `m >= 2`: Literal aus `m - 2` Code Points, jeder als Unsigned Integer
//!
//! Ein Code Point belegt höchstens 21 Bits, also höchstens 3 Gruppen.
//! Literale werden zuerst vorab gescannt (UTF-8-Länge, Vollständigkeit)
//! und erst danach gelesen; der Scan setzt den Cursor immer zurück.

use crate::bit_width;
use crate::bitstream::{BitReader, BitWriter};
use crate::unsigned_integer;
use crate::{Error, Result};

/// Maximale Gruppen pro Code Point.
const MAX_CODE_POINT_GROUPS: u8 = 3;

/// Liest einen Code Point (max. 3 Gruppen) ohne Fortschrittsregister.
fn read_code_point(reader: &mut BitReader) -> Result<char> {
    let mut cp = 0u32;
    let mut shift = 0u32;
    for _ in 0..MAX_CODE_POINT_GROUPS {
        let byte = reader.read_byte()?;
        cp |= u32::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return char::from_u32(cp).ok_or(Error::InvalidCodePoint(u64::from(cp)));
        }
    }
    Err(Error::OversizedCodePoint)
}

/// Vorab-Scan: UTF-8-Länge eines Literals aus `chars` Code Points.
///
/// Der Cursor steht danach immer wieder am Anfang des Literals, auch bei
/// [`Error::NeedMoreData`]. Ungültige Code Points werden sofort gemeldet.
pub fn literal_len(reader: &mut BitReader, chars: usize) -> Result<usize> {
    let checkpoint = reader.checkpoint();
    let mut len = 0usize;
    let mut scan = || -> Result<()> {
        for _ in 0..chars {
            len += read_code_point(reader)?.len_utf8();
        }
        Ok(())
    };
    let result = scan();
    reader.restore(checkpoint);
    result.map(|()| len)
}

/// Decodes a literal of `chars` code points.
///
/// Mit `capacity` (fester Container inkl. Terminator) muss die UTF-8-Länge
/// kleiner als die Kapazität sein. Bei Starvation wird nichts konsumiert.
pub fn decode_literal(reader: &mut BitReader, chars: usize, capacity: Option<usize>) -> Result<String> {
    let len = literal_len(reader, chars)?;
    if let Some(capacity) = capacity {
        if len >= capacity {
            return Err(Error::StringTooLong { length: len, capacity });
        }
    }
    let mut s = String::with_capacity(len);
    for _ in 0..chars {
        s.push(read_code_point(reader)?);
    }
    Ok(s)
}

/// Liest eine Compact ID für eine Tabelle mit `size` Einträgen (EXI 7.3.3).
///
/// Eine leere Tabelle hat keine gültige ID.
pub fn decode_compact_id(reader: &mut BitReader, size: usize) -> Result<usize> {
    if size == 0 {
        return Err(Error::InvalidCompactId { id: 0, size });
    }
    let id = reader.read_bits(bit_width::for_count(size))?;
    if id as usize >= size {
        return Err(Error::InvalidCompactId { id, size });
    }
    Ok(id as usize)
}

/// Encodes a string literal (`m = chars + 2`).
pub fn encode_literal(writer: &mut BitWriter, value: &str) {
    unsigned_integer::encode(writer, value.chars().count() as u64 + 2);
    for ch in value.chars() {
        unsigned_integer::encode(writer, ch as u32);
    }
}

/// Encodes a local (`0`) or global (`1`) compact id hit.
pub fn encode_compact_id(writer: &mut BitWriter, global: bool, id: usize, size: usize) {
    unsigned_integer::encode(writer, u8::from(global));
    writer.write_bits(id as u32, bit_width::for_count(size));
}
