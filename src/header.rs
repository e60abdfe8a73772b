//! EXI header and fixed IEEE 2030.5 options document (EXI 5, 5.4).
//!
//! IEEE 2030.5 verwendet genau ein Options-Dokument:
//!
//! ```text
//! <header xmlns="http://www.w3.org/2009/exi">
//!   <common><schemaId>S1</schemaId></common>
//! </header>
//! ```
//!
//! Der Header wird deshalb gegen ein festes Bitmuster verglichen statt
//! vollständig geparst:
//! - [EXI Cookie] (optional): `$EXI` (EXI 5.1)
//! - `0xA0`: Distinguishing Bits `10`, Options vorhanden `1`, Version 1 `00000`
//! - `001100`: header, common, schemaId, CH (Event Codes im Options-Dokument)
//! - schemaId als String-Literal
//! - `1`: EE
//!
//! # Beispiel
//!
//! ```
//! use sep2_parse::bitstream::{BitReader, BitWriter};
//! use sep2_parse::header;
//!
//! let mut w = BitWriter::new();
//! header::encode(&mut w, "S1", true);
//! let bytes = w.into_vec();
//! assert_eq!(&bytes[..5], b"$EXI\xa0");
//!
//! let mut r = BitReader::new(&bytes);
//! header::decode(&mut r, "S1", true).unwrap();
//! ```

use crate::bitstream::{BitReader, BitWriter};
use crate::unsigned_integer::{self, UintProgress};
use crate::{string, Error, Result};

/// EXI Cookie als ASCII-Bytes (EXI 5.1).
pub const EXI_COOKIE: [u8; 4] = *b"$EXI";

/// `10` Distinguishing Bits | `1` Options | `00000` Version 1.
const HEADER_BYTE: u8 = 0xA0;

/// Event Codes des Options-Dokuments bis zum schemaId-Inhalt.
const OPTIONS_PREFIX: u32 = 0b00_1100;

/// Encodiert Header und Options-Dokument für `schema_id`.
pub fn encode(writer: &mut BitWriter, schema_id: &str, cookie: bool) {
    if cookie {
        writer.write_bytes(&EXI_COOKIE);
    }
    writer.write_byte(HEADER_BYTE);
    writer.write_bits(OPTIONS_PREFIX, 6);
    string::encode_literal(writer, schema_id);
    writer.write_bit(true);
}

/// Prüft Header und Options-Dokument gegen `schema_id`.
///
/// Die Operation ist atomar: bei Starvation und bei Fehlern steht der
/// Cursor wieder am Anfang, es wird kein Byte konsumiert.
pub fn decode(reader: &mut BitReader, schema_id: &str, accept_cookie: bool) -> Result<()> {
    let checkpoint = reader.checkpoint();
    let result = decode_inner(reader, schema_id, accept_cookie);
    if result.is_err() {
        reader.restore(checkpoint);
    }
    result
}

fn decode_inner(reader: &mut BitReader, schema_id: &str, accept_cookie: bool) -> Result<()> {
    if accept_cookie && try_skip_cookie(reader)? {
        log::trace!("EXI cookie skipped");
    }
    if reader.read_byte()? != HEADER_BYTE {
        return Err(Error::MalformedHeader);
    }
    if reader.read_bits(6)? != OPTIONS_PREFIX {
        return Err(Error::MalformedHeader);
    }
    // Länge ist durch das feste Options-Dokument bestimmt
    let chars = schema_id.chars().count();
    let m = unsigned_integer::decode(reader, &mut UintProgress::default())?;
    if m != chars as u128 + 2 {
        return Err(Error::MalformedHeader);
    }
    let found = string::decode_literal(reader, chars, None)?;
    if found != schema_id {
        return Err(Error::SchemaIdMismatch {
            expected: schema_id.to_owned().into(),
            found,
        });
    }
    if !reader.read_bit()? {
        return Err(Error::MalformedHeader);
    }
    Ok(())
}

/// Überspringt `$EXI`, falls vorhanden.
///
/// Weniger als 4 Bytes, die ein Präfix des Cookies sind, sind Starvation.
fn try_skip_cookie(reader: &mut BitReader) -> Result<bool> {
    if let Some(bytes) = reader.peek_aligned(EXI_COOKIE.len()) {
        if bytes == EXI_COOKIE {
            reader.skip_aligned(EXI_COOKIE.len());
            return Ok(true);
        }
        return Ok(false);
    }
    let available = reader.peek_aligned(reader.remaining()).unwrap_or(&[]);
    if EXI_COOKIE.starts_with(available) {
        Err(Error::NeedMoreData)
    } else {
        Ok(false)
    }
}
