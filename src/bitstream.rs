//! Bit-level stream reader and writer for EXI encoding.
//!
//! EXI uses MSB-first bit packing (EXI 7.1). Bits within each byte are
//! numbered 7 (most significant, written/read first) down to 0.
//!
//! Der [`BitReader`] ist auf unterbrechbares Decoding ausgelegt: jede
//! Leseoperation prüft vorab, wie viele ganze Bytes sie braucht, und
//! verändert den Cursor nicht, wenn diese fehlen ([`Error::NeedMoreData`]).
//! Damit wird nie ein halb gelesenes Byte committed.

use crate::{Error, Result};

/// Reads bits from an owned input window, MSB first (EXI 7.1).
///
/// `pos` zeigt auf das aktuelle (ggf. teilweise gelesene) Byte, `bit` ist
/// der Offset innerhalb dieses Bytes (0..=7). Bereits gelesene Bytes werden
/// bei [`BitReader::rebuffer`] verworfen, alle Cursor sind relativ zur
/// aktuellen Fensterbasis.
#[derive(Debug, Clone, Default)]
pub struct BitReader {
    data: Vec<u8>,
    /// Aktuelles Byte in `data`.
    pos: usize,
    /// Bit-Offset im aktuellen Byte (0..=7).
    bit: u8,
    /// Anzahl Bytes, die durch `rebuffer` vor der Fensterbasis verworfen wurden.
    base: usize,
}

/// Checkpoint für BitReader-Rollback (Literal-Vorab-Scan, Header-Vergleich).
///
/// Nur innerhalb einer Operation gültig; ein `rebuffer` dazwischen
/// verschiebt die Fensterbasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitReaderCheckpoint {
    pos: usize,
    bit: u8,
}

impl BitReader {
    /// Creates a new `BitReader` over a copy of the given bytes.
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            bit: 0,
            base: 0,
        }
    }

    /// Hängt weitere Bytes an und verwirft vollständig gelesene Bytes.
    ///
    /// Ein teilweise gelesenes Byte bleibt erhalten, der Bit-Offset auch.
    pub fn rebuffer(&mut self, more: &[u8]) {
        if self.pos > 0 {
            self.data.drain(..self.pos);
            self.base += self.pos;
            self.pos = 0;
        }
        self.data.extend_from_slice(more);
    }

    /// Anzahl noch nicht vollständig gelesener Bytes im Fenster.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Bit-Offset im aktuellen Byte.
    #[inline]
    pub fn bit_offset(&self) -> u8 {
        self.bit
    }

    /// `true` wenn der Cursor auf einer Bytegrenze steht.
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.bit == 0
    }

    /// Insgesamt gelesene Bits seit Beginn des Streams.
    pub fn consumed_bits(&self) -> usize {
        (self.base + self.pos) * 8 + self.bit as usize
    }

    /// Not-enough-bytes guard: `n` ganze Bytes ab `pos` müssen vorhanden sein.
    #[inline]
    fn need(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            Err(Error::NeedMoreData)
        } else {
            Ok(())
        }
    }

    /// Prüft, ob `n` Octets ab der aktuellen Bitposition gelesen werden können.
    ///
    /// Unaligned überspannen `n` Octets `n + 1` Bytes im Fenster.
    pub fn ensure_octets(&self, n: usize) -> Result<()> {
        match n {
            0 => Ok(()),
            _ if self.bit == 0 => self.need(n),
            _ => self.need(n + 1),
        }
    }

    /// Liest die nächsten 8 Bits, unabhängig vom Alignment.
    ///
    /// Unaligned werden Rest des aktuellen und Anfang des nächsten Bytes
    /// kombiniert; dafür müssen beide vorhanden sein.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.bit == 0 {
            self.need(1)?;
            let b = self.data[self.pos];
            self.pos += 1;
            Ok(b)
        } else {
            self.need(2)?;
            let b = (self.data[self.pos] << self.bit) | (self.data[self.pos + 1] >> (8 - self.bit));
            self.pos += 1;
            Ok(b)
        }
    }

    /// Reads a single bit. Returns `true` for 1, `false` for 0.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        self.need(1)?;
        let val = (self.data[self.pos] >> (7 - self.bit)) & 1 != 0;
        self.bit += 1;
        if self.bit == 8 {
            self.pos += 1;
            self.bit = 0;
        }
        Ok(val)
    }

    /// Reads `n` bits (`n <= 32`) and returns them MSB first.
    /// When `n` is 0 this is a no-op returning 0.
    ///
    /// # Panics
    ///
    /// Panics if `n > 32`.
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        assert!(n <= 32, "bit count must be 0..=32, got {n}");
        if n == 0 {
            return Ok(0);
        }
        let total = self.bit as usize + n as usize;
        let span = total.div_ceil(8);
        self.need(span)?;
        // span <= 5, passt in einen u64-Akkumulator
        let acc = self.data[self.pos..self.pos + span]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        let shift = span * 8 - total;
        let val = (acc >> shift) & ((1u64 << n) - 1);
        self.pos += total >> 3;
        self.bit = (total & 7) as u8;
        Ok(val as u32)
    }

    /// Liefert die nächsten `len` Bytes ohne zu lesen, nur wenn byte-aligned.
    pub fn peek_aligned(&self, len: usize) -> Option<&[u8]> {
        if self.bit != 0 || self.remaining() < len {
            return None;
        }
        Some(&self.data[self.pos..self.pos + len])
    }

    /// Überspringt `len` Bytes. Nur nach erfolgreichem [`BitReader::peek_aligned`].
    pub fn skip_aligned(&mut self, len: usize) {
        debug_assert!(self.bit == 0 && self.remaining() >= len);
        self.pos += len;
    }

    /// Speichert die aktuelle Leseposition.
    #[inline]
    pub fn checkpoint(&self) -> BitReaderCheckpoint {
        BitReaderCheckpoint {
            pos: self.pos,
            bit: self.bit,
        }
    }

    /// Setzt die Leseposition auf einen Checkpoint zurück.
    #[inline]
    pub fn restore(&mut self, checkpoint: BitReaderCheckpoint) {
        self.pos = checkpoint.pos;
        self.bit = checkpoint.bit;
    }
}

/// Writes individual bits into a growable byte buffer, MSB first (EXI 7.1).
///
/// Gegenstück zum [`BitReader`]; wird für Testvektoren und Fixtures
/// verwendet. Bits werden in `accum` gesammelt und als volle Bytes geflusht.
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    /// Akkumulator: enthält die nächsten `accum_bits` Bits (MSB = ältestes Bit).
    accum: u64,
    /// Anzahl gültiger Bits im Akkumulator (0..7 nach Flush).
    accum_bits: u8,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn flush_to_buf(&mut self) {
        while self.accum_bits >= 8 {
            self.accum_bits -= 8;
            self.buf.push((self.accum >> self.accum_bits) as u8);
        }
        self.accum &= (1u64 << self.accum_bits) - 1;
    }

    /// Writes a single bit. `true` = 1, `false` = 0.
    pub fn write_bit(&mut self, val: bool) {
        self.write_bits(u32::from(val), 1);
    }

    /// Writes the lower `n` bits of `val` (`n <= 32`), MSB first.
    ///
    /// # Panics
    ///
    /// Panics if `n > 32`.
    pub fn write_bits(&mut self, val: u32, n: u8) {
        assert!(n <= 32, "bit count must be 0..=32, got {n}");
        if n == 0 {
            return;
        }
        // accum_bits < 8 nach jedem Flush, n <= 32 → passt in u64
        self.accum = (self.accum << n) | (u64::from(val) & ((1u64 << n) - 1));
        self.accum_bits += n;
        self.flush_to_buf();
    }

    /// Writes 8 bits, regardless of alignment.
    pub fn write_byte(&mut self, val: u8) {
        self.write_bits(u32::from(val), 8);
    }

    /// Writes a byte slice.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.accum_bits == 0 {
            self.buf.extend_from_slice(bytes);
        } else {
            for &b in bytes {
                self.write_byte(b);
            }
        }
    }

    /// Returns the current bit position (number of bits written so far).
    pub fn bit_position(&self) -> usize {
        self.buf.len() * 8 + self.accum_bits as usize
    }

    /// Finalises the writer, padding the last byte with zero bits, and returns the buffer.
    pub fn into_vec(mut self) -> Vec<u8> {
        if self.accum_bits > 0 {
            self.buf.push((self.accum << (8 - self.accum_bits)) as u8);
        }
        self.buf
    }
}
