//! Signed integer encoding (EXI 7.1.5).
//!
//! IEEE 2030.5 verwendet nur den unbeschränkten Fall: 1-Bit Vorzeichen
//! gefolgt vom Betrag als Unsigned Integer (EXI 7.1.6). Für negative Werte
//! ist der Betrag `(-value - 1)`.
//!
//! Vorzeichen und Betrag sind zwei Teilschritte; [`SignedProgress`] merkt
//! sich, welcher aussteht, damit eine Unterbrechung nach dem Vorzeichenbit
//! das Bit nicht erneut liest.

use crate::bitstream::{BitReader, BitWriter};
use crate::unsigned_integer::{self, UintProgress};
use crate::{Error, Result};

/// Ausstehender Teilschritt eines Signed Integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SignStep {
    #[default]
    Sign,
    Magnitude { negative: bool },
}

/// Fortschritt eines unterbrochenen Signed Integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignedProgress {
    step: SignStep,
    magnitude: UintProgress,
}

impl SignedProgress {
    /// `true` wenn kein Teilschritt aussteht.
    pub fn is_idle(&self) -> bool {
        self.step == SignStep::Sign && self.magnitude.is_idle()
    }
}

/// Encodes a signed integer (EXI 7.1.5, unbounded signed case).
pub fn encode(writer: &mut BitWriter, value: i64) {
    if value >= 0 {
        writer.write_bit(false);
        unsigned_integer::encode(writer, value as u64);
    } else {
        writer.write_bit(true);
        // (-value - 1) über unsigned Arithmetik, damit i64::MIN nicht überläuft
        unsigned_integer::encode(writer, !(value as u64));
    }
}

/// Decodes a signed integer (EXI 7.1.5), resuming from `progress`.
pub fn decode(reader: &mut BitReader, progress: &mut SignedProgress) -> Result<i64> {
    let negative = match progress.step {
        SignStep::Sign => {
            let negative = reader.read_bit()?;
            progress.step = SignStep::Magnitude { negative };
            negative
        }
        SignStep::Magnitude { negative } => negative,
    };
    let magnitude = unsigned_integer::decode(reader, &mut progress.magnitude)?;
    progress.step = SignStep::Sign;
    let magnitude = i64::try_from(magnitude).map_err(|_| Error::IntegerOverflow)?;
    Ok(if negative { -magnitude - 1 } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: i64) -> i64 {
        let mut w = BitWriter::new();
        encode(&mut w, value);
        let data = w.into_vec();
        let mut r = BitReader::new(&data);
        decode(&mut r, &mut SignedProgress::default()).unwrap()
    }

    /// EXI 7.1.5: encode/decode -1 — sign=1, magnitude=0
    #[test]
    fn signed_minus_one() {
        assert_eq!(round_trip(-1), -1);
        let mut w = BitWriter::new();
        encode(&mut w, -1);
        // bit layout: 1_0000000 0 = 0x80 0x00
        assert_eq!(w.into_vec(), vec![0x80, 0x00]);
    }

    #[test]
    fn signed_round_trip_diverse() {
        for &val in &[0, 1, -2, 127, -128, 1_700_000_000, i64::MAX, i64::MIN] {
            assert_eq!(round_trip(val), val, "failed for {val}");
        }
    }

    #[test]
    fn betrag_zu_gross() {
        let mut w = BitWriter::new();
        w.write_bit(false);
        unsigned_integer::encode(&mut w, u64::MAX);
        let data = w.into_vec();
        let mut r = BitReader::new(&data);
        assert_eq!(
            decode(&mut r, &mut SignedProgress::default()).unwrap_err(),
            Error::IntegerOverflow
        );
    }

    #[test]
    fn vorzeichen_wird_nicht_erneut_gelesen() {
        let mut w = BitWriter::new();
        encode(&mut w, -300);
        let data = w.into_vec();
        assert_eq!(data.len(), 3);

        // Vorzeichen + erste Gruppe passen nicht ganz in ein Byte
        let mut r = BitReader::new(&data[..1]);
        let mut progress = SignedProgress::default();
        assert_eq!(decode(&mut r, &mut progress).unwrap_err(), Error::NeedMoreData);
        assert!(!progress.is_idle());
        assert_eq!(r.bit_offset(), 1);
        r.rebuffer(&data[1..2]);
        assert_eq!(decode(&mut r, &mut progress).unwrap_err(), Error::NeedMoreData);
        r.rebuffer(&data[2..]);
        assert_eq!(decode(&mut r, &mut progress).unwrap(), -300);
        assert!(progress.is_idle());
    }
}
