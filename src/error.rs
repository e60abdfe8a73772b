//! Central error types for the IEEE 2030.5 EXI/XML decoder.
//!
//! Es gibt genau zwei Klassen: [`Error::NeedMoreData`] (Starvation, immer
//! behebbar durch weitere Bytes) und alle übrigen Varianten (malformed input,
//! der Parser geht in den terminalen Invalid-Zustand).

use core::fmt;
use std::borrow::Cow;

/// All errors reported by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Nicht genug gepufferte Bytes; nach `rebuffer()` dieselbe Operation erneut aufrufen.
    NeedMoreData,
    /// Der Parser ist bereits im Invalid-Zustand, jeder weitere Aufruf ist ein No-Op.
    ParserInvalid,
    /// EXI header or options document does not match the IEEE 2030.5 profile (EXI 5, 5.4).
    MalformedHeader,
    /// The schemaId of the options document differs from the compiled schema.
    SchemaIdMismatch {
        /// Erwartete schemaId aus dem Schema.
        expected: Cow<'static, str>,
        /// Gefundene schemaId im Stream.
        found: String,
    },
    /// The root element is not a global element of the schema.
    UnknownRootElement(String),
    /// An event code selects no alternative at the current grammar position (EXI 6.2).
    InvalidEventCode {
        /// Der decodierte Code.
        code: u32,
        /// Anzahl der Alternativen an dieser Position.
        alternatives: u32,
    },
    /// A field occurs fewer or more often than its schema entry allows.
    OccurrenceViolation {
        /// Feldname.
        name: Cow<'static, str>,
        /// Gesehene Vorkommen.
        count: u32,
        /// Minimum laut Schema.
        min: u8,
    },
    /// Input does not follow the order of the schema grammar.
    OrderingViolation {
        /// Was erwartet wurde.
        expected: Cow<'static, str>,
        /// Was gefunden wurde.
        found: Cow<'static, str>,
    },
    /// A compact identifier is beyond the current population of its string table (EXI 7.3).
    InvalidCompactId {
        /// Decodierte ID.
        id: u32,
        /// Aktuelle Größe der Tabelle.
        size: usize,
    },
    /// A string does not fit into its fixed-capacity field.
    StringTooLong {
        /// Benötigte Länge in Bytes.
        length: usize,
        /// Kapazität des Felds (inkl. Terminator).
        capacity: usize,
    },
    /// A binary value is longer than the declared maximum length.
    BinaryTooLong {
        /// Länge aus dem Stream.
        length: u64,
        /// Deklarierte Maximallänge.
        max: usize,
    },
    /// An unsigned integer uses more than 10 groups or exceeds its target width (EXI 7.1.6).
    IntegerOverflow,
    /// A Unicode code point is a surrogate or larger than U+10FFFF (EXI 7.1.10).
    InvalidCodePoint(u64),
    /// A code point of a string literal needs more than 3 octets (EXI 7.1.10).
    OversizedCodePoint,
    /// xsi:type names no type of the schema.
    XsiTypeNotFound(Cow<'static, str>),
    /// xsi:type names a type not derived from the declared field type.
    XsiTypeNotDerived {
        /// Per xsi:type angegebener Typ.
        type_name: Cow<'static, str>,
        /// Statisch deklarierter Typ des Felds.
        base_name: Cow<'static, str>,
    },
    /// The xsi:type sub-protocol deviated from the fixed target namespace encoding.
    InvalidXsiType,
    /// A textual value could not be converted to the declared simple type.
    InvalidValue(String),
    /// The XML tokenizer reported malformed markup.
    XmlParseError(String),
    /// Nested records exceed the configured maximum depth.
    NestingTooDeep(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeedMoreData => write!(f, "need more data"),
            Self::ParserInvalid => write!(f, "parser is in the invalid state"),
            Self::MalformedHeader => write!(f, "malformed EXI header or options document (EXI 5)"),
            Self::SchemaIdMismatch { expected, found } => {
                write!(f, "schemaId mismatch: expected '{expected}', found '{found}'")
            }
            Self::UnknownRootElement(name) => write!(f, "unknown root element '{name}'"),
            Self::InvalidEventCode { code, alternatives } => {
                write!(f, "invalid event code {code} for {alternatives} alternatives (EXI 6.2)")
            }
            Self::OccurrenceViolation { name, count, min } => {
                write!(f, "'{name}' occurs {count} times, minimum is {min}")
            }
            Self::OrderingViolation { expected, found } => {
                if expected.is_empty() && found.is_empty() {
                    write!(f, "ordering violation")
                } else {
                    write!(f, "ordering violation: expected '{expected}', found '{found}'")
                }
            }
            Self::InvalidCompactId { id, size } => {
                write!(f, "compact identifier {id} out of range 0..{size} (EXI 7.3)")
            }
            Self::StringTooLong { length, capacity } => {
                write!(f, "string of {length} bytes exceeds fixed capacity {capacity}")
            }
            Self::BinaryTooLong { length, max } => {
                write!(f, "binary length {length} exceeds declared maximum {max}")
            }
            Self::IntegerOverflow => write!(f, "integer overflow (EXI 7.1.5, 7.1.6)"),
            Self::InvalidCodePoint(cp) => write!(f, "invalid Unicode code point U+{cp:X} (EXI 7.1.10)"),
            Self::OversizedCodePoint => write!(f, "code point needs more than 3 octets (EXI 7.1.10)"),
            Self::XsiTypeNotFound(name) => write!(f, "xsi:type '{name}' not found in schema"),
            Self::XsiTypeNotDerived { type_name, base_name } => {
                write!(f, "xsi:type '{type_name}' is not derived from '{base_name}'")
            }
            Self::InvalidXsiType => write!(f, "invalid xsi:type encoding"),
            Self::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
            Self::XmlParseError(msg) => write!(f, "XML parse error: {msg}"),
            Self::NestingTooDeep(depth) => write!(f, "nesting deeper than {depth} levels"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// `true` wenn der Fehler nur fehlende Bytes meldet (Starvation).
    #[inline]
    pub fn is_starvation(&self) -> bool {
        matches!(self, Self::NeedMoreData)
    }

    /// Erstellt einen `OrderingViolation` Fehler mit Kontext.
    pub fn ordering_violation(
        expected: impl Into<Cow<'static, str>>,
        found: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::OrderingViolation {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starvation_ist_eigene_klasse() {
        assert!(Error::NeedMoreData.is_starvation());
        assert!(!Error::MalformedHeader.is_starvation());
        assert!(!Error::ParserInvalid.is_starvation());
        assert!(!Error::IntegerOverflow.is_starvation());
    }

    #[test]
    fn invalid_event_code_display() {
        let msg = Error::InvalidEventCode { code: 3, alternatives: 2 }.to_string();
        assert!(msg.contains('3'), "{msg}");
        assert!(msg.contains("6.2"), "{msg}");
    }

    #[test]
    fn ordering_violation_display() {
        let e = Error::ordering_violation("", "");
        assert_eq!(e.to_string(), "ordering violation");
        let e = Error::ordering_violation("</Time>", "<quality>");
        let msg = e.to_string();
        assert!(msg.contains("</Time>"), "{msg}");
        assert!(msg.contains("<quality>"), "{msg}");
    }

    #[test]
    fn compact_id_display() {
        let msg = Error::InvalidCompactId { id: 4, size: 2 }.to_string();
        assert!(msg.contains("0..2"), "{msg}");
    }

    #[test]
    fn code_point_display() {
        assert!(Error::InvalidCodePoint(0xD800).to_string().contains("D800"));
    }
}
