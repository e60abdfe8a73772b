//! XML backend.
//!
//! Ordnet die Tokens des [`Tokenizer`] den Schema-Einträgen per Name zu:
//! Attribute werden im zuletzt gelesenen Start-Tag nachgeschlagen,
//! Elemente über den nächsten Start-Tag. Ein Token, das an einer
//! Position nicht passt, bleibt stehen (`need_token == false`) und wird an
//! der nächsten Position erneut verglichen.

use crate::object::Value;
use crate::schema::{Schema, SchemaEntry, XsType};
use crate::tokenizer::{local_name, Token, Tokenizer, XmlTokenizer};
use crate::{Error, Result};

use super::{fit_signed, fit_unsigned, Content, Driver, Next, Repeat};

/// XML driver over a [`Tokenizer`].
#[derive(Debug)]
pub struct XmlDriver<'s, T = XmlTokenizer> {
    schema: &'s Schema,
    tokenizer: T,
    need_token: bool,
    token: Token,
    /// Das zuletzt gematchte Element ist ein Leer-Tag.
    empty: bool,
    xml_decl: bool,
    text: String,
}

impl<'s> XmlDriver<'s> {
    /// Neuer Driver über einer Kopie von `data`.
    pub fn new(schema: &'s Schema, data: &[u8]) -> Self {
        Self::with_tokenizer(schema, XmlTokenizer::new(data))
    }
}

impl<'s, T: Tokenizer> XmlDriver<'s, T> {
    /// Driver mit eigenem Tokenizer.
    pub fn with_tokenizer(schema: &'s Schema, tokenizer: T) -> Self {
        Self {
            schema,
            tokenizer,
            need_token: true,
            token: Token::Incomplete,
            empty: false,
            xml_decl: false,
            text: String::new(),
        }
    }

    /// Aktuelles Token, liest nur wenn nötig.
    fn token(&mut self) -> Result<Token> {
        if self.need_token {
            match self.tokenizer.next_token() {
                Token::Incomplete => return Err(Error::NeedMoreData),
                Token::Invalid => {
                    let msg = self.tokenizer.error().unwrap_or("malformed markup");
                    return Err(Error::XmlParseError(msg.to_owned()));
                }
                token => {
                    self.token = token;
                    self.need_token = false;
                }
            }
        }
        Ok(self.token)
    }

    /// Kurzform des aktuellen Tokens für Fehlermeldungen.
    fn describe(&self, token: Token) -> String {
        match token {
            Token::StartTag | Token::EmptyTag => format!("<{}>", self.tokenizer.name()),
            Token::EndTag => format!("</{}>", self.tokenizer.name()),
            Token::Text => "text".to_owned(),
            Token::XmlDecl => "XML declaration".to_owned(),
            Token::Incomplete | Token::Invalid => format!("{token:?}"),
        }
    }

    /// Passt der nächste Start-Tag zu `se`?
    fn start_tag(&mut self, se: usize) -> Result<bool> {
        let name = self.schema.se_name(se);
        let token = self.token()?;
        match token {
            Token::StartTag | Token::EmptyTag => {
                if self.empty {
                    return Err(Error::ordering_violation("end of empty element", self.describe(token)));
                }
                if self.tokenizer.name() != name {
                    return Ok(false);
                }
                self.empty = token == Token::EmptyTag;
                self.need_token = true;
                if self.empty && self.schema.entry(se).simple_type().is_some() {
                    return Err(Error::InvalidValue(format!("empty element '{name}'")));
                }
                log::trace!("<{name}>");
                Ok(true)
            }
            Token::EndTag => Ok(false),
            _ => Err(Error::ordering_violation(format!("<{name}>"), self.describe(token))),
        }
    }
}

impl<T: Tokenizer> Driver for XmlDriver<'_, T> {
    fn start(&mut self) -> Result<usize> {
        loop {
            let token = self.token()?;
            match token {
                Token::XmlDecl => {
                    if self.xml_decl {
                        log::warn!("second XML declaration");
                        return Err(Error::XmlParseError("duplicate XML declaration".to_owned()));
                    }
                    self.xml_decl = true;
                    self.need_token = true;
                }
                Token::StartTag | Token::EmptyTag => {
                    let name = self.tokenizer.name();
                    let global = self
                        .schema
                        .element_index(name)
                        .ok_or_else(|| Error::UnknownRootElement(name.to_owned()))?;
                    self.empty = token == Token::EmptyTag;
                    self.need_token = !self.empty;
                    return Ok(global);
                }
                _ => {
                    return Err(Error::ordering_violation("root element", self.describe(token)));
                }
            }
        }
    }

    fn next(&mut self, se: usize) -> Result<Next> {
        let schema = self.schema;
        let mut se = se;
        loop {
            let entry = schema.entry(se);
            if entry.is_end() {
                return Ok(Next::End);
            }
            let name = schema.se_name(se);
            if entry.attribute {
                if let Some(value) = self.tokenizer.attribute(name) {
                    self.text = value.to_owned();
                    return Ok(Next::Field(se));
                }
            } else if !self.empty && self.start_tag(se)? {
                return Ok(Next::Field(se));
            }
            if entry.min > 0 {
                return Err(Error::OccurrenceViolation {
                    name: name.into(),
                    count: 0,
                    min: entry.min,
                });
            }
            se += 1;
        }
    }

    fn xsi_type(&mut self, _first: usize) -> Result<Option<usize>> {
        let Some(value) = self.tokenizer.attribute("xsi:type") else {
            return Ok(None);
        };
        let name = local_name(value.trim());
        self.schema
            .type_by_name(name)
            .map(Some)
            .ok_or_else(|| Error::XsiTypeNotFound(name.to_owned().into()))
    }

    fn end(&mut self, se: usize) -> Result<()> {
        if self.empty {
            self.empty = false;
            return Ok(());
        }
        let name = self.schema.se_name(se);
        let token = self.token()?;
        if token == Token::EndTag && self.tokenizer.name() == name {
            self.need_token = true;
            return Ok(());
        }
        Err(Error::ordering_violation(format!("</{name}>"), self.describe(token)))
    }

    fn sequence(&mut self, se: usize, count: u32) -> Result<Repeat> {
        if self.start_tag(se)? {
            return Ok(Repeat::Again);
        }
        let entry = self.schema.entry(se);
        if count < u32::from(entry.min) {
            return Err(Error::OccurrenceViolation {
                name: self.schema.se_name(se).into(),
                count,
                min: entry.min,
            });
        }
        Ok(Repeat::Done)
    }

    fn value(&mut self, se: usize) -> Result<Content> {
        parse_text(self.schema.entry(se), &self.text)
    }

    fn simple(&mut self, se: usize) -> Result<Option<Content>> {
        let token = self.token()?;
        match token {
            Token::Text => {
                self.text = self.tokenizer.content().to_owned();
                self.need_token = true;
            }
            // leerer Inhalt, End-Tag bleibt für end()
            Token::EndTag => self.text.clear(),
            _ => {
                let name = self.schema.se_name(se);
                return Err(Error::ordering_violation(format!("content of <{name}>"), self.describe(token)));
            }
        }
        self.value(se).map(Some)
    }

    fn done(&mut self) {
        self.text.clear();
    }

    fn rebuffer(&mut self, data: &[u8]) {
        self.tokenizer.rebuffer(data);
    }
}

/// Wandelt Text in den Simple Type eines Eintrags.
pub fn parse_text(entry: &SchemaEntry, text: &str) -> Result<Content> {
    let Some(simple) = entry.simple_type() else {
        return Err(Error::InvalidValue("complex type has no text value".to_owned()));
    };
    let length = simple.length();
    let value = match simple.xs_type() {
        XsType::String => {
            // Kapazität inkl. Terminator
            if length > 0 && text.len() > length - 1 {
                return Err(Error::StringTooLong {
                    length: text.len(),
                    capacity: length,
                });
            }
            Value::String(text.to_owned())
        }
        XsType::AnyUri => Value::String(text.to_owned()),
        XsType::Boolean => {
            return match text.trim() {
                "true" | "1" => Ok(Content::Flag(true)),
                "false" | "0" => Ok(Content::Flag(false)),
                other => Err(Error::InvalidValue(format!("'{other}' is not a boolean"))),
            };
        }
        XsType::HexBinary => Value::Binary(parse_hex(text, length)?),
        xs @ (XsType::Long | XsType::Int | XsType::Short | XsType::Byte) => {
            let value = text
                .trim()
                .parse::<i64>()
                .map_err(|e| Error::InvalidValue(format!("'{text}': {e}")))?;
            fit_signed(xs, value)?
        }
        xs @ (XsType::ULong | XsType::UInt | XsType::UShort | XsType::UByte) => {
            let value = text
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::InvalidValue(format!("'{text}': {e}")))?;
            fit_unsigned(xs, value)?
        }
        XsType::Null => return Err(Error::InvalidValue("null type has no content".to_owned())),
    };
    Ok(Content::Value(value))
}

/// Hex-Ziffern rechtsbündig in `max` Bytes.
fn parse_hex(text: &str, max: usize) -> Result<Vec<u8>> {
    let digits = text.trim();
    if digits.is_empty() || digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidValue(format!("'{digits}' is not hexBinary")));
    }
    let length = digits.len() / 2;
    if length > max {
        return Err(Error::BinaryTooLong {
            length: length as u64,
            max,
        });
    }
    let mut value = vec![0u8; max];
    for (byte, pair) in value[max - length..].iter_mut().zip(digits.as_bytes().chunks(2)) {
        *byte = (hex_digit(pair[0]) << 4) | hex_digit(pair[1]);
    }
    Ok(value)
}

fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{self, SCHEMA};

    fn driver(xml: &str) -> XmlDriver<'static> {
        XmlDriver::new(&SCHEMA, xml.as_bytes())
    }

    #[test]
    fn start_mit_deklaration() {
        let mut d = driver("<?xml version=\"1.0\"?><Time href=\"/tm\">");
        assert_eq!(d.start().unwrap(), 4);
        // Attribute des Wurzel-Tags
        assert_eq!(d.next(sample::TIME + 1).unwrap(), Next::Field(sample::TIME + 1));
        assert_eq!(d.value(sample::TIME + 1).unwrap(), Content::Value(Value::String("/tm".to_owned())));
    }

    #[test]
    fn doppelte_deklaration() {
        let mut d = driver("<?xml version=\"1.0\"?><?xml version=\"1.0\"?><Time>");
        assert!(matches!(d.start().unwrap_err(), Error::XmlParseError(_)));
    }

    #[test]
    fn unbekannte_wurzel() {
        let mut d = driver("<Foo>");
        assert_eq!(d.start().unwrap_err(), Error::UnknownRootElement("Foo".to_owned()));
    }

    #[test]
    fn unvollstaendig() {
        let mut d = driver("<Ti");
        assert_eq!(d.start().unwrap_err(), Error::NeedMoreData);
        d.rebuffer(b"me>");
        assert_eq!(d.start().unwrap(), 4);
    }

    #[test]
    fn optionale_felder_werden_uebersprungen() {
        // EndDevice ohne @href, changedTime ist das erste Element
        let mut d = driver("<EndDevice><changedTime>0</changedTime>");
        d.start().unwrap();
        let e = sample::END_DEVICE;
        assert_eq!(d.next(e + 1).unwrap(), Next::Field(e + 2));
        assert_eq!(d.simple(e + 2).unwrap(), Some(Content::Value(Value::Signed(0))));
        d.end(e + 2).unwrap();
    }

    #[test]
    fn pflichtfeld_fehlt() {
        let mut d = driver("<EndDevice><mfModel>x</mfModel>");
        d.start().unwrap();
        let err = d.next(sample::END_DEVICE + 1).unwrap_err();
        assert_eq!(
            err,
            Error::OccurrenceViolation {
                name: "changedTime".into(),
                count: 0,
                min: 1
            }
        );
    }

    #[test]
    fn leeres_simple_element() {
        let mut d = driver("<EndDevice><changedTime/>");
        d.start().unwrap();
        assert!(matches!(d.next(sample::END_DEVICE + 1).unwrap_err(), Error::InvalidValue(_)));
    }

    #[test]
    fn falscher_end_tag() {
        let mut d = driver("<EndDevice><changedTime>1</sFDI>");
        d.start().unwrap();
        let e = sample::END_DEVICE;
        d.next(e + 1).unwrap();
        d.simple(e + 2).unwrap();
        assert!(matches!(d.end(e + 2).unwrap_err(), Error::OrderingViolation { .. }));
    }

    #[test]
    fn xsi_type_attribut() {
        let mut d = driver(r#"<Notification><Resource xsi:type="sep:EndDevice">"#);
        d.start().unwrap();
        // Substitutions-Slot Resource
        let slot = sample::NOTIFICATION + 3;
        assert_eq!(d.next(slot).unwrap(), Next::Field(slot));
        assert_eq!(d.xsi_type(sample::RESOURCE + 1).unwrap(), Some(sample::END_DEVICE));
    }

    #[test]
    fn xsi_type_unbekannt() {
        let mut d = driver(r#"<Notification xsi:type="Meter">"#);
        d.start().unwrap();
        assert_eq!(
            d.xsi_type(sample::NOTIFICATION + 1).unwrap_err(),
            Error::XsiTypeNotFound("Meter".into())
        );
    }

    #[test]
    fn text_werte() {
        let e = sample::END_DEVICE;
        assert_eq!(parse_text(SCHEMA.entry(e + 3), "1").unwrap(), Content::Flag(true));
        assert_eq!(parse_text(SCHEMA.entry(e + 3), "false").unwrap(), Content::Flag(false));
        assert!(parse_text(SCHEMA.entry(e + 3), "yes").is_err());
        assert_eq!(
            parse_text(SCHEMA.entry(e + 2), " -42 ").unwrap(),
            Content::Value(Value::Signed(-42))
        );
        assert!(parse_text(SCHEMA.entry(e + 6), "-1").is_err());
        assert_eq!(
            parse_text(SCHEMA.entry(sample::TIME + 5), "256").unwrap_err(),
            Error::IntegerOverflow
        );
        assert_eq!(
            parse_text(SCHEMA.entry(sample::TIME + 3), "2147483648").unwrap_err(),
            Error::IntegerOverflow
        );
    }

    #[test]
    fn text_kapazitaet() {
        let model = SCHEMA.entry(sample::END_DEVICE + 5);
        assert!(parse_text(model, &"a".repeat(31)).is_ok());
        assert_eq!(
            parse_text(model, &"a".repeat(32)).unwrap_err(),
            Error::StringTooLong { length: 32, capacity: 32 }
        );
    }

    #[test]
    fn hex_rechtsbuendig() {
        assert_eq!(parse_hex("0aFF", 4).unwrap(), vec![0, 0, 0x0A, 0xFF]);
        assert!(parse_hex("abc", 4).is_err());
        assert!(parse_hex("", 4).is_err());
        assert!(parse_hex("zz", 4).is_err());
        assert_eq!(
            parse_hex("0102030405", 4).unwrap_err(),
            Error::BinaryTooLong { length: 5, max: 4 }
        );
    }
}
