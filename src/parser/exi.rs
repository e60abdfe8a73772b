//! EXI backend (schema-informed, IEEE 2030.5 options).
//!
//! Event Codes an einer Position `se` haben `for_value(n)` Bits, wobei
//! `n = 1` für den Sentinel und für Felder unter ihrem Minimum gilt,
//! sonst `n` des Eintrags. Der Code `n` selbst ist die Erweiterung
//! (zweite Ebene, z.B. `xsi:type`).
//!
//! Ein gelesener Code, der erst an einer späteren Position ausgewertet
//! wird (nach `sequence` oder einem `xsi_type` ohne Erweiterung), bleibt
//! in `token` stehen; `need_token` zeigt an, ob ein neuer gelesen wird.

use crate::binary::{self, BinaryProgress};
use crate::bit_width;
use crate::bitstream::BitReader;
use crate::header;
use crate::integer::{self, SignedProgress};
use crate::object::Value;
use crate::options::ParserOptions;
use crate::schema::{Schema, XsType};
use crate::string;
use crate::string_table::StringTables;
use crate::unsigned_integer::{self, UintProgress};
use crate::{Error, Result};

use super::{fit_signed, fit_unsigned, Content, Driver, Next, Repeat};

/// Namespace-ID des Target Namespace in der URI-Partition.
const TARGET_NAMESPACE_ID: u32 = 5;

/// Teilschritte von `xsi:type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum XsiStep {
    #[default]
    EventCode,
    Marker,
    Namespace,
    CompactId,
    LocalName,
}

/// Teilschritte eines Simple-Type Inhalts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ContentStep {
    #[default]
    Ch,
    Content,
    Empty,
}

/// Teilschritte eines String-Werts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum StringStep {
    #[default]
    Encoding,
    Value(u128),
}

/// EXI driver over an owned bit window.
#[derive(Debug)]
pub struct ExiDriver<'s> {
    schema: &'s Schema,
    reader: BitReader,
    tables: StringTables,
    accept_cookie: bool,
    need_token: bool,
    token: u32,
    xsi: XsiStep,
    content: ContentStep,
    string: StringStep,
    uint: UintProgress,
    signed: SignedProgress,
    binary: BinaryProgress,
}

impl<'s> ExiDriver<'s> {
    /// Neuer Driver über einer Kopie von `data`.
    pub fn new(schema: &'s Schema, data: &[u8], options: &ParserOptions) -> Self {
        Self {
            schema,
            reader: BitReader::new(data),
            tables: StringTables::new(options.local_table_capacity(), options.global_table_capacity()),
            accept_cookie: options.accept_cookie(),
            need_token: true,
            token: 0,
            xsi: XsiStep::default(),
            content: ContentStep::default(),
            string: StringStep::default(),
            uint: UintProgress::default(),
            signed: SignedProgress::default(),
            binary: BinaryProgress::default(),
        }
    }

    /// Die String-Tabellen des Dokuments.
    pub fn tables(&self) -> &StringTables {
        &self.tables
    }

    /// Bisher konsumierte Bits.
    pub fn consumed_bits(&self) -> usize {
        self.reader.consumed_bits()
    }

    /// Liest den Event Code an `se` (oder nimmt den gespeicherten) und
    /// liefert ihn mit der Anzahl Alternativen.
    fn event(&mut self, se: usize, count: u32) -> Result<(u32, u32)> {
        let entry = self.schema.entry(se);
        let n = if entry.is_end() || count < u32::from(entry.min) {
            1
        } else {
            u32::from(entry.n)
        };
        if self.need_token {
            self.token = self.reader.read_bits(bit_width::for_value(n))?;
            self.need_token = false;
        }
        Ok((self.token, n))
    }

    fn string(&mut self, se: usize, capacity: Option<usize>) -> Result<String> {
        let name = self.schema.se_name(se);
        let selector = match self.string {
            StringStep::Encoding => {
                let selector = unsigned_integer::decode(&mut self.reader, &mut self.uint)?;
                self.string = StringStep::Value(selector);
                selector
            }
            StringStep::Value(selector) => selector,
        };
        let value = match selector {
            0 => {
                let size = self.tables.local_len(name);
                let id = string::decode_compact_id(&mut self.reader, size)?;
                let hit = self.tables.local(name, id).ok_or(Error::InvalidCompactId { id: id as u32, size })?;
                check_capacity(hit, capacity)?;
                hit.to_owned()
            }
            1 => {
                let size = self.tables.global_len();
                let id = string::decode_compact_id(&mut self.reader, size)?;
                let hit = self.tables.global(id).ok_or(Error::InvalidCompactId { id: id as u32, size })?;
                check_capacity(hit, capacity)?;
                hit.to_owned()
            }
            m => {
                let chars = usize::try_from(m - 2).map_err(|_| Error::IntegerOverflow)?;
                let literal = string::decode_literal(&mut self.reader, chars, capacity)?;
                self.tables.add(name, &literal);
                literal
            }
        };
        self.string = StringStep::Encoding;
        Ok(value)
    }

    fn signed(&mut self, xs: XsType) -> Result<Value> {
        let value = integer::decode(&mut self.reader, &mut self.signed)?;
        fit_signed(xs, value)
    }

    fn unsigned(&mut self, xs: XsType) -> Result<Value> {
        let value = unsigned_integer::decode_u64(&mut self.reader, &mut self.uint)?;
        fit_unsigned(xs, value)
    }
}

/// Compact-ID Treffer müssen in einen festen Container passen.
fn check_capacity(value: &str, capacity: Option<usize>) -> Result<()> {
    match capacity {
        Some(capacity) if value.len() >= capacity => Err(Error::StringTooLong {
            length: value.len(),
            capacity,
        }),
        _ => Ok(()),
    }
}

impl Driver for ExiDriver<'_> {
    fn start(&mut self) -> Result<usize> {
        let checkpoint = self.reader.checkpoint();
        let result = header::decode(&mut self.reader, self.schema.schema_id, self.accept_cookie).and_then(|()| {
            let width = bit_width::for_value(self.schema.length as u32);
            let global = self.reader.read_bits(width)? as usize;
            if global < self.schema.length {
                Ok(global)
            } else {
                Err(Error::UnknownRootElement(format!("global element #{global}")))
            }
        });
        if result.is_err() {
            self.reader.restore(checkpoint);
        } else {
            self.need_token = true;
        }
        result
    }

    fn next(&mut self, se: usize) -> Result<Next> {
        if self.schema.entry(se).is_end() {
            return Ok(Next::End);
        }
        let (token, n) = self.event(se, 0)?;
        if token >= n {
            return Err(Error::InvalidEventCode { code: token, alternatives: n });
        }
        let target = se + token as usize;
        if self.schema.entry(target).is_end() {
            return Ok(Next::End);
        }
        self.need_token = true;
        Ok(Next::Field(target))
    }

    fn xsi_type(&mut self, first: usize) -> Result<Option<usize>> {
        loop {
            match self.xsi {
                XsiStep::EventCode => {
                    let (token, n) = self.event(first, 0)?;
                    if token < n {
                        return Ok(None);
                    }
                    if token > n {
                        return Err(Error::InvalidEventCode { code: token, alternatives: n });
                    }
                    self.xsi = XsiStep::Marker;
                }
                XsiStep::Marker => {
                    if self.reader.read_bits(3)? != 0 {
                        return Err(Error::InvalidXsiType);
                    }
                    self.xsi = XsiStep::Namespace;
                }
                XsiStep::Namespace => {
                    if self.reader.read_bits(3)? != TARGET_NAMESPACE_ID {
                        return Err(Error::InvalidXsiType);
                    }
                    self.xsi = XsiStep::CompactId;
                }
                XsiStep::CompactId => {
                    if unsigned_integer::decode(&mut self.reader, &mut self.uint)? != 0 {
                        return Err(Error::InvalidXsiType);
                    }
                    self.xsi = XsiStep::LocalName;
                }
                XsiStep::LocalName => {
                    let width = bit_width::for_value(self.schema.count() as u32);
                    let index = self.reader.read_bits(width)? as usize;
                    let ty = match self.schema.types.get(index) {
                        Some(&ty) if ty != 0 => usize::from(ty),
                        _ => {
                            let name = self
                                .schema
                                .names
                                .get(index)
                                .map_or_else(|| format!("#{index}").into(), |&name| name.into());
                            return Err(Error::XsiTypeNotFound(name));
                        }
                    };
                    self.xsi = XsiStep::EventCode;
                    self.need_token = true;
                    return Ok(Some(ty));
                }
            }
        }
    }

    fn end(&mut self, _se: usize) -> Result<()> {
        if self.need_token {
            if self.reader.read_bit()? {
                return Err(Error::InvalidEventCode { code: 1, alternatives: 1 });
            }
        } else {
            self.need_token = true;
        }
        Ok(())
    }

    fn sequence(&mut self, se: usize, count: u32) -> Result<Repeat> {
        let (token, n) = self.event(se, count)?;
        if token >= n {
            return Err(Error::InvalidEventCode { code: token, alternatives: n });
        }
        if token == 0 {
            self.need_token = true;
            Ok(Repeat::Again)
        } else {
            self.token = token - 1;
            Ok(Repeat::Done)
        }
    }

    fn value(&mut self, se: usize) -> Result<Content> {
        let schema = self.schema;
        let simple = schema
            .entry(se)
            .simple_type()
            .ok_or_else(|| Error::InvalidValue(format!("'{}' has no simple type", schema.se_name(se))))?;
        let length = simple.length();
        let value = match simple.xs_type() {
            XsType::String => Value::String(self.string(se, (length > 0).then_some(length))?),
            XsType::Boolean => return Ok(Content::Flag(self.reader.read_bit()?)),
            XsType::HexBinary => Value::Binary(binary::decode(&mut self.reader, &mut self.binary, length)?),
            XsType::AnyUri => Value::String(self.string(se, None)?),
            xs @ (XsType::Long | XsType::Int | XsType::Short) => self.signed(xs)?,
            XsType::Byte => Value::Signed(i64::from(self.reader.read_bits(8)?) - 128),
            xs @ (XsType::ULong | XsType::UInt | XsType::UShort) => self.unsigned(xs)?,
            XsType::UByte => Value::Unsigned(u64::from(self.reader.read_bits(8)?)),
            XsType::Null => {
                return Err(Error::InvalidValue(format!("'{}' has no content", schema.se_name(se))));
            }
        };
        Ok(Content::Value(value))
    }

    fn simple(&mut self, se: usize) -> Result<Option<Content>> {
        loop {
            match self.content {
                ContentStep::Ch => {
                    self.content = if self.reader.read_bit()? {
                        ContentStep::Empty
                    } else {
                        ContentStep::Content
                    };
                }
                ContentStep::Content => {
                    let content = self.value(se)?;
                    self.content = ContentStep::Ch;
                    return Ok(Some(content));
                }
                ContentStep::Empty => {
                    // EE als Code der zweiten Ebene
                    if self.reader.read_bits(3)? != 0 {
                        return Err(Error::InvalidEventCode { code: 1, alternatives: 1 });
                    }
                    self.content = ContentStep::Ch;
                    self.need_token = false;
                    return Ok(None);
                }
            }
        }
    }

    fn done(&mut self) {
        self.tables.clear();
    }

    fn rebuffer(&mut self, data: &[u8]) {
        self.reader.rebuffer(data);
    }
}
