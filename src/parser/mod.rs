//! Resumable schema-driven parser.
//!
//! Der [`Parser`] läuft über die Einträge des [`Schema`] und fragt den
//! [`Driver`] (EXI oder XML) an jeder Position, was als nächstes kommt.
//! Der Driver ist pro Dokument fest gewählt; der Parser selbst kennt
//! weder Bits noch Tags.
//!
//! Zustände:
//!
//! ```text
//! Start ──► Element ──► Next ──► Element ──► ... ──► End ──► Done
//!              ▲          │                          │
//!              └─ Sequence◄───────── after_field ◄───┘
//! ```
//!
//! Jeder Fehler außer [`Error::NeedMoreData`] führt in den terminalen
//! Zustand [`ParseState::Invalid`]. Bei Starvation bleibt der Zustand
//! erhalten; nach [`Parser::rebuffer`] setzt [`Parser::step`] an derselben
//! Stelle fort, die Teilfortschritte liegen in den Registern des Drivers.

pub mod exi;
pub mod xml;

pub use exi::ExiDriver;
pub use xml::XmlDriver;

use crate::object::{Document, Object, Value};
use crate::options::ParserOptions;
use crate::schema::{Schema, XsType};
use crate::{Error, Result};

/// Result of [`Driver::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Das Feld an diesem Index kommt als nächstes.
    Field(usize),
    /// Ende des aktuellen Records.
    End,
}

/// Result of [`Driver::sequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Noch ein Vorkommen desselben Felds.
    Again,
    /// Wiederholung beendet.
    Done,
}

/// A decoded simple value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Wert für einen Slot.
    Value(Value),
    /// Boolean für das Flag-Wort.
    Flag(bool),
}

/// Encoding backend of the [`Parser`].
///
/// Jede Methode ist wiedereintrittsfähig: meldet sie
/// [`Error::NeedMoreData`], wird sie nach `rebuffer` mit denselben
/// Argumenten erneut aufgerufen und setzt beim gespeicherten Teilschritt fort.
pub trait Driver {
    /// Dokumentanfang prüfen; liefert den Index des globalen Elements.
    fn start(&mut self) -> Result<usize>;
    /// Welches Feld ab Position `se` als nächstes kommt.
    fn next(&mut self, se: usize) -> Result<Next>;
    /// Laufzeit-Typ per `xsi:type`, `first` ist das erste Feld des
    /// deklarierten Typs.
    fn xsi_type(&mut self, first: usize) -> Result<Option<usize>>;
    /// Ende des Elements `se`.
    fn end(&mut self, se: usize) -> Result<()>;
    /// Weiteres Vorkommen von `se` nach `count` Vorkommen?
    fn sequence(&mut self, se: usize, count: u32) -> Result<Repeat>;
    /// Wert eines Attributs bzw. Inhalt ohne Rahmen.
    fn value(&mut self, se: usize) -> Result<Content>;
    /// Inhalt eines Simple-Type Elements, `None` für leeren Inhalt.
    fn simple(&mut self, se: usize) -> Result<Option<Content>>;
    /// Gibt dokumentweite Zustände frei.
    fn done(&mut self);
    /// Hängt Bytes an das Eingabefenster an.
    fn rebuffer(&mut self, data: &[u8]);
}

/// Externally visible parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Vor dem Dokumentanfang.
    Start,
    /// Erwartet das nächste Feld des aktuellen Records.
    Next,
    /// Auf einem Feld positioniert.
    Element,
    /// Entscheidet über ein weiteres Vorkommen.
    Sequence,
    /// Erwartet das Ende eines Elements.
    End,
    /// Dokument vollständig.
    Done,
    /// Terminal nach einem Fehler.
    Invalid,
}

/// What a call to [`Parser::step`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Ein Record beginnt; `entry` ist das Feld bzw. globale Element.
    Begin {
        /// Schema-Eintrag des Elements.
        entry: usize,
        /// Laufzeit-Typ des Records.
        type_index: usize,
    },
    /// Ein Simple-Type Feld wurde abgelegt.
    Field {
        /// Schema-Eintrag des Felds.
        entry: usize,
    },
    /// Ein Record wurde abgeschlossen und im Eltern-Record abgelegt.
    End {
        /// Schema-Eintrag des Elements.
        entry: usize,
    },
    /// Das Wurzelelement ist abgeschlossen.
    Complete(Document),
}

#[derive(Debug)]
struct Frame {
    element: usize,
    object: Object,
    se: usize,
    count: u32,
}

/// Pull parser over one document.
pub struct Parser<'s, D> {
    schema: &'s Schema,
    driver: D,
    max_depth: usize,
    state: ParseState,
    se: usize,
    stack: Vec<Frame>,
}

impl<'s> Parser<'s, ExiDriver<'s>> {
    /// Parser für einen EXI-Stream.
    pub fn exi(schema: &'s Schema, data: &[u8], options: &ParserOptions) -> Self {
        Self::with_driver(schema, ExiDriver::new(schema, data, options), options)
    }
}

impl<'s> Parser<'s, XmlDriver<'s>> {
    /// Parser für ein XML-Dokument.
    pub fn xml(schema: &'s Schema, data: &[u8], options: &ParserOptions) -> Self {
        Self::with_driver(schema, XmlDriver::new(schema, data), options)
    }
}

impl<'s, D: Driver> Parser<'s, D> {
    /// Parser mit beliebigem Driver.
    pub fn with_driver(schema: &'s Schema, driver: D, options: &ParserOptions) -> Self {
        Self {
            schema,
            driver,
            max_depth: options.max_depth(),
            state: ParseState::Start,
            se: 0,
            stack: Vec::new(),
        }
    }

    /// Aktueller Zustand.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Das Schema dieses Parsers.
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Der Driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Anzahl offener Records.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Hängt weitere Eingabe an.
    pub fn rebuffer(&mut self, data: &[u8]) {
        self.driver.rebuffer(data);
    }

    /// Gibt String-Tabellen und offene Records frei.
    pub fn teardown(&mut self) {
        self.driver.done();
        self.stack.clear();
    }

    /// Läuft bis zum nächsten [`Event`].
    ///
    /// Nach `Complete` oder einem Fehler liefert jeder weitere Aufruf
    /// [`Error::ParserInvalid`].
    pub fn step(&mut self) -> Result<Event> {
        loop {
            match self.advance() {
                Ok(Some(event)) => return Ok(event),
                Ok(None) => {}
                Err(Error::NeedMoreData) => return Err(Error::NeedMoreData),
                Err(e) => {
                    if !matches!(self.state, ParseState::Done | ParseState::Invalid) {
                        log::debug!("parser invalid in {:?} at entry {}: {e}", self.state, self.se);
                        self.state = ParseState::Invalid;
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Parst bis zum Ende des Wurzelelements.
    pub fn parse(&mut self) -> Result<Document> {
        loop {
            if let Event::Complete(document) = self.step()? {
                return Ok(document);
            }
        }
    }

    fn advance(&mut self) -> Result<Option<Event>> {
        match self.state {
            ParseState::Start => {
                let global = self.driver.start()?;
                log::debug!("document root '{}'", self.schema.se_name(global));
                self.se = global;
                self.state = ParseState::Element;
                Ok(None)
            }
            ParseState::Next => {
                let se = self.top()?.se;
                match self.driver.next(se)? {
                    Next::Field(field) => {
                        let frame = self.top()?;
                        frame.se = field;
                        frame.count = 0;
                        self.se = field;
                        self.state = ParseState::Element;
                    }
                    Next::End => {
                        self.se = self.top()?.element;
                        self.state = ParseState::End;
                    }
                }
                Ok(None)
            }
            ParseState::Element => self.element(),
            ParseState::Sequence => {
                let (se, count) = {
                    let frame = self.top()?;
                    (frame.se, frame.count)
                };
                match self.driver.sequence(se, count)? {
                    Repeat::Again => {
                        self.se = se;
                        self.state = ParseState::Element;
                    }
                    Repeat::Done => {
                        let frame = self.top()?;
                        frame.se += 1;
                        frame.count = 0;
                        self.state = ParseState::Next;
                    }
                }
                Ok(None)
            }
            ParseState::End => self.end(),
            ParseState::Done | ParseState::Invalid => Err(Error::ParserInvalid),
        }
    }

    fn element(&mut self) -> Result<Option<Event>> {
        let schema = self.schema;
        let se = self.se;
        let entry = schema.entry(se);

        if entry.simple_type().is_some() {
            let content = if entry.attribute {
                Some(self.driver.value(se)?)
            } else {
                self.driver.simple(se)?
            };
            let frame = self.top()?;
            match content {
                Some(Content::Flag(on)) => frame.object.set_flag(entry, on),
                Some(Content::Value(value)) => frame.object.store(entry, value),
                None => {}
            }
            log::trace!("field '{}'", schema.se_name(se));
            if entry.attribute {
                self.after_field()?;
            } else {
                self.state = ParseState::End;
            }
            return Ok(Some(Event::Field { entry: se }));
        }

        let declared = schema.resolve(entry.index().ok_or(Error::ParserInvalid)?);
        let type_index = match self.driver.xsi_type(declared + 1)? {
            Some(ty) if schema.is_a(ty, declared) => ty,
            Some(ty) => {
                return Err(Error::XsiTypeNotDerived {
                    type_name: schema.se_name(ty).into(),
                    base_name: schema.se_name(declared).into(),
                });
            }
            None => declared,
        };
        if self.stack.len() >= self.max_depth {
            return Err(Error::NestingTooDeep(self.max_depth));
        }
        log::trace!("record '{}' as {}", schema.se_name(se), schema.se_name(type_index));
        self.stack.push(Frame {
            element: se,
            object: Object::new(schema, type_index),
            se: type_index + 1,
            count: 0,
        });
        self.state = ParseState::Next;
        Ok(Some(Event::Begin { entry: se, type_index }))
    }

    fn end(&mut self) -> Result<Option<Event>> {
        let schema = self.schema;
        let se = self.se;
        self.driver.end(se)?;
        let entry = schema.entry(se);
        if entry.simple_type().is_some() {
            self.after_field()?;
            return Ok(None);
        }

        let frame = self.stack.pop().ok_or(Error::ParserInvalid)?;
        let Some(parent) = self.stack.last_mut() else {
            log::debug!("document '{}' complete", schema.se_name(frame.element));
            self.state = ParseState::Done;
            return Ok(Some(Event::Complete(Document {
                element: frame.element,
                object: Box::new(frame.object),
            })));
        };
        parent.object.store(entry, Value::Object(Box::new(frame.object)));
        self.after_field()?;
        Ok(Some(Event::End { entry: se }))
    }

    /// Zählt ein Vorkommen und wählt Sequence oder das nächste Feld.
    fn after_field(&mut self) -> Result<()> {
        let schema = self.schema;
        let frame = self.top()?;
        frame.count += 1;
        let more = schema.entry(frame.se).allows_more(frame.count);
        if !more {
            frame.se += 1;
            frame.count = 0;
        }
        self.state = if more { ParseState::Sequence } else { ParseState::Next };
        Ok(())
    }

    fn top(&mut self) -> Result<&mut Frame> {
        self.stack.last_mut().ok_or(Error::ParserInvalid)
    }
}

/// Prüft eine vorzeichenbehaftete Ganzzahl gegen die Breite des Typs.
pub(crate) fn fit_signed(xs: XsType, value: i64) -> Result<Value> {
    let (min, max) = match xs {
        XsType::Int => (i64::from(i32::MIN), i64::from(i32::MAX)),
        XsType::Short => (i64::from(i16::MIN), i64::from(i16::MAX)),
        XsType::Byte => (i64::from(i8::MIN), i64::from(i8::MAX)),
        _ => (i64::MIN, i64::MAX),
    };
    if (min..=max).contains(&value) {
        Ok(Value::Signed(value))
    } else {
        Err(Error::IntegerOverflow)
    }
}

/// Prüft eine vorzeichenlose Ganzzahl gegen die Breite des Typs.
pub(crate) fn fit_unsigned(xs: XsType, value: u64) -> Result<Value> {
    let max = match xs {
        XsType::UInt => u64::from(u32::MAX),
        XsType::UShort => u64::from(u16::MAX),
        XsType::UByte => u64::from(u8::MAX),
        _ => u64::MAX,
    };
    if value <= max {
        Ok(Value::Unsigned(value))
    } else {
        Err(Error::IntegerOverflow)
    }
}
