//! sep2-parse – resumable schema-driven decoder for IEEE 2030.5 resources
//!
//! Ein [`Parser`] läuft über ein kompiliertes [`Schema`] und decodiert
//! entweder EXI (bitweise, mit String-Tabellen) oder XML (über einen
//! [`Tokenizer`]). Beide Backends können jederzeit mit
//! [`Error::NeedMoreData`] anhalten und nach [`Parser::rebuffer`]
//! verlustfrei fortsetzen.
//!
//! # Beispiel
//!
//! ```
//! use sep2_parse::sample::SCHEMA;
//! use sep2_parse::{Parser, ParserOptions, Value};
//!
//! let xml = br#"<Time href="/tm"><currentTime>1379656800</currentTime>
//!   <dstOffset>3600</dstOffset><quality>7</quality><tzOffset>-28800</tzOffset></Time>"#;
//!
//! let mut parser = Parser::xml(&SCHEMA, &xml[..40], &ParserOptions::default());
//! let doc = loop {
//!     match parser.parse() {
//!         Ok(doc) => break doc,
//!         Err(e) if e.is_starvation() => parser.rebuffer(&xml[40..]),
//!         Err(e) => panic!("{e}"),
//!     }
//! };
//! assert_eq!(doc.name(&SCHEMA), "Time");
//! assert_eq!(doc.object.get(&SCHEMA, "tzOffset"), Some(&Value::Signed(-28800)));
//! ```

pub mod binary;
pub mod bit_width;
pub mod bitstream;
pub mod error;
pub mod header;
pub mod integer;
pub mod object;
pub mod options;
pub mod parser;
pub mod sample;
pub mod schema;
pub mod string;
pub mod string_table;
pub mod tokenizer;
pub mod unsigned_integer;

pub use error::{Error, Result};

/// HashMap mit ahash (schneller, nicht DoS-resistent, für interne Datenstrukturen).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

// Public API: Options
pub use options::ParserOptions;

// Public API: Parser
pub use parser::{Content, Driver, Event, ExiDriver, ParseState, Parser, XmlDriver};

// Public API: Schema und Records
pub use object::{free_object, free_object_elements, replace_object, Document, Field, Object, Value};
pub use schema::{Schema, SchemaEntry, SimpleType, XsType};

// Public API: Tokenizer
pub use tokenizer::{Token, Tokenizer, XmlTokenizer};
