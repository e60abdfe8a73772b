//! sep2-dump CLI: decodes an IEEE 2030.5 resource (EXI or XML) and prints the record.

use clap::{Parser as ClapParser, ValueEnum};
use sep2_parse::sample::SCHEMA;
use sep2_parse::{Document, Driver, Error, Event, Field, Object, Parser, ParserOptions, Schema, Value, XsType};
use std::io::{IsTerminal, Read};
use std::process;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// EXI, wenn Cookie oder Distinguishing Bits vorhanden, sonst XML
    Auto,
    Exi,
    Xml,
}

#[derive(ClapParser)]
#[command(name = "sep2-dump", about = "Decode IEEE 2030.5 resources (EXI or XML)")]
struct Cli {
    /// Input file (- for stdin)
    input: String,

    /// Input encoding
    #[arg(long, value_enum, default_value = "auto")]
    format: Format,

    /// Feed the parser in chunks of this many bytes (0 = all at once)
    #[arg(long, default_value_t = 0)]
    chunk_size: usize,

    /// Print parser events while decoding
    #[arg(long)]
    events: bool,

    /// Reject the "$EXI" cookie
    #[arg(long)]
    no_cookie: bool,

    /// Maximum nesting depth
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Fehler: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let data = read_input(&cli.input)?;
    let mut options = ParserOptions::default();
    if cli.no_cookie {
        options = options.without_cookie();
    }
    if let Some(depth) = cli.max_depth {
        options = options.with_max_depth(depth);
    }
    let chunk = if cli.chunk_size == 0 { data.len() } else { cli.chunk_size };
    let first = &data[..chunk.min(data.len())];

    let exi = match cli.format {
        Format::Exi => true,
        Format::Xml => false,
        Format::Auto => looks_like_exi(&data),
    };
    let doc = if exi {
        drive(Parser::exi(&SCHEMA, first, &options), &data, chunk, cli.events)
    } else {
        drive(Parser::xml(&SCHEMA, first, &options), &data, chunk, cli.events)
    }
    .map_err(|e| format!("Decode-Fehler: {e}"))?;

    print!("{}", render(&doc, &SCHEMA));
    Ok(())
}

fn read_input(path: &str) -> Result<Vec<u8>, String> {
    if path == "-" {
        if std::io::stdin().is_terminal() {
            eprintln!("Lese von stdin (Ctrl+D zum Beenden)...");
        }
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| format!("Lesefehler (stdin): {e}"))?;
        Ok(buf)
    } else {
        std::fs::read(path).map_err(|e| format!("Lesefehler '{}': {e}", path))
    }
}

/// `$EXI` oder Distinguishing Bits `10`.
fn looks_like_exi(data: &[u8]) -> bool {
    data.starts_with(b"$EXI") || data.first().is_some_and(|b| b & 0xC0 == 0x80)
}

/// Füttert den Parser stückweise, bis das Dokument vollständig ist.
fn drive<D: Driver>(mut parser: Parser<'_, D>, data: &[u8], chunk: usize, events: bool) -> Result<Document, Error> {
    let mut fed = chunk.min(data.len());
    let result = loop {
        match parser.step() {
            Ok(Event::Complete(doc)) => break Ok(doc),
            Ok(event) => {
                if events {
                    eprintln!("{}", describe(&event, parser.schema()));
                }
            }
            Err(Error::NeedMoreData) if fed < data.len() => {
                let end = (fed + chunk.max(1)).min(data.len());
                parser.rebuffer(&data[fed..end]);
                fed = end;
            }
            Err(e) => break Err(e),
        }
    };
    parser.teardown();
    result
}

fn describe(event: &Event, schema: &Schema) -> String {
    match event {
        Event::Begin { entry, type_index } => {
            format!("begin {} ({})", schema.se_name(*entry), schema.se_name(*type_index))
        }
        Event::Field { entry } => format!("field {}", schema.se_name(*entry)),
        Event::End { entry } => format!("end {}", schema.se_name(*entry)),
        Event::Complete(doc) => format!("complete {}", doc.name(schema)),
    }
}

/// Record als eingerückter Baum.
fn render(doc: &Document, schema: &Schema) -> String {
    let mut out = String::new();
    out.push_str(doc.name(schema));
    type_suffix(&mut out, &doc.object, doc.element, schema);
    out.push('\n');
    render_object(&mut out, &doc.object, schema, 1);
    out
}

fn type_suffix(out: &mut String, obj: &Object, entry: usize, schema: &Schema) {
    let declared = schema.resolve(schema.entry(entry).index().unwrap_or(entry));
    if obj.type_index != declared {
        out.push_str(&format!(" [{}]", schema.se_name(obj.type_index)));
    }
}

fn render_object(out: &mut String, obj: &Object, schema: &Schema, depth: usize) {
    let indent = "  ".repeat(depth);
    for index in schema.fields(obj.type_index) {
        let entry = schema.entry(index);
        let name = schema.se_name(index);
        let prefix = if entry.attribute { "@" } else { "" };
        if entry.simple_type().map(|t| t.xs_type()) == Some(XsType::Boolean) {
            if let Some(on) = obj.flag(schema, name) {
                out.push_str(&format!("{indent}{prefix}{name} = {on}\n"));
            }
            continue;
        }
        let Some(field) = obj.slots.get(entry.offset()) else {
            continue;
        };
        match field {
            Field::Absent => {}
            Field::Substitution(st) => {
                out.push_str(&format!("{indent}{name} [{}]\n", schema.se_name(st.type_index)));
                if let Some(data) = &st.data {
                    render_object(out, data, schema, depth + 1);
                }
            }
            _ => {
                for value in field.values() {
                    match value {
                        Value::Object(child) => {
                            out.push_str(&format!("{indent}{name}"));
                            type_suffix(out, child, index, schema);
                            out.push('\n');
                            render_object(out, child, schema, depth + 1);
                        }
                        scalar => out.push_str(&format!("{indent}{prefix}{name} = {}\n", render_scalar(scalar))),
                    }
                }
            }
        }
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        Value::Binary(bytes) => bytes.iter().map(|b| format!("{b:02X}")).collect(),
        Value::Signed(v) => v.to_string(),
        Value::Unsigned(v) => v.to_string(),
        Value::Object(_) => "{..}".to_owned(),
    }
}
