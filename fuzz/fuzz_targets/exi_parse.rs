#![no_main]
use libfuzzer_sys::fuzz_target;
use sep2_parse::sample::SCHEMA;
use sep2_parse::{free_object, Error, Parser, ParserOptions};

// Erstes Byte wählt die Stückgröße, der Rest ist der Stream.
fuzz_target!(|data: &[u8]| {
    let Some((&chunk, stream)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk % 16) + 1;
    let first = chunk.min(stream.len());
    let mut parser = Parser::exi(&SCHEMA, &stream[..first], &ParserOptions::default());
    let mut fed = first;
    loop {
        match parser.parse() {
            Ok(doc) => {
                let ty = doc.object.type_index;
                free_object(Some(doc.object), ty, &SCHEMA);
                break;
            }
            Err(Error::NeedMoreData) if fed < stream.len() => {
                let end = (fed + chunk).min(stream.len());
                parser.rebuffer(&stream[fed..end]);
                fed = end;
            }
            Err(_) => break,
        }
    }
    parser.teardown();
});
