#![no_main]
use libfuzzer_sys::fuzz_target;
use sep2_parse::sample::SCHEMA;
use sep2_parse::{Error, Parser, ParserOptions};

fuzz_target!(|data: &[u8]| {
    let Some((&chunk, text)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk % 32) + 1;
    let first = chunk.min(text.len());
    let mut parser = Parser::xml(&SCHEMA, &text[..first], &ParserOptions::default());
    let mut fed = first;
    let whole = loop {
        match parser.parse() {
            Err(Error::NeedMoreData) if fed < text.len() => {
                let end = (fed + chunk).min(text.len());
                parser.rebuffer(&text[fed..end]);
                fed = end;
            }
            result => break result,
        }
    };
    // Stückweise und am Stück müssen gleich ausgehen
    if let Ok(doc) = whole {
        let again = Parser::xml(&SCHEMA, text, &ParserOptions::default()).parse();
        assert_eq!(again, Ok(doc));
    }
});
