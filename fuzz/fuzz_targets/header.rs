#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = sep2_parse::bitstream::BitReader::new(data);
    let _ = sep2_parse::header::decode(&mut reader, sep2_parse::sample::SCHEMA.schema_id, true);
});
