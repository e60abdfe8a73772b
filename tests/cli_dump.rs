use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use sep2_parse::bitstream::BitWriter;
use sep2_parse::sample::SCHEMA;
use sep2_parse::string_table::StringTables;
use sep2_parse::{binary, bit_width, header, integer, string, unsigned_integer};

include!("common/exi_stream.rs");

fn dump_bin() -> &'static str {
    env!("CARGO_BIN_EXE_sep2-dump")
}

fn test_temp_dir(tag: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("sep2-dump-{tag}-{}-{ts}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run_dump(args: &[&str]) -> Output {
    Command::new(dump_bin()).args(args).output().expect("run sep2-dump")
}

fn stdout(out: &Output) -> String {
    assert!(out.status.success(), "sep2-dump failed: {}", String::from_utf8_lossy(&out.stderr));
    String::from_utf8_lossy(&out.stdout).into_owned()
}

const TIME_XML: &str = r#"<?xml version="1.0"?>
<Time href="/tm"><currentTime>1379656800</currentTime><dstOffset>3600</dstOffset>
<quality>7</quality><tzOffset>-28800</tzOffset></Time>"#;

#[test]
fn cli_dump_xml() {
    let dir = test_temp_dir("xml");
    let input = dir.join("time.xml");
    fs::write(&input, TIME_XML).expect("write xml");

    let out = stdout(&run_dump(&[input.to_str().unwrap()]));
    assert!(out.starts_with("Time\n"), "{out}");
    assert!(out.contains("  @href = \"/tm\"\n"), "{out}");
    assert!(out.contains("  tzOffset = -28800\n"), "{out}");
    assert!(!out.contains("localTime"), "{out}");
}

#[test]
fn cli_dump_exi_in_chunks_matches_whole() {
    let dir = test_temp_dir("exi");
    let input = dir.join("edev.exi");
    fs::write(&input, end_device_stream()).expect("write exi");
    let path = input.to_str().unwrap();

    let whole = stdout(&run_dump(&[path]));
    let chunked = stdout(&run_dump(&[path, "--chunk-size", "1"]));
    assert_eq!(whole, chunked);
    assert!(whole.contains("  enabled = true\n"), "{whole}");
    assert!(whole.contains("  lFDI = 3E4F45AB31EDFE5B67E343E5E4562E31984E23E5\n"), "{whole}");
    assert_eq!(whole.matches("supportedLocale").count(), 3, "{whole}");
}

#[test]
fn cli_dump_shows_substituted_type() {
    let dir = test_temp_dir("ntfy");
    let input = dir.join("ntfy.xml");
    let xml = r#"<Notification><subscribedResource>/edev/3</subscribedResource>
        <Resource xsi:type="EndDevice"><changedTime>0</changedTime><sFDI>1</sFDI>
        <supportedLocale>en_US</supportedLocale></Resource><status>0</status></Notification>"#;
    fs::write(&input, xml).expect("write xml");

    let out = stdout(&run_dump(&[input.to_str().unwrap(), "--events"]));
    assert!(out.contains("  Resource [EndDevice]\n"), "{out}");
    assert!(out.contains("    sFDI = 1\n"), "{out}");
}

#[test]
fn cli_reports_malformed_input() {
    let dir = test_temp_dir("bad");
    let input = dir.join("bad.xml");
    fs::write(&input, "<Time><quality>7</quality></Time>").expect("write xml");

    let out = run_dump(&[input.to_str().unwrap()]);
    assert!(!out.status.success());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("currentTime"), "{err}");
}

#[test]
fn cli_no_cookie_rejects_cookie() {
    let dir = test_temp_dir("cookie");
    let input = dir.join("time.exi");
    let mut s = ExiStream::start_with("Time", true);
    s.signed("currentTime", 0).signed("dstOffset", 0).ubyte("quality", 0).signed("tzOffset", 0);
    fs::write(&input, s.finish()).expect("write exi");
    let path = input.to_str().unwrap();

    assert!(run_dump(&[path]).status.success());
    let out = run_dump(&[path, "--no-cookie"]);
    assert!(!out.status.success(), "decode with --no-cookie unexpectedly succeeded");
}
