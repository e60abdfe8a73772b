//! XML-Decoding derselben Dokumente wie in `decode_exi.rs`.
//!
//! XML und EXI müssen für dasselbe Dokument denselben Record liefern.

use sep2_parse::bitstream::BitWriter;
use sep2_parse::sample::{self, SCHEMA};
use sep2_parse::string_table::StringTables;
use sep2_parse::{binary, bit_width, header, integer, string, unsigned_integer};
use sep2_parse::{Document, Error, Field, ParseState, Parser, ParserOptions, Value};

include!("common/exi_stream.rs");

const END_DEVICE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<EndDevice xmlns="urn:ieee:std:2030.5:ns" href="/edev/3">
  <changedTime>1379656800</changedTime>
  <enabled>true</enabled>
  <lFDI>3E4F45AB31EDFE5B67E343E5E4562E31984E23E5</lFDI>
  <mfModel>Model-X</mfModel>
  <sFDI>167261211391</sFDI>
  <supportedLocale>en_US</supportedLocale>
  <supportedLocale>de_DE</supportedLocale>
  <supportedLocale>en_US</supportedLocale>
</EndDevice>
"#;

fn decode(xml: &str) -> Result<Document, Error> {
    Parser::xml(&SCHEMA, xml.as_bytes(), &ParserOptions::default()).parse()
}

fn decode_exi(data: &[u8]) -> Document {
    Parser::exi(&SCHEMA, data, &ParserOptions::default()).parse().unwrap()
}

fn decode_split(data: &[u8], split: usize) -> Result<Document, Error> {
    let mut parser = Parser::xml(&SCHEMA, &data[..split], &ParserOptions::default());
    match parser.parse() {
        Err(Error::NeedMoreData) => {
            parser.rebuffer(&data[split..]);
            parser.parse()
        }
        other => other,
    }
}

/// EndDevice mit `n` Locales, sonst nur Pflichtfelder.
fn device_with_locales(n: usize) -> String {
    let locales: String = (0..n).map(|i| format!("<supportedLocale>l{i}</supportedLocale>")).collect();
    format!("<EndDevice><changedTime>0</changedTime><sFDI>1</sFDI>{locales}</EndDevice>")
}

#[test]
fn end_device_wie_exi() {
    let doc = decode(END_DEVICE_XML).unwrap();
    assert_eq!(doc, decode_exi(&end_device_stream()));
    assert_eq!(doc.object.get(&SCHEMA, "lFDI"), Some(&Value::Binary(LFDI.to_vec())));
    assert_eq!(doc.object.flag(&SCHEMA, "enabled"), Some(true));
}

#[test]
fn jede_teilung_liefert_dasselbe_dokument() {
    let data = END_DEVICE_XML.as_bytes();
    let expected = decode(END_DEVICE_XML).unwrap();
    for split in 0..=data.len() {
        assert_eq!(decode_split(data, split).as_ref(), Ok(&expected), "Teilung bei {split}");
    }
}

#[test]
fn time_wie_exi() {
    let xml = r#"<Time href="/tm"><currentTime>1379656800</currentTime><dstOffset>3600</dstOffset>
        <quality>7</quality><tzOffset>-28800</tzOffset></Time>"#;
    let mut s = ExiStream::start("Time");
    s.string("href", "/tm")
        .signed("currentTime", 1_379_656_800)
        .signed("dstOffset", 3600)
        .ubyte("quality", 7)
        .signed("tzOffset", -28800);
    let doc = decode(xml).unwrap();
    assert_eq!(doc, decode_exi(&s.finish()));
    assert!(doc.object.field(&SCHEMA, "localTime").unwrap().is_absent());
}

#[test]
fn device_capability_mit_leeren_links() {
    let xml = r#"<DeviceCapability href="/dcap" pollRate="900">
        <EndDeviceListLink href="/edev" all="2"/>
        <TimeLink href="/tm"/>
    </DeviceCapability>"#;
    let mut s = ExiStream::start("DeviceCapability");
    s.string("href", "/dcap").unsigned("pollRate", 900);
    s.begin("EndDeviceListLink").string("href", "/edev").unsigned("all", 2).end();
    s.begin("TimeLink").string("href", "/tm").end();
    assert_eq!(decode(xml).unwrap(), decode_exi(&s.finish()));
}

#[test]
fn liste_wie_exi() {
    let xml = r#"<EndDeviceList href="/edev" all="2" results="2">
        <EndDevice href="/edev/1"><changedTime>0</changedTime><sFDI>1</sFDI>
            <supportedLocale>en_US</supportedLocale></EndDevice>
        <EndDevice href="/edev/2"><changedTime>0</changedTime><sFDI>2</sFDI>
            <supportedLocale>en_US</supportedLocale></EndDevice>
    </EndDeviceList>"#;
    let mut s = ExiStream::start("EndDeviceList");
    s.string("href", "/edev").unsigned("all", 2).ubyte("results", 2);
    for (href, sfdi) in [("/edev/1", 1), ("/edev/2", 2)] {
        s.begin("EndDevice")
            .string("href", href)
            .signed("changedTime", 0)
            .unsigned("sFDI", sfdi)
            .string("supportedLocale", "en_US")
            .end();
    }
    let doc = decode(xml).unwrap();
    assert_eq!(doc, decode_exi(&s.finish()));
    assert_eq!(doc.object.field(&SCHEMA, "EndDevice").unwrap().values().len(), 2);
}

#[test]
fn notification_mit_xsi_type() {
    let xml = r#"<Notification xmlns="urn:ieee:std:2030.5:ns"
            xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" href="/ntfy/1">
        <subscribedResource>/edev/3</subscribedResource>
        <Resource xsi:type="EndDevice" href="/edev/3">
            <changedTime>5</changedTime><sFDI>9</sFDI><supportedLocale>en_US</supportedLocale>
        </Resource>
        <status>0</status>
    </Notification>"#;
    let mut s = ExiStream::start("Notification");
    s.string("href", "/ntfy/1").string("subscribedResource", "/edev/3");
    s.begin_as("Resource", "EndDevice")
        .string("href", "/edev/3")
        .signed("changedTime", 5)
        .unsigned("sFDI", 9)
        .string("supportedLocale", "en_US")
        .end();
    s.ubyte("status", 0);

    let doc = decode(xml).unwrap();
    assert_eq!(doc, decode_exi(&s.finish()));
    match doc.object.field(&SCHEMA, "Resource") {
        Some(Field::Substitution(st)) => assert_eq!(st.type_index, sample::END_DEVICE),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn xsi_type_nicht_abgeleitet() {
    let xml = r#"<Notification><subscribedResource>/x</subscribedResource>
        <Resource xsi:type="sep:Link" href="/l"/><status>0</status></Notification>"#;
    let mut parser = Parser::xml(&SCHEMA, xml.as_bytes(), &ParserOptions::default());
    assert!(matches!(parser.parse(), Err(Error::XsiTypeNotDerived { .. })));
    assert_eq!(parser.state(), ParseState::Invalid);
    assert_eq!(parser.parse(), Err(Error::ParserInvalid));
}

#[test]
fn xsi_type_unbekannt() {
    let xml = r#"<Notification><subscribedResource>/x</subscribedResource>
        <Resource xsi:type="Meter"/><status>0</status></Notification>"#;
    assert!(matches!(decode(xml), Err(Error::XsiTypeNotFound(name)) if name == "Meter"));
}

#[test]
fn locale_grenzen() {
    let doc = decode(&device_with_locales(3)).unwrap();
    assert_eq!(doc.object.field(&SCHEMA, "supportedLocale").unwrap().values().len(), 3);

    assert!(matches!(decode(&device_with_locales(4)), Err(Error::OrderingViolation { .. })));
    match decode(&device_with_locales(0)) {
        Err(Error::OccurrenceViolation { name, count, min }) => {
            assert_eq!(name, "supportedLocale");
            assert_eq!((count, min), (0, 1));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn pflichtattribut_fehlt() {
    let xml = r#"<EndDeviceList results="0"/>"#;
    assert!(matches!(decode(xml), Err(Error::OccurrenceViolation { name, .. }) if name == "all"));
}

#[test]
fn falsche_reihenfolge() {
    // sFDI vor changedTime
    let xml = "<EndDevice><sFDI>1</sFDI><changedTime>0</changedTime></EndDevice>";
    assert!(matches!(decode(xml), Err(Error::OccurrenceViolation { name, .. }) if name == "changedTime"));

    let xml = "<EndDevice><changedTime>0</changedTime><sFDI>1</sFDI>\
               <supportedLocale>en_US</supportedLocale><mfModel>M</mfModel></EndDevice>";
    assert!(matches!(decode(xml), Err(Error::OrderingViolation { .. })));
}

#[test]
fn ungueltige_werte() {
    let xml = "<EndDevice><changedTime>zehn</changedTime></EndDevice>";
    assert!(matches!(decode(xml), Err(Error::InvalidValue(_))));

    let xml = r#"<EndDeviceList all="4294967296" results="0"/>"#;
    assert_eq!(decode(xml), Err(Error::IntegerOverflow));

    let xml = "<EndDevice><changedTime>0</changedTime><enabled>ja</enabled></EndDevice>";
    assert!(matches!(decode(xml), Err(Error::InvalidValue(_))));

    let xml = format!(
        "<EndDevice><changedTime>0</changedTime><mfModel>{}</mfModel></EndDevice>",
        "x".repeat(32)
    );
    assert!(matches!(decode(&xml), Err(Error::StringTooLong { capacity: 32, .. })));
}

#[test]
fn entities_und_kommentare() {
    let xml = "<!-- Kopf --><EndDevice><changedTime>0</changedTime>\
               <mfModel>A&amp;B &lt;1&gt;</mfModel><sFDI>1</sFDI>\
               <supportedLocale>en_US</supportedLocale></EndDevice>";
    let doc = decode(xml).unwrap();
    assert_eq!(doc.object.get(&SCHEMA, "mfModel").and_then(Value::as_str), Some("A&B <1>"));
}

#[test]
fn kaputtes_markup() {
    let xml = "<EndDevice><changedTime>0</changedTime><sFDI 1</sFDI></EndDevice>";
    assert!(matches!(decode(xml), Err(Error::XmlParseError(_))));
}

#[test]
fn unvollstaendig_bleibt_fortsetzbar() {
    let data = END_DEVICE_XML.as_bytes();
    let mut parser = Parser::xml(&SCHEMA, &data[..data.len() / 2], &ParserOptions::default());
    assert_eq!(parser.parse(), Err(Error::NeedMoreData));
    assert_ne!(parser.state(), ParseState::Invalid);
    assert_eq!(parser.parse(), Err(Error::NeedMoreData));
    parser.rebuffer(&data[data.len() / 2..]);
    assert_eq!(parser.parse(), decode(END_DEVICE_XML));
}
