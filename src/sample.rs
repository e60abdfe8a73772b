//! Compiled IEEE 2030.5 excerpt.
//!
//! Enthält die Typen Resource, Link, ListLink, DeviceCapability, Time,
//! EndDevice, EndDeviceList und Notification mit ihren Feldern. Die Tabellen
//! entsprechen dem, was der Schema-Compiler für diese Typen erzeugt:
//! `n` jeder Position ist `1 + alt(nächste)`, wobei `alt` für optionale
//! Felder deren `n` ist, für Pflichtfelder und den Sentinel 1.

use crate::schema::{Schema, SchemaEntry, SimpleType, XsType};

/// Wurzel-Eintrag von Resource.
pub const RESOURCE: usize = 5;
/// Wurzel-Eintrag von Link.
pub const LINK: usize = 8;
/// Wurzel-Eintrag von ListLink.
pub const LIST_LINK: usize = 11;
/// Wurzel-Eintrag von DeviceCapability.
pub const DEVICE_CAPABILITY: usize = 15;
/// Wurzel-Eintrag von Time.
pub const TIME: usize = 21;
/// Wurzel-Eintrag von EndDevice.
pub const END_DEVICE: usize = 29;
/// Wurzel-Eintrag von EndDeviceList.
pub const END_DEVICE_LIST: usize = 38;
/// Wurzel-Eintrag von Notification.
pub const NOTIFICATION: usize = 44;

const URI: SimpleType = SimpleType::new(XsType::AnyUri);
const STRING: SimpleType = SimpleType::new(XsType::String);
const BOOLEAN: SimpleType = SimpleType::new(XsType::Boolean);
const LONG: SimpleType = SimpleType::new(XsType::Long);
const INT: SimpleType = SimpleType::new(XsType::Int);
const ULONG: SimpleType = SimpleType::new(XsType::ULong);
const UINT: SimpleType = SimpleType::new(XsType::UInt);
const UBYTE: SimpleType = SimpleType::new(XsType::UByte);

static ENTRIES: [SchemaEntry; 50] = [
    // globale Elemente, sortiert nach Namen
    SchemaEntry::element(DEVICE_CAPABILITY as u16),
    SchemaEntry::element(END_DEVICE as u16),
    SchemaEntry::element(END_DEVICE_LIST as u16),
    SchemaEntry::element(NOTIFICATION as u16),
    SchemaEntry::element(TIME as u16),
    // Resource
    SchemaEntry::root(1, 0),
    SchemaEntry::attribute(0, URI, 0, 2),
    SchemaEntry::end(),
    // Link
    SchemaEntry::root(1, 0),
    SchemaEntry::attribute(0, URI, 1, 2),
    SchemaEntry::end(),
    // ListLink : Link
    SchemaEntry::root(2, LINK as u16),
    SchemaEntry::attribute(0, URI, 1, 3),
    SchemaEntry::attribute(1, UINT, 0, 2),
    SchemaEntry::end(),
    // DeviceCapability : Resource
    SchemaEntry::root(4, RESOURCE as u16),
    SchemaEntry::attribute(0, URI, 0, 5),
    SchemaEntry::attribute(1, UINT, 0, 4),
    SchemaEntry::complex(2, LIST_LINK as u16, 0, 1, 3),
    SchemaEntry::complex(3, LINK as u16, 0, 1, 2),
    SchemaEntry::end(),
    // Time : Resource
    SchemaEntry::root(6, RESOURCE as u16),
    SchemaEntry::attribute(0, URI, 0, 2),
    SchemaEntry::simple(1, LONG, 1, 1, 2),
    SchemaEntry::simple(2, INT, 1, 1, 3),
    SchemaEntry::simple(3, LONG, 0, 1, 2),
    SchemaEntry::simple(4, UBYTE, 1, 1, 2),
    SchemaEntry::simple(5, INT, 1, 1, 2),
    SchemaEntry::end(),
    // EndDevice : Resource
    SchemaEntry::root(6, RESOURCE as u16),
    SchemaEntry::attribute(0, URI, 0, 2),
    SchemaEntry::simple(1, LONG, 1, 1, 5),
    SchemaEntry::simple(0, BOOLEAN, 0, 1, 4),
    SchemaEntry::simple(2, SimpleType::with_length(XsType::HexBinary, 20), 0, 1, 3),
    SchemaEntry::simple(3, SimpleType::with_length(XsType::String, 32), 0, 1, 2),
    SchemaEntry::simple(4, ULONG, 1, 1, 2),
    SchemaEntry::simple(5, STRING, 1, 3, 2),
    SchemaEntry::end(),
    // EndDeviceList : Resource
    SchemaEntry::root(4, RESOURCE as u16),
    SchemaEntry::attribute(0, URI, 0, 2),
    SchemaEntry::attribute(1, UINT, 1, 2),
    SchemaEntry::attribute(2, UBYTE, 1, 3),
    SchemaEntry::complex(3, END_DEVICE as u16, 0, 1, 2).unbounded(),
    SchemaEntry::end(),
    // Notification : Resource
    SchemaEntry::root(4, RESOURCE as u16),
    SchemaEntry::attribute(0, URI, 0, 2),
    SchemaEntry::simple(1, URI, 1, 1, 3),
    SchemaEntry::complex(2, RESOURCE as u16, 0, 1, 2).substitution(),
    SchemaEntry::simple(3, UBYTE, 1, 1, 2),
    SchemaEntry::end(),
];

static NAMES: [&str; 27] = [
    "DeviceCapability",
    "EndDevice",
    "EndDeviceList",
    "EndDeviceListLink",
    "Link",
    "ListLink",
    "Notification",
    "Resource",
    "Time",
    "TimeLink",
    "all",
    "changedTime",
    "currentTime",
    "dstOffset",
    "enabled",
    "href",
    "lFDI",
    "localTime",
    "mfModel",
    "pollRate",
    "quality",
    "results",
    "sFDI",
    "status",
    "subscribedResource",
    "supportedLocale",
    "tzOffset",
];

static TYPES: [u16; 27] = [
    DEVICE_CAPABILITY as u16,
    END_DEVICE as u16,
    END_DEVICE_LIST as u16,
    0,
    LINK as u16,
    LIST_LINK as u16,
    NOTIFICATION as u16,
    RESOURCE as u16,
    TIME as u16,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

static ELEMENTS: [&str; 5] = ["DeviceCapability", "EndDevice", "EndDeviceList", "Notification", "Time"];

static IDS: [u16; 45] = [
    7, 15, 0, // Resource
    4, 15, 0, // Link
    5, 15, 10, 0, // ListLink
    0, 15, 19, 3, 9, 0, // DeviceCapability
    8, 15, 12, 13, 17, 20, 26, 0, // Time
    1, 15, 11, 14, 16, 18, 22, 25, 0, // EndDevice
    2, 15, 10, 21, 1, 0, // EndDeviceList
    6, 15, 24, 7, 23, 0, // Notification
];

/// The compiled IEEE 2030.5 excerpt.
pub static SCHEMA: Schema = Schema {
    namespace: "urn:ieee:std:2030.5:ns",
    schema_id: "S1",
    length: 5,
    names: &NAMES,
    types: &TYPES,
    entries: &ENTRIES,
    elements: &ELEMENTS,
    ids: &IDS,
};
