//! Value string tables (EXI 7.3.3).
//!
//! Zwei Ebenen: eine Partition pro Feldname (lokal) und eine globale
//! Partition für alle Felder. Beide wachsen nur durch Anhängen, Compact
//! IDs sind Positionen in der jeweiligen Partition.
//!
//! Lifecycle: eine Tabelle pro Dokument, geleert beim Teardown des Parsers.

use std::rc::Rc;

use crate::FastHashMap;

/// Schwelle ab der eine Partition zusätzlich ein Reverse-Lookup führt.
/// Für wenige Einträge ist lineare Suche auf `Vec<Rc<str>>` schneller.
const PARTITION_LINEAR_THRESHOLD: usize = 64;

/// Append-only Partition für Compact ID → String.
///
/// Der Decoder braucht nur ID → String; das Reverse-Lookup dient dem
/// Encoder für Testvektoren und wird lazy angelegt.
#[derive(Debug, Clone, Default)]
struct Partition {
    entries: Vec<Rc<str>>,
    lookup: Option<FastHashMap<Rc<str>, usize>>,
}

impl Partition {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            lookup: None,
        }
    }

    /// Hängt an, auch wenn der Wert schon vorhanden ist.
    fn push(&mut self, value: Rc<str>) -> usize {
        let id = self.entries.len();
        if self.lookup.is_none() && id + 1 >= PARTITION_LINEAR_THRESHOLD {
            let mut map = FastHashMap::with_capacity_and_hasher(id + 1, Default::default());
            for (i, e) in self.entries.iter().enumerate() {
                map.entry(Rc::clone(e)).or_insert(i);
            }
            self.lookup = Some(map);
        }
        if let Some(map) = self.lookup.as_mut() {
            map.entry(Rc::clone(&value)).or_insert(id);
        }
        self.entries.push(value);
        id
    }

    /// Erste ID eines Werts.
    fn position(&self, value: &str) -> Option<usize> {
        match &self.lookup {
            Some(map) => map.get(value).copied(),
            None => self.entries.iter().position(|e| &**e == value),
        }
    }

    fn get(&self, id: usize) -> Option<&str> {
        self.entries.get(id).map(AsRef::as_ref)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Lokale und globale Value-Partitionen eines Dokuments.
#[derive(Debug, Clone)]
pub struct StringTables {
    local: FastHashMap<&'static str, Partition>,
    global: Partition,
    local_capacity: usize,
}

impl StringTables {
    /// Neue leere Tabellen; lokale Partitionen starten mit `local_capacity`.
    pub fn new(local_capacity: usize, global_capacity: usize) -> Self {
        Self {
            local: FastHashMap::default(),
            global: Partition::with_capacity(global_capacity),
            local_capacity,
        }
    }

    /// Fügt einen Literal-Wert lokal (Partition wird bei Bedarf angelegt) und global ein.
    pub fn add(&mut self, field: &'static str, value: &str) {
        let rc: Rc<str> = value.into();
        let capacity = self.local_capacity;
        self.local
            .entry(field)
            .or_insert_with(|| Partition::with_capacity(capacity))
            .push(Rc::clone(&rc));
        self.global.push(rc);
    }

    /// Anzahl Einträge der lokalen Partition von `field` (0 wenn keine existiert).
    pub fn local_len(&self, field: &str) -> usize {
        self.local.get(field).map_or(0, Partition::len)
    }

    /// Lokaler Wert zu einer Compact ID.
    pub fn local(&self, field: &str, id: usize) -> Option<&str> {
        self.local.get(field)?.get(id)
    }

    /// Lokale Compact ID eines Werts.
    pub fn local_position(&self, field: &str, value: &str) -> Option<usize> {
        self.local.get(field)?.position(value)
    }

    /// Anzahl Einträge der globalen Partition.
    pub fn global_len(&self) -> usize {
        self.global.len()
    }

    /// Globaler Wert zu einer Compact ID.
    pub fn global(&self, id: usize) -> Option<&str> {
        self.global.get(id)
    }

    /// Globale Compact ID eines Werts.
    pub fn global_position(&self, value: &str) -> Option<usize> {
        self.global.position(value)
    }

    /// Verwirft alle Einträge (Teardown).
    pub fn clear(&mut self) {
        self.local.clear();
        self.global = Partition::default();
    }

    /// `true` wenn keine Werte gespeichert sind.
    pub fn is_empty(&self) -> bool {
        self.global.len() == 0
    }
}
