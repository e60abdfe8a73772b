//! Decoded records and their schema-driven release.
//!
//! Ein [`Object`] ist ein Record eines komplexen Typs: ein Slot pro Feld
//! (Position = `offset` des Eintrags) und ein Flag-Wort für Booleans.
//! Wiederholte Felder sammeln ihre Werte in Einfügereihenfolge.
//!
//! [`free_object_elements`], [`free_object`] und [`replace_object`] laufen
//! über das Schema und geben die Anzahl freigegebener Nutzlasten zurück:
//! Strings ohne feste Kapazität und URIs, Substitutionen und Listenknoten
//! unbeschränkter Felder. Ein zweiter Aufruf auf demselben Record gibt 0
//! zurück, weil freigegebene Slots danach leer sind.

use crate::schema::{Schema, SchemaEntry, XsType};

/// A decoded simple or complex value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// xs:string / xs:anyURI.
    String(String),
    /// xs:hexBinary, rechtsbündig in der deklarierten Länge.
    Binary(Vec<u8>),
    /// Vorzeichenbehaftete Ganzzahl.
    Signed(i64),
    /// Vorzeichenlose Ganzzahl.
    Unsigned(u64),
    /// Record eines komplexen Typs.
    Object(Box<Object>),
}

impl Value {
    /// String-Inhalt, falls vorhanden.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Record, falls vorhanden.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

/// A polymorphic slot: runtime type plus record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionType {
    /// Laufzeit-Typ des Records.
    pub type_index: usize,
    /// Der Record, `None` nach Freigabe.
    pub data: Option<Box<Object>>,
}

/// Contents of one record slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field {
    /// Nicht vorhanden.
    #[default]
    Absent,
    /// Ein Wert.
    Value(Value),
    /// Wiederholtes Feld.
    Repeated(Vec<Value>),
    /// Substitution (`st`).
    Substitution(SubstitutionType),
}

impl Field {
    /// Erster bzw. einziger Wert.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Repeated(values) => values.first(),
            Self::Substitution(_) | Self::Absent => None,
        }
    }

    /// Alle Werte eines wiederholten Felds.
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Value(v) => core::slice::from_ref(v),
            Self::Repeated(values) => values,
            _ => &[],
        }
    }

    /// `true` für [`Field::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// A record of a complex schema type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Laufzeit-Typ (Wurzel-Eintrag).
    pub type_index: usize,
    /// Boolean-Felder, Bit = `offset` des Eintrags.
    pub flags: u32,
    /// Ein Slot pro Feld.
    pub slots: Vec<Field>,
}

impl Object {
    /// Leerer Record vom Typ `ty`.
    pub fn new(schema: &Schema, ty: usize) -> Self {
        let type_index = schema.resolve(ty);
        Self {
            type_index,
            flags: 0,
            slots: vec![Field::Absent; schema.entry(type_index).size()],
        }
    }

    /// Slot eines Felds per Name.
    pub fn field(&self, schema: &Schema, name: &str) -> Option<&Field> {
        let index = schema.field_index(self.type_index, name)?;
        self.slots.get(schema.entry(index).offset())
    }

    /// Erster Wert eines Felds per Name.
    pub fn get(&self, schema: &Schema, name: &str) -> Option<&Value> {
        self.field(schema, name)?.value()
    }

    /// Boolean-Feld per Name.
    pub fn flag(&self, schema: &Schema, name: &str) -> Option<bool> {
        let index = schema.field_index(self.type_index, name)?;
        let entry = schema.entry(index);
        matches!(entry.simple_type().map(|t| t.xs_type()), Some(XsType::Boolean))
            .then(|| self.flags & (1 << entry.offset()) != 0)
    }

    /// Setzt das Flag-Bit eines Boolean-Felds.
    pub fn set_flag(&mut self, entry: &SchemaEntry, on: bool) {
        if on {
            self.flags |= 1 << entry.offset();
        }
    }

    /// Legt einen Wert im Slot von `entry` ab.
    ///
    /// Substitutions-Slots nehmen den Laufzeit-Typ des Records auf,
    /// wiederholte Felder hängen an, alle anderen ersetzen.
    pub fn store(&mut self, entry: &SchemaEntry, value: Value) {
        let Some(slot) = self.slots.get_mut(entry.offset()) else {
            return;
        };
        if entry.st {
            if let Value::Object(obj) = value {
                *slot = Field::Substitution(SubstitutionType {
                    type_index: obj.type_index,
                    data: Some(obj),
                });
                return;
            }
            *slot = Field::Value(value);
        } else if entry.is_repeated() {
            match slot {
                Field::Repeated(values) => values.push(value),
                _ => *slot = Field::Repeated(vec![value]),
            }
        } else {
            *slot = Field::Value(value);
        }
    }
}

/// Top-level decode result: global element plus its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Index des globalen Elements.
    pub element: usize,
    /// Der Record.
    pub object: Box<Object>,
}

impl Document {
    /// Name des Wurzelelements.
    pub fn name(&self, schema: &Schema) -> &'static str {
        schema.se_name(self.element)
    }
}

/// Gibt die Nutzlasten eines Records frei, nicht den Record selbst.
///
/// Läuft über die Felder des vom Aufrufer angegebenen Typs `ty`, verschachtelte
/// Records über ihren eigenen `type_index`.
pub fn free_object_elements(obj: &mut Object, ty: usize, schema: &Schema) -> usize {
    let mut released = 0;
    for index in schema.fields(ty) {
        let entry = schema.entry(index);
        let Some(slot) = obj.slots.get_mut(entry.offset()) else {
            continue;
        };
        if let Some(simple) = entry.simple_type() {
            if simple.xs_type().is_pointer() && simple.length() == 0 {
                released += slot.values().len();
                *slot = Field::Absent;
            }
        } else if entry.st {
            if let Field::Substitution(st) = slot {
                if let Some(mut data) = st.data.take() {
                    released += free_object_elements(&mut data, st.type_index, schema) + 1;
                }
            }
        } else if entry.index().is_some() {
            // verschachtelte Records laufen über ihren eigenen Typ
            if entry.unbounded {
                // Listenknoten: Record + Knoten
                if let Field::Repeated(nodes) = core::mem::take(slot) {
                    for node in nodes {
                        if let Value::Object(mut data) = node {
                            let ty = data.type_index;
                            released += free_object_elements(&mut data, ty, schema) + 1;
                        }
                    }
                }
            } else {
                // eingebettete Records
                match slot {
                    Field::Value(Value::Object(data)) => {
                        let ty = data.type_index;
                        released += free_object_elements(data, ty, schema);
                    }
                    Field::Repeated(values) => {
                        for value in values {
                            if let Value::Object(data) = value {
                                let ty = data.type_index;
                                released += free_object_elements(data, ty, schema);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    released
}

/// Gibt Nutzlasten und Record frei. `None` ist ein No-op.
pub fn free_object(obj: Option<Box<Object>>, ty: usize, schema: &Schema) -> usize {
    match obj {
        Some(mut obj) => free_object_elements(&mut obj, ty, schema) + 1,
        None => 0,
    }
}

/// Ersetzt `dest` durch `src`: Nutzlasten von `dest` freigeben, Inhalt
/// von `src` übernehmen, Container von `src` verwerfen.
pub fn replace_object(dest: &mut Object, src: Box<Object>, ty: usize, schema: &Schema) -> usize {
    let released = free_object_elements(dest, ty, schema);
    *dest = *src;
    released
}
