//! Compiled schema model.
//!
//! Ein [`Schema`] ist ein festes, vorab kompiliertes Artefakt: eine Tabelle
//! von [`SchemaEntry`]s, in der jeder komplexe Typ ein zusammenhängender
//! Lauf ist:
//!
//! ```text
//! entries[0..length]        globale Elemente (ty = Index(Typ))
//! entries[t]                Wurzel-Eintrag des Typs t (Size, Index(Basis))
//! entries[t+1..]            Felder (Offset, Typ)
//! entries[..]               Sentinel (n == 0)
//! ```
//!
//! Abgeleitete Typen enthalten die geerbten Felder der Basis als Präfix,
//! der Wurzel-Eintrag verweist über `index` auf den Wurzel-Eintrag der Basis
//! (0 = keine Basis). Die Ableitungskette ist einfach verkettet.

use core::fmt;

use crate::bit_width;

/// Simple types known to the compiled schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum XsType {
    /// Kein Typ.
    Null = 0,
    /// xs:string, optional mit fester Kapazität.
    String = 1,
    /// xs:boolean, als Bit im Flag-Wort des Records.
    Boolean = 2,
    /// xs:hexBinary mit fester Länge.
    HexBinary = 3,
    /// xs:anyURI.
    AnyUri = 4,
    /// xs:long.
    Long = 5,
    /// xs:int.
    Int = 6,
    /// xs:short.
    Short = 7,
    /// xs:byte.
    Byte = 8,
    /// xs:unsignedLong.
    ULong = 9,
    /// xs:unsignedInt.
    UInt = 10,
    /// xs:unsignedShort.
    UShort = 11,
    /// xs:unsignedByte.
    UByte = 12,
}

impl XsType {
    const fn from_nibble(nibble: u16) -> Self {
        match nibble {
            1 => Self::String,
            2 => Self::Boolean,
            3 => Self::HexBinary,
            4 => Self::AnyUri,
            5 => Self::Long,
            6 => Self::Int,
            7 => Self::Short,
            8 => Self::Byte,
            9 => Self::ULong,
            10 => Self::UInt,
            11 => Self::UShort,
            12 => Self::UByte,
            _ => Self::Null,
        }
    }

    /// XML Schema Name des Typs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::HexBinary => "hexBinary",
            Self::AnyUri => "anyURI",
            Self::Long => "long",
            Self::Int => "int",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::ULong => "unsignedLong",
            Self::UInt => "unsignedInt",
            Self::UShort => "unsignedShort",
            Self::UByte => "unsignedByte",
        }
    }

    /// `true` für Typen, deren Wert außerhalb des Records alloziert wird.
    pub fn is_pointer(self) -> bool {
        matches!(self, Self::String | Self::AnyUri)
    }
}

/// Simple-type tag: low nibble = [`XsType`], bits above = declared length.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimpleType(u16);

impl SimpleType {
    /// Tag ohne Längenangabe.
    pub const fn new(xs: XsType) -> Self {
        Self(xs as u16)
    }

    /// Tag mit fester Länge (String-Kapazität bzw. hexBinary-Länge).
    pub const fn with_length(xs: XsType, length: u16) -> Self {
        Self((length << 4) | xs as u16)
    }

    /// Der Basistyp.
    pub const fn xs_type(self) -> XsType {
        XsType::from_nibble(self.0 & 0xF)
    }

    /// Deklarierte Länge, 0 wenn keine.
    pub const fn length(self) -> usize {
        (self.0 >> 4) as usize
    }

    /// Rohwert des Tags.
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.length() {
            0 => write!(f, "{:?}", self.xs_type()),
            n => write!(f, "{:?}[{n}]", self.xs_type()),
        }
    }
}

/// Offset of a field within its record, or size of a record.
///
/// Welche Bedeutung gilt, ergibt sich aus der Position im Lauf: der
/// Wurzel-Eintrag eines Typs trägt `Size`, Felder tragen `Offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Slot-Index im Record, bei Booleans das Bit im Flag-Wort.
    Offset(u16),
    /// Anzahl Slots eines Records.
    Size(u16),
}

/// Type of a field, or base of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    /// Simple type.
    Simple(SimpleType),
    /// Index eines Eintrags: Feldtyp bzw. Basis-Typ beim Wurzel-Eintrag.
    Index(u16),
}

/// One field, alternative position, record root or sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaEntry {
    /// Offset oder Größe.
    pub placement: Placement,
    /// Typ oder Index.
    pub ty: TypeRef,
    /// Minimale Vorkommen.
    pub min: u8,
    /// Maximale Vorkommen (bei `unbounded` ohne Bedeutung).
    pub max: u8,
    /// Anzahl Alternativen an dieser Position, 0 = Sentinel.
    pub n: u8,
    /// Bitbreite für `n`.
    pub bit: u8,
    /// Slot hält eine Substitution (Laufzeit-Typ + Record).
    pub st: bool,
    /// XML-Attribut statt Element.
    pub attribute: bool,
    /// Beliebig viele Vorkommen.
    pub unbounded: bool,
}

impl SchemaEntry {
    const fn base(placement: Placement, ty: TypeRef, min: u8, max: u8, n: u8) -> Self {
        Self {
            placement,
            ty,
            min,
            max,
            n,
            bit: bit_width::for_value(n as u32),
            st: false,
            attribute: false,
            unbounded: false,
        }
    }

    /// Globales Element vom Typ `ty`.
    pub const fn element(ty: u16) -> Self {
        Self::base(Placement::Size(0), TypeRef::Index(ty), 1, 1, 1)
    }

    /// Wurzel-Eintrag eines Typs mit `size` Slots und Basis `base` (0 = keine).
    pub const fn root(size: u16, base: u16) -> Self {
        Self::base(Placement::Size(size), TypeRef::Index(base), 1, 1, 1)
    }

    /// Simple-Type Element-Feld.
    pub const fn simple(offset: u16, ty: SimpleType, min: u8, max: u8, n: u8) -> Self {
        Self::base(Placement::Offset(offset), TypeRef::Simple(ty), min, max, n)
    }

    /// Element-Feld mit komplexem Typ.
    pub const fn complex(offset: u16, ty: u16, min: u8, max: u8, n: u8) -> Self {
        Self::base(Placement::Offset(offset), TypeRef::Index(ty), min, max, n)
    }

    /// Attribut-Feld (höchstens ein Vorkommen).
    pub const fn attribute(offset: u16, ty: SimpleType, min: u8, n: u8) -> Self {
        let mut entry = Self::simple(offset, ty, min, 1, n);
        entry.attribute = true;
        entry
    }

    /// Sentinel am Ende eines Laufs.
    pub const fn end() -> Self {
        Self::base(Placement::Offset(0), TypeRef::Index(0), 0, 0, 0)
    }

    /// Markiert das Feld als unbeschränkt wiederholbar.
    pub const fn unbounded(mut self) -> Self {
        self.unbounded = true;
        self
    }

    /// Markiert den Slot als Substitution.
    pub const fn substitution(mut self) -> Self {
        self.st = true;
        self
    }

    /// `true` für den Sentinel.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.n == 0
    }

    /// Simple type des Felds, falls vorhanden.
    #[inline]
    pub fn simple_type(&self) -> Option<SimpleType> {
        match self.ty {
            TypeRef::Simple(ty) => Some(ty),
            TypeRef::Index(_) => None,
        }
    }

    /// Typ- bzw. Basis-Index, falls kein Simple Type.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        match self.ty {
            TypeRef::Index(index) => Some(index as usize),
            TypeRef::Simple(_) => None,
        }
    }

    /// Slot-Index (bzw. Flag-Bit) eines Felds.
    #[inline]
    pub fn offset(&self) -> usize {
        match self.placement {
            Placement::Offset(offset) => offset as usize,
            Placement::Size(_) => 0,
        }
    }

    /// Slot-Anzahl eines Wurzel-Eintrags.
    #[inline]
    pub fn size(&self) -> usize {
        match self.placement {
            Placement::Size(size) => size as usize,
            Placement::Offset(_) => 0,
        }
    }

    /// `true` wenn mehr als ein Vorkommen erlaubt ist.
    #[inline]
    pub fn is_repeated(&self) -> bool {
        self.unbounded || self.max > 1
    }

    /// `true` wenn nach `count` Vorkommen ein weiteres erlaubt ist.
    #[inline]
    pub fn allows_more(&self, count: u32) -> bool {
        self.unbounded || count < u32::from(self.max)
    }
}

/// A compiled schema (read-only, `'static` tables).
#[derive(Debug)]
pub struct Schema {
    /// Target namespace.
    pub namespace: &'static str,
    /// schemaId des EXI Options-Dokuments.
    pub schema_id: &'static str,
    /// Anzahl globaler Elemente (= Länge von `elements`).
    pub length: usize,
    /// Sortierte lokale Namen aller Felder und Typen.
    pub names: &'static [&'static str],
    /// Typ-Index je Eintrag in `names`, 0 wenn der Name keinen Typ bezeichnet.
    pub types: &'static [u16],
    /// Alle Einträge.
    pub entries: &'static [SchemaEntry],
    /// Sortierte Namen der globalen Elemente.
    pub elements: &'static [&'static str],
    /// Index in `names` für jeden Eintrag ab `length`.
    pub ids: &'static [u16],
}

impl Schema {
    /// Anzahl lokaler Namen.
    #[inline]
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// Eintrag an Position `index`.
    #[inline]
    pub fn entry(&self, index: usize) -> &SchemaEntry {
        &self.entries[index]
    }

    /// Bildet ein globales Element auf seinen Typ ab, andere Indizes bleiben.
    #[inline]
    pub fn resolve(&self, ty: usize) -> usize {
        if ty < self.length {
            self.entries[ty].index().unwrap_or(ty)
        } else {
            ty
        }
    }

    /// Erstes Feld eines Typs (bzw. des Typs eines globalen Elements).
    #[inline]
    pub fn first_field(&self, ty: usize) -> usize {
        self.resolve(ty) + 1
    }

    /// Ist `ty` gleich `base` oder davon abgeleitet?
    ///
    /// Folgt der Basis-Kette der Wurzel-Einträge bis `base` oder bis zum
    /// Ende der Kette (Index 0). Simple Types sind nie Teil einer Kette.
    pub fn is_a(&self, ty: usize, base: usize) -> bool {
        let base = self.resolve(base);
        let mut ty = self.resolve(ty);
        // Die Kette ist höchstens so lang wie die Tabelle
        for _ in 0..self.entries.len() {
            if ty == base {
                return true;
            }
            match self.entries.get(ty).and_then(SchemaEntry::index) {
                Some(next) if next != 0 => ty = next,
                _ => return false,
            }
        }
        false
    }

    /// Größe eines Objekts vom Typ `ty`.
    ///
    /// Simple Types: Speicherbreite in Bytes (Strings mit fester Kapazität
    /// und hexBinary: deklarierte Länge, sonst Zeigergröße). Komplexe
    /// Typen: Anzahl Slots des Records.
    pub fn object_size(&self, ty: TypeRef) -> usize {
        match ty {
            TypeRef::Simple(simple) => match simple.xs_type() {
                XsType::String => match simple.length() {
                    0 => core::mem::size_of::<usize>(),
                    n => n,
                },
                XsType::Boolean | XsType::Null => 0,
                XsType::HexBinary => simple.length(),
                XsType::AnyUri => core::mem::size_of::<usize>(),
                XsType::Long | XsType::ULong => 8,
                XsType::Int | XsType::UInt => 4,
                XsType::Short | XsType::UShort => 2,
                XsType::Byte | XsType::UByte => 1,
            },
            TypeRef::Index(index) => self.entries[self.resolve(index as usize)].size(),
        }
    }

    /// Element- bzw. Attributname eines Eintrags.
    pub fn se_name(&self, index: usize) -> &'static str {
        if index < self.length {
            self.elements[index]
        } else {
            self.names[self.ids[index - self.length] as usize]
        }
    }

    /// Name eines Typs (komplex: Typname, global: Elementname).
    pub fn type_name(&self, ty: TypeRef) -> &'static str {
        match ty {
            TypeRef::Simple(simple) => simple.xs_type().name(),
            TypeRef::Index(index) => self.se_name(index as usize),
        }
    }

    /// Index eines globalen Elements.
    pub fn element_index(&self, name: &str) -> Option<usize> {
        self.elements.binary_search_by(|probe| (*probe).cmp(name)).ok()
    }

    /// Index eines lokalen Namens.
    pub fn local_name_index(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|probe| (*probe).cmp(name)).ok()
    }

    /// Typ-Index zu einem Typnamen.
    pub fn type_by_name(&self, name: &str) -> Option<usize> {
        let index = self.local_name_index(name)?;
        match self.types.get(index) {
            Some(&ty) if ty != 0 => Some(ty as usize),
            _ => None,
        }
    }

    /// Index des Felds `name` im Lauf des Typs `ty`.
    pub fn field_index(&self, ty: usize, name: &str) -> Option<usize> {
        self.fields(ty).find(|&i| self.se_name(i) == name)
    }

    /// Indizes aller Felder eines Typs (ohne Sentinel).
    pub fn fields(&self, ty: usize) -> impl Iterator<Item = usize> + '_ {
        let first = self.first_field(ty);
        (first..self.entries.len()).take_while(|&i| !self.entries[i].is_end())
    }
}
