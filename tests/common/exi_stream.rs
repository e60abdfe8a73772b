// EXI-Testvektoren für das kompilierte IEEE 2030.5 Schema.
//
// Wird per `include!` eingebunden. Benötigte Imports:
//   use sep2_parse::bitstream::BitWriter;
//   use sep2_parse::sample::SCHEMA;
//   use sep2_parse::string_table::StringTables;
//   use sep2_parse::{binary, bit_width, header, integer, string, unsigned_integer};
//
// Der Builder führt dieselbe Position (`se`, `count`) wie der Parser und
// wählt Event Codes relativ dazu: im Sequence-Zustand (`count > 0`) mit
// `n` des wiederholten Felds, sonst mit `n = 1` für Pflichtfelder und den
// Sentinel. Strings gehen über dieselben Tabellen wie im Decoder.

#[allow(dead_code)]
struct Cursor {
    ty: usize,
    se: usize,
    count: u32,
}

#[allow(dead_code)]
struct ExiStream {
    w: BitWriter,
    tables: StringTables,
    stack: Vec<Cursor>,
}

#[allow(dead_code)]
impl ExiStream {
    /// Header (optional mit Cookie) und globales Element.
    fn start_with(root: &str, cookie: bool) -> Self {
        let mut w = BitWriter::new();
        header::encode(&mut w, SCHEMA.schema_id, cookie);
        let global = SCHEMA.element_index(root).expect("globales Element");
        w.write_bits(global as u32, bit_width::for_value(SCHEMA.length as u32));
        let ty = SCHEMA.resolve(global);
        Self {
            w,
            tables: StringTables::new(8, 32),
            stack: vec![Cursor { ty, se: ty + 1, count: 0 }],
        }
    }

    fn start(root: &str) -> Self {
        Self::start_with(root, false)
    }

    fn alternatives(se: usize, count: u32) -> u32 {
        let entry = SCHEMA.entry(se);
        if entry.is_end() || count < u32::from(entry.min) { 1 } else { u32::from(entry.n) }
    }

    /// Event Code `token`; `token == n` ist die Erweiterung.
    fn event(&mut self, se: usize, count: u32, token: u32) {
        let n = Self::alternatives(se, count);
        assert!(token <= n, "Code {token} an {se} mit n = {n}");
        self.w.write_bits(token, bit_width::for_value(n));
    }

    fn top(&mut self) -> &mut Cursor {
        self.stack.last_mut().expect("offener Record")
    }

    /// Wählt das Feld `name` des aktuellen Records.
    fn goto(&mut self, name: &str) -> usize {
        let (ty, se, count) = {
            let c = self.top();
            (c.ty, c.se, c.count)
        };
        let target = SCHEMA.field_index(ty, name).expect("Feld im Typ");
        assert!(target >= se, "'{name}' liegt vor der aktuellen Position");
        assert!(((target - se) as u32) < Self::alternatives(se, count), "'{name}' ist von {se} aus nicht erreichbar");
        self.event(se, count, (target - se) as u32);
        let c = self.top();
        if target != c.se {
            c.se = target;
            c.count = 0;
        }
        target
    }

    fn after_field(&mut self) {
        let c = self.top();
        c.count += 1;
        if !SCHEMA.entry(c.se).allows_more(c.count) {
            c.se += 1;
            c.count = 0;
        }
    }

    /// Feld wählen, Inhalt schreiben, Feld abschließen.
    fn leaf(&mut self, name: &str, body: impl FnOnce(&mut Self, usize)) {
        let se = self.goto(name);
        let attribute = SCHEMA.entry(se).attribute;
        if !attribute {
            self.w.write_bit(false); // CH
        }
        body(self, se);
        if !attribute {
            self.w.write_bit(false); // EE
        }
        self.after_field();
    }

    fn string_value(&mut self, se: usize, value: &str) {
        let name = SCHEMA.se_name(se);
        if let Some(id) = self.tables.local_position(name, value) {
            let size = self.tables.local_len(name);
            string::encode_compact_id(&mut self.w, false, id, size);
        } else if let Some(id) = self.tables.global_position(value) {
            let size = self.tables.global_len();
            string::encode_compact_id(&mut self.w, true, id, size);
        } else {
            string::encode_literal(&mut self.w, value);
            self.tables.add(name, value);
        }
    }

    fn string(&mut self, name: &str, value: &str) -> &mut Self {
        self.leaf(name, |s, se| s.string_value(se, value));
        self
    }

    fn signed(&mut self, name: &str, value: i64) -> &mut Self {
        self.leaf(name, |s, _| integer::encode(&mut s.w, value));
        self
    }

    fn unsigned(&mut self, name: &str, value: u64) -> &mut Self {
        self.leaf(name, |s, _| unsigned_integer::encode(&mut s.w, value));
        self
    }

    fn ubyte(&mut self, name: &str, value: u8) -> &mut Self {
        self.leaf(name, |s, _| s.w.write_bits(u32::from(value), 8));
        self
    }

    fn boolean(&mut self, name: &str, value: bool) -> &mut Self {
        self.leaf(name, |s, _| s.w.write_bit(value));
        self
    }

    fn binary(&mut self, name: &str, value: &[u8]) -> &mut Self {
        self.leaf(name, |s, _| binary::encode(&mut s.w, value));
        self
    }

    /// Beginnt ein Feld mit komplexem Typ.
    fn begin(&mut self, name: &str) -> &mut Self {
        let se = self.goto(name);
        let ty = SCHEMA.resolve(SCHEMA.entry(se).index().expect("komplexes Feld"));
        self.stack.push(Cursor { ty, se: ty + 1, count: 0 });
        self
    }

    /// Beginnt ein Feld mit komplexem Typ und `xsi:type`.
    fn begin_as(&mut self, name: &str, type_name: &str) -> &mut Self {
        let se = self.goto(name);
        let declared = SCHEMA.resolve(SCHEMA.entry(se).index().expect("komplexes Feld"));
        self.xsi_type(declared, type_name);
        let ty = SCHEMA.type_by_name(type_name).expect("Typname");
        self.stack.push(Cursor { ty, se: ty + 1, count: 0 });
        self
    }

    /// Erweiterungscode am ersten Feld von `declared` plus `xsi:type`.
    fn xsi_type(&mut self, declared: usize, type_name: &str) {
        let first = declared + 1;
        self.event(first, 0, Self::alternatives(first, 0));
        self.w.write_bits(0, 3);
        self.w.write_bits(5, 3);
        unsigned_integer::encode(&mut self.w, 0u8);
        let index = SCHEMA.local_name_index(type_name).expect("lokaler Name");
        self.w.write_bits(index as u32, bit_width::for_value(SCHEMA.count() as u32));
    }

    /// Schließt den aktuellen Record.
    fn end(&mut self) -> &mut Self {
        let c = self.stack.pop().expect("offener Record");
        let sentinel = SCHEMA.fields(c.ty).last().map_or(c.ty + 1, |last| last + 1);
        assert!(((sentinel - c.se) as u32) < Self::alternatives(c.se, c.count), "Pflichtfeld an {} fehlt", c.se);
        self.event(c.se, c.count, (sentinel - c.se) as u32);
        if !self.stack.is_empty() {
            self.after_field();
        }
        self
    }

    fn finish(mut self) -> Vec<u8> {
        while !self.stack.is_empty() {
            self.end();
        }
        self.w.into_vec()
    }
}

/// Vollständiges EndDevice mit allen Feldern.
#[allow(dead_code)]
fn end_device_stream() -> Vec<u8> {
    let mut s = ExiStream::start("EndDevice");
    s.string("href", "/edev/3")
        .signed("changedTime", 1_379_656_800)
        .boolean("enabled", true)
        .binary("lFDI", &LFDI)
        .string("mfModel", "Model-X")
        .unsigned("sFDI", 167_261_211_391)
        .string("supportedLocale", "en_US")
        .string("supportedLocale", "de_DE")
        .string("supportedLocale", "en_US");
    s.finish()
}

#[allow(dead_code)]
const LFDI: [u8; 20] = [
    0x3E, 0x4F, 0x45, 0xAB, 0x31, 0xED, 0xFE, 0x5B, 0x67, 0xE3, 0x43, 0xE5, 0xE4, 0x56, 0x2E, 0x31, 0x98,
    0x4E, 0x23, 0xE5,
];
