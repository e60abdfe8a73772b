//! Parser options.
//!
//! IEEE 2030.5 legt die EXI-Optionen fest (ein festes Options-Dokument),
//! daher steuern diese Optionen nur lokale Ressourcen und Toleranzen.
//!
//! # Beispiel
//!
//! ```
//! use sep2_parse::ParserOptions;
//!
//! let opts = ParserOptions::default()
//!     .with_max_depth(8)
//!     .without_cookie();
//!
//! assert_eq!(opts.max_depth(), 8);
//! assert!(!opts.accept_cookie());
//! assert_eq!(opts.local_table_capacity(), 8);
//! ```

/// Options of one [`Parser`](crate::Parser) instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub(crate) local_table_capacity: usize,
    pub(crate) global_table_capacity: usize,
    pub(crate) max_depth: usize,
    pub(crate) accept_cookie: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            local_table_capacity: 8,
            global_table_capacity: 32,
            max_depth: 32,
            accept_cookie: true,
        }
    }
}

impl ParserOptions {
    // --- Getter ---

    /// Initiale Kapazität einer feldlokalen String-Partition.
    pub fn local_table_capacity(&self) -> usize { self.local_table_capacity }
    /// Initiale Kapazität der globalen String-Partition.
    pub fn global_table_capacity(&self) -> usize { self.global_table_capacity }
    /// Maximale Verschachtelungstiefe von Records.
    pub fn max_depth(&self) -> usize { self.max_depth }
    /// Optionales `$EXI` Cookie vor dem Header akzeptieren (EXI 5.1).
    pub fn accept_cookie(&self) -> bool { self.accept_cookie }

    // --- Builder-Setter (Fluent API) ---

    /// Setzt die Kapazität lokaler Partitionen.
    pub fn with_local_table_capacity(mut self, cap: usize) -> Self { self.local_table_capacity = cap; self }
    /// Setzt die Kapazität der globalen Partition.
    pub fn with_global_table_capacity(mut self, cap: usize) -> Self { self.global_table_capacity = cap; self }
    /// Setzt die maximale Verschachtelungstiefe.
    pub fn with_max_depth(mut self, depth: usize) -> Self { self.max_depth = depth; self }
    /// Lehnt ein `$EXI` Cookie ab.
    pub fn without_cookie(mut self) -> Self { self.accept_cookie = false; self }
}
