//! Zentrale Bitbreiten-Berechnung (EXI 6.2, 7.3).
//!
//! Zwei Sichtweisen auf dieselbe Rechnung:
//! - [`for_count`]: `⌈log₂(n)⌉`, Bits für `n` unterschiedliche Werte
//!   (Compact IDs einer Tabelle mit `n` Einträgen).
//! - [`for_value`]: Bits um den Wert `v` selbst darzustellen (Event Codes
//!   `0..=n`, wobei `n` der Extension-Code ist).

/// Berechnet die Anzahl Bits für `n` unterschiedliche Werte: `⌈log₂(n)⌉`.
///
/// - `n = 0` oder `n = 1`: 0 Bits
/// - `n = 2`: 1 Bit
/// - `n = 3..4`: 2 Bits
/// - `n = 5..8`: 3 Bits
#[inline]
pub const fn for_count(n: usize) -> u8 {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as u8
    }
}

/// Anzahl Bits um den Wert `v` darzustellen (0 für `v = 0`).
///
/// Entspricht `for_count(v + 1)`.
#[inline]
pub const fn for_value(v: u32) -> u8 {
    (u32::BITS - v.leading_zeros()) as u8
}
