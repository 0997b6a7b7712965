//! Relation symbol generation.
//!
//! Every emitted statement names a new relation. Names come from a strictly
//! increasing counter; the generator remembers the two most recent names so
//! a statement can refer to the relation it derives from.

use serde::{Deserialize, Serialize};

/// How a counter value maps to a relation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolScheme {
    /// `A`..`Y` for 1..=25, then a wrapped letter followed by `n / 26`
    /// (`26` -> `A1`, `27` -> `B1`, `51` -> `Z1`, `52` -> `A2`).
    #[default]
    Legacy,
    /// Spreadsheet-style base 26: `A`..`Z`, `AA`, `AB`, ...
    Alphabetic,
}

impl SymbolScheme {
    pub fn name(&self, n: usize) -> String {
        match self {
            SymbolScheme::Legacy => legacy_name(n),
            SymbolScheme::Alphabetic => alphabetic_name(n),
        }
    }
}

fn letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

fn legacy_name(n: usize) -> String {
    if n < 26 {
        letter(n.saturating_sub(1)).to_string()
    } else {
        format!("{}{}", letter(n % 26), n / 26)
    }
}

fn alphabetic_name(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(letter(n % 26));
        n /= 26;
    }
    out.iter().rev().collect()
}

/// Per-translation symbol state. Never share one across translations.
#[derive(Debug, Clone, Default)]
pub struct SymbolGenerator {
    scheme: SymbolScheme,
    counter: usize,
    current: Option<String>,
    last: Option<String>,
    released: Vec<String>,
}

impl SymbolGenerator {
    pub fn new(scheme: SymbolScheme) -> Self {
        Self {
            scheme,
            ..Self::default()
        }
    }

    /// Allocate the next symbol. The previous current symbol becomes `last`.
    pub fn next_symbol(&mut self) -> String {
        self.counter += 1;
        let symbol = self.scheme.name(self.counter);
        self.last = self.current.replace(symbol.clone());
        symbol
    }

    /// Allocate the next symbol and return it with the one it supersedes.
    pub fn next_and_last_symbol(&mut self) -> (String, Option<String>) {
        let symbol = self.next_symbol();
        (symbol, self.last.clone())
    }

    /// Record a symbol as reusable. The pool is kept for callers that track
    /// relation lifetimes; allocation never draws from it.
    pub fn release_symbol(&mut self, symbol: impl Into<String>) {
        self.released.push(symbol.into());
    }

    pub fn released(&self) -> &[String] {
        &self.released
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Number of symbols allocated so far.
    pub fn count(&self) -> usize {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_symbols_are_letters() {
        let mut symbols = SymbolGenerator::default();
        let names: Vec<String> = (0..4).map(|_| symbols.next_symbol()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert_eq!(symbols.count(), 4);
    }

    #[test]
    fn test_next_and_last() {
        let mut symbols = SymbolGenerator::default();
        assert_eq!(symbols.next_and_last_symbol(), ("A".to_string(), None));
        assert_eq!(
            symbols.next_and_last_symbol(),
            ("B".to_string(), Some("A".to_string()))
        );
        assert_eq!(symbols.current(), Some("B"));
        assert_eq!(symbols.last(), Some("A"));
    }

    #[test]
    fn test_legacy_scheme_past_25() {
        let scheme = SymbolScheme::Legacy;
        assert_eq!(scheme.name(25), "Y");
        assert_eq!(scheme.name(26), "A1");
        assert_eq!(scheme.name(27), "B1");
        assert_eq!(scheme.name(51), "Z1");
        assert_eq!(scheme.name(52), "A2");
    }

    #[test]
    fn test_alphabetic_scheme() {
        let scheme = SymbolScheme::Alphabetic;
        assert_eq!(scheme.name(1), "A");
        assert_eq!(scheme.name(26), "Z");
        assert_eq!(scheme.name(27), "AA");
        assert_eq!(scheme.name(52), "AZ");
        assert_eq!(scheme.name(703), "AAA");
    }

    #[test]
    fn test_names_are_unique() {
        for scheme in [SymbolScheme::Legacy, SymbolScheme::Alphabetic] {
            let names: std::collections::HashSet<String> =
                (1..2000).map(|n| scheme.name(n)).collect();
            assert_eq!(names.len(), 1999, "{:?}", scheme);
        }
    }

    #[test]
    fn test_released_symbols_are_not_reused() {
        let mut symbols = SymbolGenerator::default();
        let a = symbols.next_symbol();
        symbols.release_symbol(a.clone());
        assert_eq!(symbols.released(), &[a]);
        assert_eq!(symbols.next_symbol(), "B");
    }
}
