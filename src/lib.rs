//! # sqlpig
//!
//! Translates a subset of SQL `SELECT` statements into Pig Latin scripts
//! that run over a fixed log dataset.
//!
//! ## Quick Example
//!
//! ```rust
//! let script = sqlpig::translate("select a from b where c = 1").unwrap();
//! let last = script.statements().last().unwrap();
//! assert_eq!(last, "C = FILTER B BY c = 1;");
//! ```
//!
//! ## Translation
//!
//! | SQL clause  | Pig Latin                                   |
//! |-------------|---------------------------------------------|
//! | (always)    | `register` lines, `LOAD`, `FOREACH FLATTEN` |
//! | `WHERE`     | `FILTER .. BY`                              |
//! | `GROUP BY`  | `GROUP .. BY (..)`                          |
//!
//! `HAVING`, `ORDER BY`, `LIMIT`, compound selects, joins and sub-selects
//! parse, but produce no statements.

pub mod ast;
pub mod config;
pub mod error;
pub mod parser;
pub mod symbols;
pub mod translator;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::PigConfig;
    pub use crate::error::*;
    pub use crate::parser::{Grammar, parse};
    pub use crate::symbols::{SymbolGenerator, SymbolScheme};
    pub use crate::translator::{LoadWindow, PigScript, ToPig, Translator};
}

use crate::config::PigConfig;
use crate::error::PigResult;
use crate::parser::Grammar;
use crate::translator::{LoadWindow, PigScript, Translator};

/// Parse a SQL `SELECT` statement into its AST.
///
/// # Example
///
/// ```
/// use sqlpig::parse;
///
/// let stmt = parse("select uri from logs group by uri").unwrap();
/// assert_eq!(stmt.group_terms().unwrap().len(), 1);
/// ```
pub fn parse(input: &str) -> PigResult<ast::SelectStmt> {
    parser::parse(input)
}

/// Translate with the default configuration and no date window.
pub fn translate(sql: &str) -> PigResult<PigScript> {
    translate_with(
        Grammar::shared(),
        &PigConfig::default(),
        sql,
        &LoadWindow::default(),
    )
}

/// Parse and translate in one step.
pub fn translate_with(
    grammar: &Grammar,
    config: &PigConfig,
    sql: &str,
    window: &LoadWindow,
) -> PigResult<PigScript> {
    let stmt = grammar.parse(sql)?;
    Translator::new(config).translate(&stmt, window)
}
