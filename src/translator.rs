//! Pig Latin translator for the SQL AST.
//!
//! Emits one statement per recognised clause, in a fixed order:
//! registration, load (plus the flatten of the nested field), `FILTER` for
//! `WHERE`, `GROUP` for `GROUP BY`. Each statement after the load names a
//! fresh relation and reads from the one emitted just before it.

use serde::Serialize;
use tracing::{debug, warn};

use crate::ast::*;
use crate::config::PigConfig;
use crate::error::{PigError, PigResult};
use crate::symbols::SymbolGenerator;

/// Trait for rendering AST nodes as Pig Latin text.
pub trait ToPig {
    fn to_pig(&self) -> String;
}

/// Operators and literals pass through with their SQL spelling.
impl ToPig for Expr {
    fn to_pig(&self) -> String {
        self.to_tree().render()
    }
}

impl ToPig for OrderingTerm {
    fn to_pig(&self) -> String {
        self.to_tree().render()
    }
}

/// Optional narrowing of the load path to one day, or one hour of a day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadWindow {
    pub date: Option<String>,
    pub hour: Option<String>,
}

impl LoadWindow {
    pub fn new(date: Option<String>, hour: Option<String>) -> Self {
        Self { date, hour }
    }

    /// Path suffix: `/<date>` and, with a date, `/<hour>.*`.
    fn suffix(&self) -> String {
        let Some(date) = &self.date else {
            if self.hour.is_some() {
                warn!("hour given without a date; ignoring it");
            }
            return String::new();
        };
        match &self.hour {
            Some(hour) => format!("/{}/{}.*", date, hour),
            None => format!("/{}", date),
        }
    }
}

/// The ordered statements of one translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PigScript {
    pub statements: Vec<String>,
}

impl PigScript {
    pub fn statements(&self) -> &[String] {
        &self.statements
    }
}

impl std::fmt::Display for PigScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

/// Translates one statement. Holds the symbol state for that translation
/// only; build a new translator for every query.
pub struct Translator<'c> {
    config: &'c PigConfig,
    symbols: SymbolGenerator,
}

impl<'c> Translator<'c> {
    pub fn new(config: &'c PigConfig) -> Self {
        Self {
            config,
            symbols: SymbolGenerator::new(config.symbol_scheme),
        }
    }

    /// Emit the full script. Validation runs first, so a rejected query
    /// produces no statements at all.
    pub fn translate(mut self, stmt: &SelectStmt, window: &LoadWindow) -> PigResult<PigScript> {
        if self.config.check_fields {
            self.check_fields(stmt)?;
        }
        self.check_untranslated(stmt)?;

        let mut statements = self.gen_register();
        statements.extend(self.basic_load(window)?);
        if let Some(filter) = self.where_filter(stmt)? {
            statements.push(filter);
        }
        if let Some(group) = self.group_by(stmt)? {
            statements.push(group);
        }

        debug!(
            statements = statements.len(),
            symbols = self.symbols.count(),
            "translated query"
        );
        Ok(PigScript { statements })
    }

    /// Reject the first column reference outside the field whitelist.
    /// Looks at the select list, the `WHERE` predicate and the grouping terms.
    pub fn check_fields(&self, stmt: &SelectStmt) -> PigResult<()> {
        let selected = stmt.columns().iter().filter_map(|c| match c {
            ResultColumn::Expr { expr, .. } => Some(expr),
            ResultColumn::Star | ResultColumn::TableStar(_) => None,
        });
        let grouped = stmt.group_terms().unwrap_or_default().iter().map(|t| &t.expr);

        for expr in selected.chain(stmt.where_expr()).chain(grouped) {
            if let Some(field) = expr
                .column_names()
                .into_iter()
                .find(|name| !self.config.is_allowed_field(name))
            {
                return Err(PigError::Field(field.to_string()));
            }
        }
        Ok(())
    }

    fn check_untranslated(&self, stmt: &SelectStmt) -> PigResult<()> {
        for clause in untranslated_clauses(stmt) {
            if self.config.reject_unsupported {
                return Err(PigError::unsupported(clause));
            }
            warn!(clause, "clause is not translated; omitting it");
        }
        Ok(())
    }

    fn gen_register(&self) -> Vec<String> {
        self.config
            .jars
            .iter()
            .map(|jar| format!("register '{}';", jar))
            .collect()
    }

    /// Load the dataset, then flatten its nested field into a new relation.
    fn basic_load(&mut self, window: &LoadWindow) -> PigResult<[String; 2]> {
        let load = format!(
            "{} = LOAD '{}{}' USING {}('{}');",
            self.symbols.next_symbol(),
            self.config.load_path,
            window.suffix(),
            self.config.loader,
            self.config.schema_class,
        );
        let (symbol, source) = self.derive()?;
        let flatten = format!(
            "{} = FOREACH {} GENERATE FLATTEN({});",
            symbol, source, self.config.flatten_field
        );
        debug!(%load, %flatten, "emitted load");
        Ok([load, flatten])
    }

    fn where_filter(&mut self, stmt: &SelectStmt) -> PigResult<Option<String>> {
        let Some(predicate) = stmt.where_expr() else {
            return Ok(None);
        };
        let (symbol, source) = self.derive()?;
        let filter = format!("{} = FILTER {} BY {};", symbol, source, predicate.to_pig());
        debug!(%filter, "emitted filter");
        Ok(Some(filter))
    }

    fn group_by(&mut self, stmt: &SelectStmt) -> PigResult<Option<String>> {
        let Some(terms) = stmt.group_terms() else {
            return Ok(None);
        };
        let terms: Vec<String> = terms.iter().map(ToPig::to_pig).collect();
        let (symbol, source) = self.derive()?;
        let group = format!("{} = GROUP {} BY ({});", symbol, source, terms.join(", "));
        debug!(%group, "emitted group");
        Ok(Some(group))
    }

    /// Allocate a relation derived from the previous one.
    fn derive(&mut self) -> PigResult<(String, String)> {
        let (symbol, source) = self.symbols.next_and_last_symbol();
        let source = source
            .ok_or_else(|| PigError::Internal(format!("relation {} has no source", symbol)))?;
        Ok((symbol, source))
    }
}

/// Clauses that parse but have no translation rule.
fn untranslated_clauses(stmt: &SelectStmt) -> Vec<&'static str> {
    let mut clauses = Vec::new();
    if stmt.having_expr().is_some() {
        clauses.push("HAVING");
    }
    if stmt.order_by_terms().is_some() {
        clauses.push("ORDER BY");
    }
    if stmt.limit_terms().is_some() {
        clauses.push("LIMIT");
    }
    if !stmt.compounds.is_empty() {
        clauses.push("compound SELECT");
    }
    if stmt.core.from.as_ref().is_some_and(|from| !from.is_single_table()) {
        clauses.push("join or sub-select source");
    }
    if stmt.where_expr().is_some_and(Expr::has_subquery) {
        clauses.push("sub-select in WHERE");
    }
    clauses
}
