use serde::{Deserialize, Serialize};

use crate::ast::expr::{Expr, Quoting};
use crate::ast::operators::{CompoundOp, JoinKind, Quantifier, SortOrder};
use crate::ast::tokens::TokenTree;

/// A full `SELECT` statement: one or more cores joined by compound
/// operators, then optional `ORDER BY` and `LIMIT`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    pub core: SelectCore,
    #[serde(default)]
    pub compounds: Vec<(CompoundOp, SelectCore)>,
    #[serde(default)]
    pub order_by: Option<Vec<OrderingTerm>>,
    #[serde(default)]
    pub limit: Option<Limit>,
}

impl SelectStmt {
    pub fn columns(&self) -> &[ResultColumn] {
        &self.core.columns
    }

    pub fn where_expr(&self) -> Option<&Expr> {
        self.core.where_expr.as_ref()
    }

    pub fn group_terms(&self) -> Option<&[OrderingTerm]> {
        self.core.group_by.as_ref().map(|g| g.terms.as_slice())
    }

    pub fn having_expr(&self) -> Option<&Expr> {
        self.core.group_by.as_ref().and_then(|g| g.having.as_ref())
    }

    pub fn order_by_terms(&self) -> Option<&[OrderingTerm]> {
        self.order_by.as_deref()
    }

    pub fn limit_terms(&self) -> Option<&Limit> {
        self.limit.as_ref()
    }
}

/// A single `SELECT ... FROM ... WHERE ... GROUP BY ...` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectCore {
    #[serde(default)]
    pub quantifier: Option<Quantifier>,
    pub columns: Vec<ResultColumn>,
    #[serde(default)]
    pub from: Option<JoinSource>,
    #[serde(default)]
    pub where_expr: Option<Expr>,
    #[serde(default)]
    pub group_by: Option<GroupBy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBy {
    pub terms: Vec<OrderingTerm>,
    #[serde(default)]
    pub having: Option<Expr>,
}

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultColumn {
    Star,
    /// `table.*`
    TableStar(String),
    Expr { expr: Expr, alias: Option<String> },
}

impl std::fmt::Display for ResultColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultColumn::Star => write!(f, "*"),
            ResultColumn::TableStar(t) => write!(f, "{}.*", t),
            ResultColumn::Expr { expr, alias: None } => write!(f, "{}", expr),
            ResultColumn::Expr {
                expr,
                alias: Some(alias),
            } => write!(f, "{} AS {}", expr, alias),
        }
    }
}

/// `single_source (join_op single_source join_constraint)*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSource {
    pub first: SingleSource,
    #[serde(default)]
    pub joins: Vec<JoinClause>,
}

impl JoinSource {
    /// True for a plain `FROM table` with no joins or sub-selects.
    pub fn is_single_table(&self) -> bool {
        self.joins.is_empty() && matches!(self.first, SingleSource::Table { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    pub op: JoinOp,
    pub source: SingleSource,
    #[serde(default)]
    pub constraint: Option<JoinConstraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinOp {
    /// `,` (cross join)
    Comma,
    Join {
        natural: bool,
        kind: Option<JoinKind>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SingleSource {
    Table {
        database: Option<String>,
        name: String,
        alias: Option<String>,
        index: Option<IndexHint>,
    },
    Subquery {
        select: Box<SelectStmt>,
        alias: Option<String>,
    },
    Join(Box<JoinSource>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexHint {
    IndexedBy(String),
    NotIndexed,
}

/// A grouping or ordering term: `expr [COLLATE name] [ASC|DESC]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingTerm {
    pub expr: Expr,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub order: Option<SortOrder>,
}

impl OrderingTerm {
    pub fn to_tree(&self) -> TokenTree {
        self.lower(Quoting::Pig)
    }

    pub fn lower(&self, quoting: Quoting) -> TokenTree {
        let mut children = vec![self.expr.lower(quoting)];
        if let Some(collation) = &self.collation {
            children.push(TokenTree::atom("COLLATE"));
            children.push(TokenTree::atom(collation));
        }
        if let Some(order) = self.order {
            children.push(TokenTree::atom(order));
        }
        TokenTree::Node(children)
    }
}

impl std::fmt::Display for OrderingTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lower(Quoting::Sql).render())
    }
}

/// `LIMIT count [OFFSET offset]`; `LIMIT offset, count` is normalised here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub count: i64,
    #[serde(default)]
    pub offset: Option<i64>,
}

fn comma_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl std::fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.core)?;
        for (op, core) in &self.compounds {
            write!(f, " {} {}", op, core)?;
        }
        if let Some(terms) = &self.order_by {
            write!(f, " ORDER BY {}", comma_list(terms))?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit.count)?;
            if let Some(offset) = limit.offset {
                write!(f, " OFFSET {}", offset)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for SelectCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SELECT ")?;
        if let Some(quantifier) = self.quantifier {
            write!(f, "{} ", quantifier)?;
        }
        write!(f, "{}", comma_list(&self.columns))?;
        if let Some(from) = &self.from {
            write!(f, " FROM {}", from)?;
        }
        if let Some(expr) = &self.where_expr {
            write!(f, " WHERE {}", expr)?;
        }
        if let Some(group) = &self.group_by {
            write!(f, " GROUP BY {}", comma_list(&group.terms))?;
            if let Some(having) = &group.having {
                write!(f, " HAVING {}", having)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for JoinSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first)?;
        for join in &self.joins {
            match &join.op {
                JoinOp::Comma => write!(f, ", {}", join.source)?,
                JoinOp::Join { natural, kind } => {
                    write!(f, " ")?;
                    if *natural {
                        write!(f, "NATURAL ")?;
                    }
                    if let Some(kind) = kind {
                        write!(f, "{} ", kind)?;
                    }
                    write!(f, "JOIN {}", join.source)?;
                }
            }
            match &join.constraint {
                Some(JoinConstraint::On(expr)) => write!(f, " ON {}", expr)?,
                Some(JoinConstraint::Using(cols)) => write!(f, " USING ({})", cols.join(", "))?,
                None => {}
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for SingleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SingleSource::Table {
                database,
                name,
                alias,
                index,
            } => {
                if let Some(db) = database {
                    write!(f, "{}.", db)?;
                }
                write!(f, "{}", name)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", alias)?;
                }
                match index {
                    Some(IndexHint::IndexedBy(idx)) => write!(f, " INDEXED BY {}", idx),
                    Some(IndexHint::NotIndexed) => write!(f, " NOT INDEXED"),
                    None => Ok(()),
                }
            }
            SingleSource::Subquery { select, alias } => {
                write!(f, "({})", select)?;
                match alias {
                    Some(alias) => write!(f, " AS {}", alias),
                    None => Ok(()),
                }
            }
            SingleSource::Join(source) => write!(f, "({})", source),
        }
    }
}
