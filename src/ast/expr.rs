use serde::{Deserialize, Serialize};

use crate::ast::operators::{BinaryOp, TypeName, UnaryOp};
use crate::ast::select::SelectStmt;
use crate::ast::tokens::TokenTree;

/// How string literals are quoted when an expression is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    /// SQL: an embedded quote is doubled.
    Sql,
    /// Pig Latin: an embedded quote or backslash is backslash-escaped.
    Pig,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Numeric literal, kept exactly as written (`100`, `1.5e3`).
    Number(String),
    /// String literal with SQL quote doubling already undone.
    String(String),
    /// Hex blob literal (`x'ff'`), hex digits only.
    Blob(String),
    Null,
    CurrentTime,
    CurrentDate,
    CurrentTimestamp,
}

impl Literal {
    pub fn quoted(&self, quoting: Quoting) -> String {
        match (self, quoting) {
            (Literal::String(s), Quoting::Pig) => {
                format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
            }
            _ => self.to_string(),
        }
    }
}

/// SQL spelling.
impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Blob(hex) => write!(f, "X'{}'", hex),
            Literal::Null => write!(f, "NULL"),
            Literal::CurrentTime => write!(f, "CURRENT_TIME"),
            Literal::CurrentDate => write!(f, "CURRENT_DATE"),
            Literal::CurrentTimestamp => write!(f, "CURRENT_TIMESTAMP"),
        }
    }
}

/// A SQL value expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    /// Column reference, optionally qualified: `t.col`.
    Column {
        table: Option<String>,
        name: String,
    },
    /// Bind parameter as written: `?1`, `:name`, `@name`, `$name`.
    Param(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    /// Operators of one precedence tier applied left to right:
    /// `head op1 e1 op2 e2 ...` means `((head op1 e1) op2 e2) ...`.
    /// Never empty; a bare operand is not wrapped.
    Chain {
        head: Box<Expr>,
        tail: Vec<(BinaryOp, Expr)>,
    },
    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: Box<Expr>,
        negated: bool,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// Explicitly parenthesised expression.
    Nested(Box<Expr>),
    /// Parenthesised list, e.g. the right side of `IN`.
    List(Vec<Expr>),
    Function {
        name: String,
        args: Vec<Expr>,
    },
    /// `COUNT(*)` when `None`.
    Count(Option<Box<Expr>>),
    Cast {
        expr: Box<Expr>,
        type_name: TypeName,
    },
    Case {
        operand: Option<Box<Expr>>,
        branches: Vec<(Expr, Expr)>,
        else_result: Option<Box<Expr>>,
    },
    Exists(Box<SelectStmt>),
    /// Scalar sub-select `(SELECT ...)`.
    Subquery(Box<SelectStmt>),
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column {
            table: None,
            name: name.into(),
        }
    }

    pub fn number(text: impl Into<String>) -> Self {
        Expr::Literal(Literal::Number(text.into()))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::chain(left, vec![(op, right)])
    }

    /// `head` alone when `tail` is empty.
    pub fn chain(head: Expr, tail: Vec<(BinaryOp, Expr)>) -> Self {
        if tail.is_empty() {
            head
        } else {
            Expr::Chain {
                head: Box::new(head),
                tail,
            }
        }
    }

    /// Lower to a token tree with Pig Latin quoting.
    pub fn to_tree(&self) -> TokenTree {
        self.lower(Quoting::Pig)
    }

    /// Operators sit between their operand subtrees; self-delimited forms
    /// (calls, lists, parentheses) become single atoms.
    pub fn lower(&self, quoting: Quoting) -> TokenTree {
        match self {
            Expr::Unary { op, expr } => {
                TokenTree::node([TokenTree::atom(op), expr.lower(quoting)])
            }
            Expr::Chain { head, tail } => {
                let mut children = Vec::with_capacity(1 + 2 * tail.len());
                children.push(head.lower(quoting));
                for (op, operand) in tail {
                    children.push(TokenTree::atom(op));
                    children.push(operand.lower(quoting));
                }
                TokenTree::Node(children)
            }
            Expr::Between {
                expr,
                negated,
                low,
                high,
            } => TokenTree::node([
                expr.lower(quoting),
                TokenTree::atom(if *negated { "NOT BETWEEN" } else { "BETWEEN" }),
                low.lower(quoting),
                TokenTree::atom("AND"),
                high.lower(quoting),
            ]),
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                let mut children = vec![TokenTree::atom("CASE")];
                if let Some(operand) = operand {
                    children.push(operand.lower(quoting));
                }
                for (when, then) in branches {
                    children.push(TokenTree::atom("WHEN"));
                    children.push(when.lower(quoting));
                    children.push(TokenTree::atom("THEN"));
                    children.push(then.lower(quoting));
                }
                if let Some(else_result) = else_result {
                    children.push(TokenTree::atom("ELSE"));
                    children.push(else_result.lower(quoting));
                }
                children.push(TokenTree::atom("END"));
                TokenTree::Node(children)
            }
            Expr::Literal(lit) => TokenTree::Atom(lit.quoted(quoting)),
            Expr::Column { table: Some(t), name } => TokenTree::Atom(format!("{}.{}", t, name)),
            Expr::Column { table: None, name } => TokenTree::atom(name),
            Expr::Param(p) => TokenTree::atom(p),
            Expr::Nested(inner) => TokenTree::Atom(format!("({})", inner.lower(quoting).render())),
            Expr::List(items) => TokenTree::Atom(format!("({})", join(items, quoting))),
            Expr::Function { name, args } => {
                TokenTree::Atom(format!("{}({})", name, join(args, quoting)))
            }
            Expr::Count(None) => TokenTree::atom("COUNT(*)"),
            Expr::Count(Some(arg)) => {
                TokenTree::Atom(format!("COUNT({})", arg.lower(quoting).render()))
            }
            Expr::Cast { expr, type_name } => TokenTree::Atom(format!(
                "CAST({} AS {})",
                expr.lower(quoting).render(),
                type_name
            )),
            Expr::Exists(select) => TokenTree::Atom(format!("EXISTS ({})", select)),
            Expr::Subquery(select) => TokenTree::Atom(format!("({})", select)),
        }
    }

    /// Names of the columns this expression references. Sub-select bodies
    /// are their own scope and are not searched.
    pub fn column_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.visit_columns(&mut out);
        out
    }

    /// True if a sub-select appears anywhere in this expression.
    pub fn has_subquery(&self) -> bool {
        match self {
            Expr::Exists(_) | Expr::Subquery(_) => true,
            Expr::Unary { expr, .. } | Expr::Nested(expr) | Expr::Cast { expr, .. } => {
                expr.has_subquery()
            }
            Expr::Chain { head, tail } => {
                head.has_subquery() || tail.iter().any(|(_, e)| e.has_subquery())
            }
            Expr::Between {
                expr, low, high, ..
            } => expr.has_subquery() || low.has_subquery() || high.has_subquery(),
            Expr::List(items) | Expr::Function { args: items, .. } => {
                items.iter().any(Expr::has_subquery)
            }
            Expr::Count(arg) => arg.as_ref().is_some_and(|a| a.has_subquery()),
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                operand.as_ref().is_some_and(|o| o.has_subquery())
                    || branches
                        .iter()
                        .any(|(w, t)| w.has_subquery() || t.has_subquery())
                    || else_result.as_ref().is_some_and(|e| e.has_subquery())
            }
            Expr::Literal(_) | Expr::Column { .. } | Expr::Param(_) => false,
        }
    }

    fn visit_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column { name, .. } => out.push(name),
            Expr::Unary { expr, .. } | Expr::Nested(expr) | Expr::Cast { expr, .. } => {
                expr.visit_columns(out)
            }
            Expr::Chain { head, tail } => {
                head.visit_columns(out);
                for (_, operand) in tail {
                    operand.visit_columns(out);
                }
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                expr.visit_columns(out);
                low.visit_columns(out);
                high.visit_columns(out);
            }
            Expr::List(items) | Expr::Function { args: items, .. } => {
                for item in items {
                    item.visit_columns(out);
                }
            }
            Expr::Count(Some(arg)) => arg.visit_columns(out),
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                if let Some(operand) = operand {
                    operand.visit_columns(out);
                }
                for (when, then) in branches {
                    when.visit_columns(out);
                    then.visit_columns(out);
                }
                if let Some(else_result) = else_result {
                    else_result.visit_columns(out);
                }
            }
            Expr::Literal(_)
            | Expr::Param(_)
            | Expr::Count(None)
            | Expr::Exists(_)
            | Expr::Subquery(_) => {}
        }
    }
}

fn join(items: &[Expr], quoting: Quoting) -> String {
    items
        .iter()
        .map(|e| e.lower(quoting).render())
        .collect::<Vec<_>>()
        .join(", ")
}

/// SQL spelling.
impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lower(Quoting::Sql).render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_renders_operator_verbatim() {
        let expr = Expr::binary(Expr::column("z"), BinaryOp::Gt, Expr::number("100"));
        assert_eq!(expr.to_string(), "z > 100");

        let expr = Expr::binary(Expr::column("a"), BinaryOp::LtGt, Expr::number("1"));
        assert_eq!(expr.to_string(), "a <> 1");
    }

    #[test]
    fn test_string_literal_quoting() {
        let lit = Literal::String("it's".to_string());
        assert_eq!(lit.to_string(), "'it''s'");
        assert_eq!(lit.quoted(Quoting::Sql), "'it''s'");
        assert_eq!(lit.quoted(Quoting::Pig), r"'it\'s'");

        let expr = Expr::binary(Expr::column("n"), BinaryOp::Eq, Expr::Literal(lit));
        assert_eq!(expr.to_tree().render(), r"n = 'it\'s'");
        assert_eq!(expr.to_string(), "n = 'it''s'");
    }

    #[test]
    fn test_chain_without_tail_is_the_operand() {
        assert_eq!(Expr::chain(Expr::column("a"), vec![]), Expr::column("a"));
    }

    #[test]
    fn test_chain_flattens_in_order() {
        let expr = Expr::chain(
            Expr::column("a"),
            vec![
                (BinaryOp::And, Expr::column("b")),
                (BinaryOp::Or, Expr::column("c")),
            ],
        );
        assert_eq!(expr.to_tree().flatten(), vec!["a", "AND", "b", "OR", "c"]);
        assert_eq!(expr.column_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_between_flattens_in_order() {
        let expr = Expr::Between {
            expr: Box::new(Expr::column("x")),
            negated: true,
            low: Box::new(Expr::number("1")),
            high: Box::new(Expr::number("5")),
        };
        assert_eq!(
            expr.to_tree().flatten(),
            vec!["x", "NOT BETWEEN", "1", "AND", "5"]
        );
    }

    #[test]
    fn test_nested_and_list_are_atoms() {
        let expr = Expr::binary(
            Expr::column("c"),
            BinaryOp::In,
            Expr::List(vec![Expr::number("1"), Expr::number("2")]),
        );
        assert_eq!(expr.to_tree().flatten(), vec!["c", "IN", "(1, 2)"]);

        let nested = Expr::Nested(Box::new(Expr::binary(
            Expr::column("a"),
            BinaryOp::Or,
            Expr::column("b"),
        )));
        assert_eq!(nested.to_string(), "(a OR b)");
    }

    #[test]
    fn test_column_names_through_calls_and_qualifiers() {
        let expr = Expr::binary(
            Expr::Function {
                name: "lower".to_string(),
                args: vec![Expr::column("uri")],
            },
            BinaryOp::And,
            Expr::Column {
                table: Some("t".to_string()),
                name: "mvid".to_string(),
            },
        );
        assert_eq!(expr.column_names(), vec!["uri", "mvid"]);
    }

    #[test]
    fn test_has_subquery() {
        let stmt = crate::parser::parse("select 1 from d").unwrap();
        let expr = Expr::binary(
            Expr::column("a"),
            BinaryOp::In,
            Expr::List(vec![Expr::Subquery(Box::new(stmt))]),
        );
        assert!(expr.has_subquery());
        assert_eq!(expr.column_names(), vec!["a"]);
        assert!(!Expr::column("a").has_subquery());
    }
}
