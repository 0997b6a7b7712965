//! SQL `SELECT` parser using nom.
//!
//! Parses the supported SQL subset into a [`SelectStmt`].
//!
//! # Grammar Overview
//!
//! ```text
//! select_stmt  := select_core (compound_op select_core)*
//!                 [ORDER BY ordering_term, ...] [LIMIT n [OFFSET m | , m]]
//! select_core  := SELECT [DISTINCT|ALL] result_column, ...
//!                 [FROM join_source] [WHERE expr]
//!                 [GROUP BY ordering_term, ... [HAVING expr]]
//! join_source  := single_source (join_op single_source [join_constraint])*
//! single_source:= [db.]table [[AS] alias] [INDEXED BY name | NOT INDEXED]
//!               | ( select_stmt ) [[AS] alias]
//!               | ( join_source )
//! ```
//!
//! Expression precedence, tightest first:
//!
//! | Tier | Operators                                              |
//! |------|--------------------------------------------------------|
//! | 1    | unary `-` `+` `~` `NOT`                                |
//! | 2    | `\|\|`                                                 |
//! | 3    | `*` `/` `%`                                            |
//! | 4    | `+` `-`                                                |
//! | 5    | `<<` `>>` `&` `\|`                                     |
//! | 6    | `<` `<=` `>` `>=`                                      |
//! | 7    | `=` `==` `!=` `<>` `IS` `IN` `LIKE` `GLOB` `MATCH` `REGEXP`, `BETWEEN .. AND ..` |
//! | 8    | `AND` `OR` (same tier, left associative)               |

use std::collections::HashSet;
use std::sync::OnceLock;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while},
    character::complete::{char, digit1, hex_digit1, multispace0, one_of, satisfy},
    combinator::{cut, map, map_res, not, opt, peek, recognize, value, verify},
    error::{context, ContextError, ErrorKind, ParseError, VerboseError, VerboseErrorKind},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use tracing::debug;

use crate::ast::*;
use crate::error::{PigError, PigResult};

type PResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Reserved words. None of these is accepted as an identifier.
const KEYWORDS: &[&str] = &[
    "ALL", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "COLLATE", "COUNT", "CROSS",
    "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DESC", "DISTINCT", "ELSE", "END",
    "ESCAPE", "EXCEPT", "EXISTS", "FROM", "GLOB", "GROUP", "HAVING", "IN", "INDEXED", "INNER",
    "INTERSECT", "IS", "ISNULL", "JOIN", "LEFT", "LIKE", "LIMIT", "MATCH", "NATURAL", "NOT",
    "NOTNULL", "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "REGEXP", "SELECT", "THEN",
    "UNION", "USING", "WHEN", "WHERE",
];

/// Nesting cap applied by [`Grammar::shared`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The immutable grammar: reserved words plus the nesting cap.
///
/// Build it once and parse any number of queries through a shared
/// reference; parsing never mutates it.
#[derive(Debug, Clone)]
pub struct Grammar {
    keywords: HashSet<&'static str>,
    max_depth: usize,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Grammar {
    pub fn new(max_depth: usize) -> Self {
        Self {
            keywords: KEYWORDS.iter().copied().collect(),
            max_depth,
        }
    }

    /// Process-wide grammar with the default nesting cap.
    pub fn shared() -> &'static Grammar {
        static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
        GRAMMAR.get_or_init(Grammar::default)
    }

    /// Case-insensitive reserved word check.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word.to_ascii_uppercase().as_str())
    }

    /// Parse a complete query. A trailing `;` is allowed; anything else left
    /// over is a syntax error.
    pub fn parse(&self, input: &str) -> PigResult<SelectStmt> {
        let result = terminated(
            |i| self.select_stmt(i, 0),
            tuple((multispace0, opt(char(';')), multispace0)),
        )(input);

        match result {
            Ok(("", stmt)) => {
                debug!(query = input.trim(), "parsed select statement");
                Ok(stmt)
            }
            Ok((remaining, _)) => {
                let remaining = remaining.trim_start();
                Err(PigError::syntax(
                    input.len() - remaining.len(),
                    format!("unexpected trailing input near {}", snippet(remaining)),
                ))
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(syntax_error(input, e)),
            Err(nom::Err::Incomplete(_)) => {
                Err(PigError::syntax(input.len(), "unexpected end of input"))
            }
        }
    }

    fn guard<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, ()> {
        if depth > self.max_depth {
            Err(nom::Err::Failure(VerboseError::add_context(
                input,
                "less deeply nested query",
                VerboseError::from_error_kind(input, ErrorKind::TooLarge),
            )))
        } else {
            Ok((input, ()))
        }
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn select_stmt<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, SelectStmt> {
        let (input, _) = self.guard(input, depth)?;
        let (input, core) = self.select_core(input, depth)?;
        let (input, compounds) = many0(pair(
            compound_op,
            cut(context("select statement", |i| self.select_core(i, depth))),
        ))(input)?;

        let (input, order_by) = opt(preceded(
            pair(kw("ORDER"), cut(context("BY", kw("BY")))),
            cut(context(
                "ordering term",
                separated_list1(sym(","), cut(|i| self.ordering_term(i, depth))),
            )),
        ))(input)?;

        let (input, limit) = opt(preceded(
            kw("LIMIT"),
            cut(context("limit count", limit_terms)),
        ))(input)?;

        Ok((
            input,
            SelectStmt {
                core,
                compounds,
                order_by,
                limit,
            },
        ))
    }

    fn select_core<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, SelectCore> {
        let (input, _) = kw("SELECT")(input)?;
        let (input, quantifier) = opt(alt((
            value(Quantifier::Distinct, kw("DISTINCT")),
            value(Quantifier::All, kw("ALL")),
        )))(input)?;

        let (input, columns) = cut(context(
            "result column",
            separated_list1(sym(","), cut(|i| self.result_column(i, depth))),
        ))(input)?;

        let (input, from) = opt(preceded(
            kw("FROM"),
            cut(context("table or sub-select", |i| self.join_source(i, depth))),
        ))(input)?;

        let (input, where_expr) = opt(preceded(
            kw("WHERE"),
            cut(context("where expression", |i| self.expr(i, depth))),
        ))(input)?;

        let (input, group_by) = opt(|i| self.group_by(i, depth))(input)?;

        Ok((
            input,
            SelectCore {
                quantifier,
                columns,
                from,
                where_expr,
                group_by,
            },
        ))
    }

    fn group_by<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, GroupBy> {
        let (input, _) = kw("GROUP")(input)?;
        let (input, _) = cut(context("BY", kw("BY")))(input)?;
        let (input, terms) = cut(context(
            "grouping term",
            separated_list1(sym(","), cut(|i| self.ordering_term(i, depth))),
        ))(input)?;
        let (input, having) = opt(preceded(
            kw("HAVING"),
            cut(context("having expression", |i| self.expr(i, depth))),
        ))(input)?;

        Ok((input, GroupBy { terms, having }))
    }

    fn result_column<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, ResultColumn> {
        alt((
            value(ResultColumn::Star, sym("*")),
            map(
                terminated(|i| self.identifier(i), pair(sym("."), sym("*"))),
                ResultColumn::TableStar,
            ),
            map(
                pair(|i| self.expr(i, depth), opt(|i| self.alias(i))),
                |(expr, alias)| ResultColumn::Expr { expr, alias },
            ),
        ))(input)
    }

    fn alias<'a>(&self, input: &'a str) -> PResult<'a, String> {
        alt((
            preceded(kw("AS"), cut(context("alias", |i| self.identifier(i)))),
            |i| self.identifier(i),
        ))(input)
    }

    fn ordering_term<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, OrderingTerm> {
        let (input, expr) = self.expr(input, depth)?;
        let (input, collation) = opt(preceded(
            kw("COLLATE"),
            cut(context("collation name", |i| self.identifier(i))),
        ))(input)?;
        let (input, order) = opt(alt((
            value(SortOrder::Asc, kw("ASC")),
            value(SortOrder::Desc, kw("DESC")),
        )))(input)?;

        Ok((
            input,
            OrderingTerm {
                expr,
                collation,
                order,
            },
        ))
    }

    // ---------------------------------------------------------------
    // Sources
    // ---------------------------------------------------------------

    fn join_source<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, JoinSource> {
        let (input, first) = self.single_source(input, depth)?;
        let (input, joins) = many0(|i| self.join_clause(i, depth))(input)?;
        Ok((input, JoinSource { first, joins }))
    }

    fn join_clause<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, JoinClause> {
        let (input, op) = join_op(input)?;
        let (input, source) = cut(context("table or sub-select", |i| {
            self.single_source(i, depth)
        }))(input)?;
        let (input, constraint) = opt(|i| self.join_constraint(i, depth))(input)?;

        Ok((
            input,
            JoinClause {
                op,
                source,
                constraint,
            },
        ))
    }

    fn join_constraint<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, JoinConstraint> {
        alt((
            map(
                preceded(
                    kw("ON"),
                    cut(context("join condition", |i| self.expr(i, depth))),
                ),
                JoinConstraint::On,
            ),
            map(
                preceded(
                    kw("USING"),
                    cut(delimited(
                        sym("("),
                        context(
                            "column name",
                            separated_list1(sym(","), cut(|i| self.identifier(i))),
                        ),
                        close_paren,
                    )),
                ),
                JoinConstraint::Using,
            ),
        ))(input)
    }

    fn single_source<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, SingleSource> {
        alt((
            |i| self.table_source(i),
            |i| self.subquery_source(i, depth),
            |i| self.nested_join_source(i, depth),
        ))(input)
    }

    fn table_source<'a>(&self, input: &'a str) -> PResult<'a, SingleSource> {
        let (input, first) = self.identifier(input)?;
        let (input, second) = opt(preceded(sym("."), |i| self.identifier(i)))(input)?;
        let (database, name) = match second {
            Some(table) => (Some(first), table),
            None => (None, first),
        };
        let (input, alias) = opt(|i| self.alias(i))(input)?;
        let (input, index) = opt(alt((
            map(
                preceded(
                    pair(kw("INDEXED"), cut(context("BY", kw("BY")))),
                    cut(context("index name", |i| self.identifier(i))),
                ),
                IndexHint::IndexedBy,
            ),
            value(IndexHint::NotIndexed, pair(kw("NOT"), kw("INDEXED"))),
        )))(input)?;

        Ok((
            input,
            SingleSource::Table {
                database,
                name,
                alias,
                index,
            },
        ))
    }

    fn subquery_source<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, SingleSource> {
        let (input, _) = sym("(")(input)?;
        let (input, _) = peek(kw("SELECT"))(input)?;
        let (input, select) = self.select_stmt(input, depth + 1)?;
        let (input, _) = cut(close_paren)(input)?;
        let (input, alias) = opt(|i| self.alias(i))(input)?;

        Ok((
            input,
            SingleSource::Subquery {
                select: Box::new(select),
                alias,
            },
        ))
    }

    fn nested_join_source<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, SingleSource> {
        let (input, _) = sym("(")(input)?;
        let (input, _) = self.guard(input, depth + 1)?;
        let (input, source) = self.join_source(input, depth + 1)?;
        let (input, _) = cut(close_paren)(input)?;
        Ok((input, SingleSource::Join(Box::new(source))))
    }

    // ---------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------

    /// Parse a full expression (lowest precedence tier).
    fn expr<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (input, _) = self.guard(input, depth)?;
        self.left_assoc(input, depth, Self::equality_level, and_or_op)
    }

    /// Collect `operand (operator operand)*` into one flat chain, so a long
    /// run of operators never deepens the tree.
    fn left_assoc<'a>(
        &self,
        input: &'a str,
        depth: usize,
        operand: fn(&Self, &'a str, usize) -> PResult<'a, Expr>,
        mut operator: impl FnMut(&'a str) -> PResult<'a, BinaryOp>,
    ) -> PResult<'a, Expr> {
        let (mut input, head) = operand(self, input, depth)?;
        let mut tail = Vec::new();
        loop {
            match operator(input) {
                Ok((rest, op)) => {
                    let (rest, right) =
                        cut(context("operand", |i| operand(self, i, depth)))(rest)?;
                    tail.push((op, right));
                    input = rest;
                }
                Err(nom::Err::Error(_)) => return Ok((input, Expr::chain(head, tail))),
                Err(e) => return Err(e),
            }
        }
    }

    /// Equality tier, which also hosts the `BETWEEN .. AND ..` ternary so its
    /// inner `AND` never competes with the boolean tier. Each `BETWEEN` wraps
    /// everything to its left and counts as one nesting level.
    fn equality_level<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (mut input, mut head) = self.comparison_level(input, depth)?;
        let mut tail = Vec::new();
        let mut depth = depth;
        loop {
            if let Ok((rest, negated)) = between_kw(input) {
                depth += 1;
                let (rest, _) = self.guard(rest, depth)?;
                let (rest, low) =
                    cut(context("operand", |i| self.comparison_level(i, depth)))(rest)?;
                let (rest, _) = cut(context("AND", kw("AND")))(rest)?;
                let (rest, high) =
                    cut(context("operand", |i| self.comparison_level(i, depth)))(rest)?;
                head = Expr::Between {
                    expr: Box::new(Expr::chain(head, std::mem::take(&mut tail))),
                    negated,
                    low: Box::new(low),
                    high: Box::new(high),
                };
                input = rest;
                continue;
            }

            match equality_op(input) {
                Ok((rest, op)) => {
                    let (rest, right) =
                        cut(context("operand", |i| self.comparison_level(i, depth)))(rest)?;
                    tail.push((op, right));
                    input = rest;
                }
                Err(nom::Err::Error(_)) => return Ok((input, Expr::chain(head, tail))),
                Err(e) => return Err(e),
            }
        }
    }

    fn comparison_level<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        self.left_assoc(input, depth, Self::bitwise_level, comparison_op)
    }

    fn bitwise_level<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        self.left_assoc(input, depth, Self::additive_level, bitwise_op)
    }

    fn additive_level<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        self.left_assoc(input, depth, Self::multiplicative_level, additive_op)
    }

    fn multiplicative_level<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        self.left_assoc(input, depth, Self::concat_level, multiplicative_op)
    }

    fn concat_level<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        self.left_assoc(input, depth, Self::unary_level, concat_op)
    }

    fn unary_level<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        match unary_op(input) {
            Ok((rest, op)) => {
                let (rest, _) = self.guard(rest, depth + 1)?;
                let (rest, expr) =
                    cut(context("operand", |i| self.unary_level(i, depth + 1)))(rest)?;
                Ok((
                    rest,
                    Expr::Unary {
                        op,
                        expr: Box::new(expr),
                    },
                ))
            }
            Err(nom::Err::Error(_)) => self.primary(input, depth),
            Err(e) => Err(e),
        }
    }

    /// Primary term. Recursively embeds the full expression grammar and,
    /// through `EXISTS` and scalar sub-selects, the statement grammar.
    fn primary<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        alt((
            |i| self.cast_expr(i, depth),
            |i| self.exists_expr(i, depth),
            |i| self.case_expr(i, depth),
            |i| self.count_expr(i, depth),
            |i| self.function_call(i, depth),
            map(literal, Expr::Literal),
            map(bind_parameter, Expr::Param),
            |i| self.column_ref(i),
            |i| self.parenthesized(i, depth),
        ))(input)
    }

    fn cast_expr<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (input, _) = kw("CAST")(input)?;
        let (input, (expr, _, type_name)) = cut(delimited(
            sym("("),
            tuple((
                |i| self.expr(i, depth + 1),
                context("AS", kw("AS")),
                type_name,
            )),
            close_paren,
        ))(input)?;

        Ok((
            input,
            Expr::Cast {
                expr: Box::new(expr),
                type_name,
            },
        ))
    }

    fn exists_expr<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (input, _) = kw("EXISTS")(input)?;
        let (input, select) = cut(delimited(
            sym("("),
            context("select statement", |i| self.select_stmt(i, depth + 1)),
            close_paren,
        ))(input)?;
        Ok((input, Expr::Exists(Box::new(select))))
    }

    fn case_expr<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (input, _) = kw("CASE")(input)?;
        let (input, operand) = opt(|i| self.expr(i, depth + 1))(input)?;
        let (input, branches) = cut(context(
            "WHEN",
            many1(pair(
                preceded(kw("WHEN"), cut(|i| self.expr(i, depth + 1))),
                preceded(
                    cut(context("THEN", kw("THEN"))),
                    cut(|i| self.expr(i, depth + 1)),
                ),
            )),
        ))(input)?;
        let (input, else_result) = opt(preceded(
            kw("ELSE"),
            cut(|i| self.expr(i, depth + 1)),
        ))(input)?;
        let (input, _) = cut(context("END", kw("END")))(input)?;

        Ok((
            input,
            Expr::Case {
                operand: operand.map(Box::new),
                branches,
                else_result: else_result.map(Box::new),
            },
        ))
    }

    fn count_expr<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (input, _) = kw("COUNT")(input)?;
        let (input, arg) = cut(delimited(
            sym("("),
            context(
                "count argument",
                alt((
                    value(None, sym("*")),
                    map(|i| self.expr(i, depth + 1), |e| Some(Box::new(e))),
                )),
            ),
            close_paren,
        ))(input)?;
        Ok((input, Expr::Count(arg)))
    }

    fn function_call<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (input, name) = self.identifier(input)?;
        let (input, _) = sym("(")(input)?;
        let (input, args) = cut(terminated(
            opt(separated_list1(sym(","), |i| self.expr(i, depth + 1))),
            close_paren,
        ))(input)?;

        Ok((
            input,
            Expr::Function {
                name,
                args: args.unwrap_or_default(),
            },
        ))
    }

    fn column_ref<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (input, first) = self.identifier(input)?;
        let (input, second) = opt(preceded(sym("."), |i| self.identifier(i)))(input)?;
        let expr = match second {
            Some(name) => Expr::Column {
                table: Some(first),
                name,
            },
            None => Expr::Column {
                table: None,
                name: first,
            },
        };
        Ok((input, expr))
    }

    /// `( select_stmt )`, `( expr )` or `( expr, expr, ... )`.
    fn parenthesized<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (input, _) = sym("(")(input)?;

        if peek(kw("SELECT"))(input).is_ok() {
            let (input, select) = self.select_stmt(input, depth + 1)?;
            let (input, _) = cut(close_paren)(input)?;
            return Ok((input, Expr::Subquery(Box::new(select))));
        }

        let (input, items) = cut(context(
            "expression",
            separated_list1(sym(","), cut(|i| self.expr(i, depth + 1))),
        ))(input)?;
        let (input, _) = cut(close_paren)(input)?;

        let expr = match <[Expr; 1]>::try_from(items) {
            Ok([single]) => Expr::Nested(Box::new(single)),
            Err(items) => Expr::List(items),
        };
        Ok((input, expr))
    }

    // ---------------------------------------------------------------
    // Lexical rules
    // ---------------------------------------------------------------

    /// A letter followed by letters, digits or `_`, and not a reserved word.
    fn identifier<'a>(&self, input: &'a str) -> PResult<'a, String> {
        map(
            verify(preceded(multispace0, word), |w: &str| !self.is_keyword(w)),
            str::to_string,
        )(input)
    }
}

/// Parse a query with the shared grammar.
pub fn parse(input: &str) -> PigResult<SelectStmt> {
    Grammar::shared().parse(input)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn word(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic()),
        take_while(is_word_char),
    ))(input)
}

/// Case-insensitive keyword, returned in its canonical upper-case spelling.
fn kw<'a>(word: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'static str> {
    preceded(
        multispace0,
        value(word, terminated(tag_no_case(word), not(satisfy(is_word_char)))),
    )
}

/// Punctuation or operator symbol.
fn sym<'a>(symbol: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    preceded(multispace0, tag(symbol))
}

fn close_paren(input: &str) -> PResult<'_, &str> {
    context("')'", sym(")"))(input)
}

fn numeric_literal(input: &str) -> PResult<'_, &str> {
    preceded(
        multispace0,
        recognize(tuple((
            digit1,
            opt(pair(char('.'), take_while(|c: char| c.is_ascii_digit()))),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
    )(input)
}

/// Single-quoted string; a doubled quote stands for one embedded quote.
fn string_literal(input: &str) -> PResult<'_, String> {
    let (mut rest, _) = preceded(multispace0, char('\''))(input)?;
    let mut out = String::new();
    loop {
        match rest.find('\'') {
            Some(idx) => {
                out.push_str(&rest[..idx]);
                let after = &rest[idx + 1..];
                match after.strip_prefix('\'') {
                    Some(more) => {
                        out.push('\'');
                        rest = more;
                    }
                    None => return Ok((after, out)),
                }
            }
            None => {
                let start = input.trim_start();
                return Err(nom::Err::Failure(VerboseError::add_context(
                    start,
                    "closing quote",
                    VerboseError::from_error_kind(start, ErrorKind::Char),
                )));
            }
        }
    }
}

fn blob_literal(input: &str) -> PResult<'_, &str> {
    preceded(
        multispace0,
        delimited(pair(one_of("xX"), char('\'')), hex_digit1, char('\'')),
    )(input)
}

fn literal(input: &str) -> PResult<'_, Literal> {
    alt((
        map(numeric_literal, |n| Literal::Number(n.to_string())),
        map(string_literal, Literal::String),
        map(blob_literal, |hex| Literal::Blob(hex.to_string())),
        value(Literal::Null, kw("NULL")),
        value(Literal::CurrentTimestamp, kw("CURRENT_TIMESTAMP")),
        value(Literal::CurrentTime, kw("CURRENT_TIME")),
        value(Literal::CurrentDate, kw("CURRENT_DATE")),
    ))(input)
}

/// `?`, `?N`, `:name`, `@name` or `$name`.
fn bind_parameter(input: &str) -> PResult<'_, String> {
    map(
        preceded(
            multispace0,
            alt((
                recognize(pair(char('?'), take_while(|c: char| c.is_ascii_digit()))),
                recognize(pair(one_of(":@$"), word)),
            )),
        ),
        str::to_string,
    )(input)
}

fn type_name(input: &str) -> PResult<'_, TypeName> {
    context(
        "type name",
        alt((
            value(TypeName::Text, kw("TEXT")),
            value(TypeName::Real, kw("REAL")),
            value(TypeName::Integer, kw("INTEGER")),
            value(TypeName::Blob, kw("BLOB")),
            value(TypeName::Null, kw("NULL")),
        )),
    )(input)
}

fn integer(input: &str) -> PResult<'_, i64> {
    map_res(
        preceded(multispace0, recognize(pair(opt(one_of("+-")), digit1))),
        |s: &str| s.parse::<i64>(),
    )(input)
}

/// `n`, `n OFFSET m` or `m, n`.
fn limit_terms(input: &str) -> PResult<'_, Limit> {
    let (input, first) = integer(input)?;
    let (input, rest) = opt(alt((
        map(preceded(kw("OFFSET"), cut(integer)), |offset| (true, offset)),
        map(preceded(sym(","), cut(integer)), |count| (false, count)),
    )))(input)?;

    let limit = match rest {
        None => Limit {
            count: first,
            offset: None,
        },
        Some((true, offset)) => Limit {
            count: first,
            offset: Some(offset),
        },
        Some((false, count)) => Limit {
            count,
            offset: Some(first),
        },
    };
    Ok((input, limit))
}

fn compound_op(input: &str) -> PResult<'_, CompoundOp> {
    alt((
        value(CompoundOp::UnionAll, pair(kw("UNION"), kw("ALL"))),
        value(CompoundOp::Union, kw("UNION")),
        value(CompoundOp::Intersect, kw("INTERSECT")),
        value(CompoundOp::Except, kw("EXCEPT")),
    ))(input)
}

fn join_op(input: &str) -> PResult<'_, JoinOp> {
    alt((
        value(JoinOp::Comma, sym(",")),
        map(
            tuple((opt(kw("NATURAL")), opt(join_kind), kw("JOIN"))),
            |(natural, kind, _)| JoinOp::Join {
                natural: natural.is_some(),
                kind,
            },
        ),
    ))(input)
}

fn join_kind(input: &str) -> PResult<'_, JoinKind> {
    alt((
        value(JoinKind::Inner, kw("INNER")),
        value(JoinKind::Cross, kw("CROSS")),
        value(JoinKind::LeftOuter, pair(kw("LEFT"), kw("OUTER"))),
        value(JoinKind::Left, kw("LEFT")),
        value(JoinKind::Outer, kw("OUTER")),
    ))(input)
}

fn unary_op(input: &str) -> PResult<'_, UnaryOp> {
    alt((
        value(UnaryOp::Minus, sym("-")),
        value(UnaryOp::Plus, sym("+")),
        value(UnaryOp::BitNot, sym("~")),
        value(UnaryOp::Not, kw("NOT")),
    ))(input)
}

fn concat_op(input: &str) -> PResult<'_, BinaryOp> {
    value(BinaryOp::Concat, sym("||"))(input)
}

fn multiplicative_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::Mul, sym("*")),
        value(BinaryOp::Div, sym("/")),
        value(BinaryOp::Mod, sym("%")),
    ))(input)
}

fn additive_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::Add, sym("+")),
        value(BinaryOp::Sub, sym("-")),
    ))(input)
}

fn bitwise_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::ShiftLeft, sym("<<")),
        value(BinaryOp::ShiftRight, sym(">>")),
        value(BinaryOp::BitAnd, sym("&")),
        value(BinaryOp::BitOr, terminated(sym("|"), not(char('|')))),
    ))(input)
}

fn comparison_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::Lte, sym("<=")),
        value(BinaryOp::Gte, sym(">=")),
        value(BinaryOp::Lt, terminated(sym("<"), not(one_of("<>=")))),
        value(BinaryOp::Gt, terminated(sym(">"), not(one_of(">=")))),
    ))(input)
}

fn equality_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::EqEq, sym("==")),
        value(BinaryOp::Eq, sym("=")),
        value(BinaryOp::Ne, sym("!=")),
        value(BinaryOp::LtGt, sym("<>")),
        value(BinaryOp::IsNot, pair(kw("IS"), kw("NOT"))),
        value(BinaryOp::Is, kw("IS")),
        value(BinaryOp::NotIn, pair(kw("NOT"), kw("IN"))),
        value(BinaryOp::In, kw("IN")),
        value(BinaryOp::NotLike, pair(kw("NOT"), kw("LIKE"))),
        value(BinaryOp::Like, kw("LIKE")),
        value(BinaryOp::NotGlob, pair(kw("NOT"), kw("GLOB"))),
        value(BinaryOp::Glob, kw("GLOB")),
        value(BinaryOp::NotMatch, pair(kw("NOT"), kw("MATCH"))),
        value(BinaryOp::Match, kw("MATCH")),
        value(BinaryOp::NotRegexp, pair(kw("NOT"), kw("REGEXP"))),
        value(BinaryOp::Regexp, kw("REGEXP")),
    ))(input)
}

fn and_or_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::And, kw("AND")),
        value(BinaryOp::Or, kw("OR")),
    ))(input)
}

/// `BETWEEN` or `NOT BETWEEN`; yields whether it was negated.
fn between_kw(input: &str) -> PResult<'_, bool> {
    alt((
        value(true, pair(kw("NOT"), kw("BETWEEN"))),
        value(false, kw("BETWEEN")),
    ))(input)
}

/// Map a nom error to a positioned syntax error. The innermost entry gives
/// the position; the innermost context names what was expected.
fn syntax_error(input: &str, err: VerboseError<&str>) -> PigError {
    let Some((at, _)) = err.errors.first() else {
        return PigError::syntax(0, "invalid query");
    };
    let at = at.trim_start();
    let position = input.len() - at.len();

    let expected = err
        .errors
        .iter()
        .find_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some(ctx.to_string()),
            _ => None,
        })
        .or_else(|| {
            err.errors.iter().find_map(|(_, kind)| match kind {
                VerboseErrorKind::Char(c) => Some(format!("'{}'", c)),
                _ => None,
            })
        })
        .unwrap_or_else(|| "SELECT statement".to_string());

    PigError::syntax(position, format!("expected {} near {}", expected, snippet(at)))
}

fn snippet(rest: &str) -> String {
    let rest = rest.trim();
    if rest.is_empty() {
        return "end of input".to_string();
    }
    let head: String = rest.chars().take(20).collect();
    format!("'{}'", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_of(sql: &str) -> Expr {
        parse(sql).unwrap().where_expr().cloned().unwrap()
    }

    #[test]
    fn test_simple_select() {
        let stmt = parse("select * from xyzzy where z > 100").unwrap();
        assert_eq!(stmt.columns(), &[ResultColumn::Star]);
        assert_eq!(
            stmt.where_expr(),
            Some(&Expr::binary(
                Expr::column("z"),
                BinaryOp::Gt,
                Expr::number("100")
            ))
        );
        assert!(stmt.group_terms().is_none());
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let stmt = parse("Select A from Sys where a=1").unwrap();
        assert_eq!(
            stmt.columns(),
            &[ResultColumn::Expr {
                expr: Expr::column("A"),
                alias: None
            }]
        );
        match &stmt.core.from {
            Some(JoinSource { first, joins }) => {
                assert!(joins.is_empty());
                assert!(matches!(first, SingleSource::Table { name, .. } if name == "Sys"));
            }
            None => panic!("expected FROM"),
        }
    }

    #[test]
    fn test_keyword_rejected_as_identifier() {
        assert!(Grammar::shared().is_keyword("select"));
        assert!(Grammar::shared().is_keyword("Where"));
        assert!(!Grammar::shared().is_keyword("uri"));
        assert!(parse("select from from t").is_err());
    }

    #[test]
    fn test_and_or_share_one_chain() {
        let expr = where_of("select a from b where c=1 and b=2 or d=3");
        let expected = Expr::chain(
            Expr::binary(Expr::column("c"), BinaryOp::Eq, Expr::number("1")),
            vec![
                (
                    BinaryOp::And,
                    Expr::binary(Expr::column("b"), BinaryOp::Eq, Expr::number("2")),
                ),
                (
                    BinaryOp::Or,
                    Expr::binary(Expr::column("d"), BinaryOp::Eq, Expr::number("3")),
                ),
            ],
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_long_or_chain_stays_flat() {
        let sql = format!("select a from b where {}", vec!["c = 1"; 5000].join(" or "));
        match where_of(&sql) {
            Expr::Chain { head, tail } => {
                assert_eq!(head.to_string(), "c = 1");
                assert_eq!(tail.len(), 4999);
                assert!(tail.iter().all(|(op, _)| *op == BinaryOp::Or));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_between_runs_count_toward_depth() {
        let sql = format!("select a from b where x{}", " between 1 and 2".repeat(10));
        assert!(Grammar::new(4).parse(&sql).is_err());
        assert!(Grammar::new(16).parse(&sql).is_ok());
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = where_of("select a from b where x + 2 * 3 >= 7");
        let expected = Expr::binary(
            Expr::binary(
                Expr::column("x"),
                BinaryOp::Add,
                Expr::binary(Expr::number("2"), BinaryOp::Mul, Expr::number("3")),
            ),
            BinaryOp::Gte,
            Expr::number("7"),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_in_value_lists() {
        let expr = where_of("select a from b where c in (1, 2, 3) and d in ('a', 'b')");
        assert_eq!(expr.to_string(), "c IN (1, 2, 3) AND d IN ('a', 'b')");
    }

    #[test]
    fn test_between_inside_conjunction() {
        let expr = where_of("select a from b where x between 1 and 5 and y <> 2");
        match expr {
            Expr::Chain { head, tail } => {
                assert!(matches!(*head, Expr::Between { negated: false, .. }));
                assert_eq!(tail.len(), 1);
                assert_eq!(tail[0].0, BinaryOp::And);
                assert_eq!(tail[0].1.to_string(), "y <> 2");
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_negated_operators() {
        let expr = where_of("select a from b where x not in (1, 2) or y is not null");
        assert_eq!(expr.to_string(), "x NOT IN (1, 2) OR y IS NOT NULL");
    }

    #[test]
    fn test_unary_and_nested() {
        let expr = where_of("select a from b where not (a = -1 or b = 2)");
        assert_eq!(expr.to_string(), "NOT (a = - 1 OR b = 2)");
    }

    #[test]
    fn test_string_literal_doubled_quote() {
        let expr = where_of("select a from b where name = 'it''s'");
        match expr {
            Expr::Chain { tail, .. } => {
                assert_eq!(tail[0].1, Expr::Literal(Literal::String("it's".to_string())))
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_blob_and_numeric_literals() {
        let expr = where_of("select a from b where h = x'0aFF' and n = 1.5e3");
        assert_eq!(expr.to_string(), "h = X'0aFF' AND n = 1.5e3");
    }

    #[test]
    fn test_functions_count_cast() {
        let stmt = parse("select count(*), count(uri), lower(uri) as u, cast(n as integer) from t")
            .unwrap();
        let rendered: Vec<String> = stmt.columns().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "COUNT(*)",
                "COUNT(uri)",
                "lower(uri) AS u",
                "CAST(n AS INTEGER)"
            ]
        );
    }

    #[test]
    fn test_case_expression() {
        let expr = where_of("select a from b where case when x = 1 then 'y' else 'n' end = 'y'");
        assert_eq!(expr.to_string(), "CASE WHEN x = 1 THEN 'y' ELSE 'n' END = 'y'");
    }

    #[test]
    fn test_exists_subquery() {
        let expr = where_of("select a from b where exists (select 1 from c where c.id = b.id)");
        match expr {
            Expr::Exists(select) => {
                assert_eq!(select.to_string(), "SELECT 1 FROM c WHERE c.id = b.id")
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_group_having_order_limit() {
        let stmt = parse(
            "select a,d from b where c=1 group by d, e desc having count(*) > 2 order by d limit 30",
        )
        .unwrap();
        let terms: Vec<String> = stmt
            .group_terms()
            .unwrap()
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(terms, vec!["d", "e DESC"]);
        assert_eq!(stmt.having_expr().unwrap().to_string(), "COUNT(*) > 2");
        assert_eq!(stmt.order_by_terms().unwrap().len(), 1);
        assert_eq!(
            stmt.limit_terms(),
            Some(&Limit {
                count: 30,
                offset: None
            })
        );
    }

    #[test]
    fn test_limit_forms() {
        let stmt = parse("select a from b limit 10 offset 5").unwrap();
        assert_eq!(
            stmt.limit,
            Some(Limit {
                count: 10,
                offset: Some(5)
            })
        );
        let stmt = parse("select a from b limit 5, 10").unwrap();
        assert_eq!(
            stmt.limit,
            Some(Limit {
                count: 10,
                offset: Some(5)
            })
        );
    }

    #[test]
    fn test_joins_compose_left() {
        let stmt = parse(
            "select t.* from db.t as t natural left outer join u using (id), v join w on v.k = w.k",
        )
        .unwrap();
        assert_eq!(stmt.columns(), &[ResultColumn::TableStar("t".to_string())]);
        let from = stmt.core.from.as_ref().unwrap();
        assert!(matches!(
            &from.first,
            SingleSource::Table { database: Some(db), name, alias: Some(a), .. }
                if db == "db" && name == "t" && a == "t"
        ));
        assert_eq!(from.joins.len(), 3);
        assert_eq!(
            from.joins[0].op,
            JoinOp::Join {
                natural: true,
                kind: Some(JoinKind::LeftOuter)
            }
        );
        assert_eq!(
            from.joins[0].constraint,
            Some(JoinConstraint::Using(vec!["id".to_string()]))
        );
        assert_eq!(from.joins[1].op, JoinOp::Comma);
        assert!(matches!(
            from.joins[2].constraint,
            Some(JoinConstraint::On(_))
        ));
        assert!(!from.is_single_table());
    }

    #[test]
    fn test_subselect_source_and_compound() {
        let stmt =
            parse("select a from (select a from b) x union all select a from c").unwrap();
        assert!(matches!(
            stmt.core.from.as_ref().map(|f| &f.first),
            Some(SingleSource::Subquery { alias: Some(x), .. }) if x == "x"
        ));
        assert_eq!(stmt.compounds.len(), 1);
        assert_eq!(stmt.compounds[0].0, CompoundOp::UnionAll);
    }

    #[test]
    fn test_trailing_semicolon() {
        assert!(parse("select a from b;").is_ok());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let sql = "select a, d from b where c = 1 and (x > 2 or y like 'z%') group by d";
        assert_eq!(parse(sql).unwrap(), parse(sql).unwrap());
    }

    #[test]
    fn test_missing_column_list() {
        let err = parse("select from where").unwrap_err();
        match err {
            PigError::Syntax { position, message } => {
                assert_eq!(position, 7);
                assert!(message.contains("result column"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_dangling_comma() {
        let err = parse("select a, from b").unwrap_err();
        match err {
            PigError::Syntax { position, message } => {
                assert_eq!(position, 10);
                assert!(message.contains("result column"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = parse("select a from b group by a,").unwrap_err();
        assert!(
            matches!(err, PigError::Syntax { ref message, .. } if message.contains("grouping term")),
            "{:?}",
            err
        );
        assert!(parse("select a from b join c using (x, )").is_err());
    }

    #[test]
    fn test_sub_select_renders_sql_quotes() {
        let expr = where_of("select a from b where exists (select 1 from c where n = 'it''s')");
        match expr {
            Expr::Exists(select) => {
                assert_eq!(select.to_string(), "SELECT 1 FROM c WHERE n = 'it''s'")
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_trailing_garbage() {
        let err = parse("select a from b where c = 1 ordr by a").unwrap_err();
        assert!(matches!(err, PigError::Syntax { position: 28, .. }), "{:?}", err);
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse("select a from b where c = 'abc").unwrap_err();
        match err {
            PigError::Syntax { position, message } => {
                assert_eq!(position, 26);
                assert!(message.contains("closing quote"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_nesting_cap() {
        let grammar = Grammar::new(4);
        let deep = format!("select a from b where {}1{}", "(".repeat(10), ")".repeat(10));
        let err = grammar.parse(&deep).unwrap_err();
        assert!(matches!(err, PigError::Syntax { .. }));
        assert!(Grammar::new(16).parse(&deep).is_ok());
    }
}
