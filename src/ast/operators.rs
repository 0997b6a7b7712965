use serde::{Deserialize, Serialize};

/// Prefix operators (highest precedence tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Minus,
    Plus,
    BitNot,
    Not,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Minus => write!(f, "-"),
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::BitNot => write!(f, "~"),
            UnaryOp::Not => write!(f, "NOT"),
        }
    }
}

/// Binary operators. Each variant keeps the exact SQL spelling it was parsed
/// from, so `==` and `=` (or `!=` and `<>`) stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // ||
    Concat,
    // * / %
    Mul,
    Div,
    Mod,
    // + -
    Add,
    Sub,
    // << >> & |
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitOr,
    // < <= > >=
    Lt,
    Lte,
    Gt,
    Gte,
    // = == != <> IS IN LIKE GLOB MATCH REGEXP
    Eq,
    EqEq,
    Ne,
    LtGt,
    Is,
    IsNot,
    In,
    NotIn,
    Like,
    NotLike,
    Glob,
    NotGlob,
    Match,
    NotMatch,
    Regexp,
    NotRegexp,
    // AND OR
    And,
    Or,
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinaryOp::Concat => "||",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Eq => "=",
            BinaryOp::EqEq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::LtGt => "<>",
            BinaryOp::Is => "IS",
            BinaryOp::IsNot => "IS NOT",
            BinaryOp::In => "IN",
            BinaryOp::NotIn => "NOT IN",
            BinaryOp::Like => "LIKE",
            BinaryOp::NotLike => "NOT LIKE",
            BinaryOp::Glob => "GLOB",
            BinaryOp::NotGlob => "NOT GLOB",
            BinaryOp::Match => "MATCH",
            BinaryOp::NotMatch => "NOT MATCH",
            BinaryOp::Regexp => "REGEXP",
            BinaryOp::NotRegexp => "NOT REGEXP",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        };
        write!(f, "{}", s)
    }
}

/// Compound operators joining select cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundOp {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl std::fmt::Display for CompoundOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompoundOp::Union => write!(f, "UNION"),
            CompoundOp::UnionAll => write!(f, "UNION ALL"),
            CompoundOp::Intersect => write!(f, "INTERSECT"),
            CompoundOp::Except => write!(f, "EXCEPT"),
        }
    }
}

/// Join flavour of an explicit `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Cross,
    Left,
    LeftOuter,
    Outer,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER"),
            JoinKind::Cross => write!(f, "CROSS"),
            JoinKind::Left => write!(f, "LEFT"),
            JoinKind::LeftOuter => write!(f, "LEFT OUTER"),
            JoinKind::Outer => write!(f, "OUTER"),
        }
    }
}

/// `DISTINCT` / `ALL` modifier of a select core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantifier {
    Distinct,
    All,
}

impl std::fmt::Display for Quantifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantifier::Distinct => write!(f, "DISTINCT"),
            Quantifier::All => write!(f, "ALL"),
        }
    }
}

/// Sort direction of an ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

/// Target type of a `CAST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeName {
    Text,
    Real,
    Integer,
    Blob,
    Null,
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Text => write!(f, "TEXT"),
            TypeName::Real => write!(f, "REAL"),
            TypeName::Integer => write!(f, "INTEGER"),
            TypeName::Blob => write!(f, "BLOB"),
            TypeName::Null => write!(f, "NULL"),
        }
    }
}
