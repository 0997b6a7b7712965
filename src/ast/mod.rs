pub mod expr;
pub mod operators;
pub mod select;
pub mod tokens;

pub use self::expr::{Expr, Literal, Quoting};
pub use self::operators::{
    BinaryOp, CompoundOp, JoinKind, Quantifier, SortOrder, TypeName, UnaryOp,
};
pub use self::select::{
    GroupBy, IndexHint, JoinClause, JoinConstraint, JoinOp, JoinSource, Limit, OrderingTerm,
    ResultColumn, SelectCore, SelectStmt, SingleSource,
};
pub use self::tokens::TokenTree;
