//! The statement tree produced by the parser and consumed by the styler.
//!
//! Every node owns its children. Keyword fields hold the normalized keyword
//! (`LEFT JOIN`, `NOT IN`, `SELECT DISTINCT`) ready for display.

use smallvec::SmallVec;

/// One top-level clause, or the `;` separating independent statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Select(Select),
    From(From),
    Where(Filter),
    Having(Filter),
    GroupBy(GroupBy),
    OrderBy(OrderBy),
    Limit(Limit),
    Insert(Insert),
    Semicolon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub value: String,
    pub columns: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct From {
    pub value: String,
    pub items: Vec<FromItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromItem {
    /// A comma-separated table reference.
    Table(TableRef),
    Join(Join),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    Table(Value),
    SubSelect(SubSelect),
}

/// A parenthesized query used as a table, e.g. `(SELECT ...) AS t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSelect {
    pub statements: Vec<Statement>,
    pub alias: Option<Alias>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub value: String,
    pub table: TableRef,
    pub on: Option<On>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct On {
    pub value: String,
    pub conditions: Vec<ConditionItem>,
}

/// WHERE or HAVING.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub value: String,
    pub conditions: Vec<ConditionItem>,
}

/// Element of a condition chain. Conditions and groups alternate with links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionItem {
    Condition(Condition),
    Group(Group),
    /// `AND` / `OR`
    Link(String),
}

/// `[NOT] ( cond LINK cond ... )`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub not: bool,
    pub conditions: Vec<ConditionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub not: bool,
    pub left: Expr,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `= x`, `LIKE 'a%'`, `< ALL (SELECT ...)`, `= (SELECT ...)`
    Compare {
        op: String,
        quantifier: Option<String>,
        right: Operand,
    },
    Between {
        op: String,
        low: Expr,
        high: Expr,
    },
    IsNull {
        op: String,
    },
    In {
        op: String,
        target: InTarget,
    },
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Expr(Expr),
    List(InTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InTarget {
    List(Vec<Expr>),
    SubSelect(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBy {
    pub value: String,
    pub values: SmallVec<[Value; 4]>,
    pub with_rollup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub value: String,
    pub values: SmallVec<[Value; 4]>,
}

/// `LIMIT n`, `LIMIT offset, n` or `LIMIT n OFFSET offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limit {
    pub value: String,
    pub row_count: String,
    pub offset: Option<String>,
    /// `Some("OFFSET")` for the keyword form, `None` for the comma form.
    pub offset_keyword: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    pub value: String,
    pub table: String,
    pub columns: SmallVec<[String; 8]>,
    pub source: InsertSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertSource {
    Values { value: String, rows: Vec<Vec<Expr>> },
    Select(Vec<Statement>),
}

/// A column, operand or argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Value(Value),
    Func(Func),
    Case(Case),
    Unary(Unary),
    Operation(Operation),
}

impl Expr {
    pub fn set_alias(&mut self, alias: Option<Alias>) {
        match self {
            Expr::Value(value) => value.alias = alias,
            Expr::Func(func) => func.alias = alias,
            Expr::Case(case) => case.alias = alias,
            Expr::Unary(unary) => unary.alias = alias,
            Expr::Operation(operation) => operation.alias = alias,
        }
    }
}

/// Prefix operators applied to a single term, e.g. `-a` or `~flags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unary {
    /// Consecutive prefix operators, space-separated (`-`, `- -`).
    pub op: String,
    pub operand: Box<Expr>,
    pub alias: Option<Alias>,
}

/// Terms joined by binary operators, kept flat in source order:
/// `a + b * c` is `a` followed by `(+, b)` and `(*, c)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub first: Box<Expr>,
    pub rest: Vec<(String, Expr)>,
    pub alias: Option<Alias>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Identifier,
    Number,
    Str,
    Null,
}

/// Identifier, number, string or NULL with optional alias and sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub kind: ValueKind,
    pub text: String,
    pub alias: Option<Alias>,
    /// `ASC` / `DESC`, only set inside ORDER BY.
    pub sort: Option<String>,
}

impl Value {
    pub fn new(kind: ValueKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            alias: None,
            sort: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Whether the source spelled out `AS`.
    pub as_keyword: bool,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Func {
    pub name: String,
    /// `DISTINCT` / `ALL` before the arguments, as in `count(DISTINCT a)`.
    pub modifier: Option<String>,
    pub args: Vec<Expr>,
    pub alias: Option<Alias>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub whens: Vec<When>,
    pub else_result: Option<Box<Expr>>,
    pub alias: Option<Alias>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct When {
    pub conditions: Vec<ConditionItem>,
    pub result: Expr,
}
