//! Parsed EJBQL statements.
//!
//! The translator never parses query text; it walks this tree as produced by
//! an external parser. Shapes that a grammar can't rule out (operand counts
//! of MEMBER OF / SIZE, what sits on the right of IN) are kept loose here
//! and checked during translation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Select(SelectStatement),
    Delete(DeleteStatement),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    #[serde(default)]
    pub distinct: bool,
    pub select: Vec<SelectExpression>,
    pub from: Vec<FromItem>,
    #[serde(default)]
    pub where_clause: Option<Expr>,
    #[serde(default)]
    pub group_by: Vec<Expr>,
    #[serde(default)]
    pub having: Option<Expr>,
    #[serde(default)]
    pub order_by: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    pub entity: String,
    pub id: String,
    #[serde(default)]
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectExpression {
    /// `SELECT a`: every column of the entity.
    IdentificationVariable(String),
    Path(Path),
    Aggregate(Aggregate),
    /// Any other scalar expression (arithmetic, functions, literals).
    Scalar(Expr),
}

/// A root range declaration (`Artist a`) with the joins declared off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromItem {
    pub entity: String,
    pub id: String,
    #[serde(default)]
    pub joins: Vec<JoinDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinDeclaration {
    pub kind: JoinKind,
    #[serde(default)]
    pub fetch: bool,
    pub path: Path,
    /// Identification variable bound to the join target; fetch joins
    /// usually have none.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub expr: Expr,
    #[serde(default)]
    pub descending: bool,
}

/// `id.component.component...`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    pub id: String,
    pub components: Vec<String>,
}

impl Path {
    pub fn new(id: &str, components: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            components: components.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn absolute(&self) -> String {
        std::iter::once(self.id.as_str())
            .chain(self.components.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn relative(&self) -> String {
        self.components.join(".")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Between {
        #[serde(default)]
        negated: bool,
        expr: Box<Expr>,
        lower: Box<Expr>,
        upper: Box<Expr>,
    },
    /// Right side is either a list of scalar items or a single subselect.
    In {
        #[serde(default)]
        negated: bool,
        expr: Box<Expr>,
        items: Vec<Expr>,
    },
    Like {
        #[serde(default)]
        negated: bool,
        #[serde(default)]
        ignore_case: bool,
        expr: Box<Expr>,
        pattern: Box<Expr>,
        #[serde(default)]
        escape: Option<char>,
    },
    IsNull {
        #[serde(default)]
        negated: bool,
        expr: Box<Expr>,
    },
    IsEmpty {
        #[serde(default)]
        negated: bool,
        path: Path,
    },
    /// `operands[0] MEMBER OF operands[1]`
    MemberOf {
        #[serde(default)]
        negated: bool,
        operands: Vec<Expr>,
    },
    /// `SIZE(operands[0])`
    Size(Vec<Expr>),
    Exists {
        #[serde(default)]
        negated: bool,
        subselect: Box<SelectStatement>,
    },
    All(Box<SelectStatement>),
    Any(Box<SelectStatement>),
    Subselect(Box<SelectStatement>),
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Path(Path),
    /// Table-layer path: components are table relationships and a column.
    DbPath(Path),
    IdentificationVariable(String),
    NamedParameter(String),
    PositionalParameter(usize),
    StringLiteral(String),
    IntegerLiteral {
        text: String,
        #[serde(default)]
        negative: bool,
    },
    DecimalLiteral {
        text: String,
        #[serde(default)]
        negative: bool,
    },
    BooleanLiteral(bool),
    Function(Function),
    Aggregate(Aggregate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimSpec {
    Leading,
    Trailing,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    Abs(Box<Expr>),
    Sqrt(Box<Expr>),
    Mod(Box<Expr>, Box<Expr>),
    Concat(Vec<Expr>),
    Substring(Vec<Expr>),
    Lower(Box<Expr>),
    Upper(Box<Expr>),
    Length(Box<Expr>),
    Locate(Vec<Expr>),
    Trim {
        #[serde(default)]
        spec: Option<TrimSpec>,
        #[serde(default)]
        character: Option<String>,
        expr: Box<Expr>,
    },
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunction {
    Count,
    Avg,
    Max,
    Min,
    Sum,
}

impl AggregateFunction {
    pub fn sql_name(self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Sum => "SUM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub function: AggregateFunction,
    #[serde(default)]
    pub distinct: bool,
    pub arg: Box<Expr>,
}
