//! The decoded message tree the generator walks.
//!
//! Wire decoding itself happens upstream; everything here is assumed to already
//! be a validated protocol-buffer-shaped tree. The types mirror the upstream
//! message family one-for-one so that a decoder can be bolted on without
//! touching the generator.

use serde::{Deserialize, Serialize};

/// Which storage model a collection reference is operating over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataModel {
    Table,
    Document,
}

/// A fully or partially qualified collection reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub schema: Option<String>,
    pub name: String,
}

/// A column (or, in document mode, an implicit `doc` column) reference, optionally
/// addressing into a JSON document via `document_path`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnIdent {
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
    pub name: Option<String>,
    pub document_path: Vec<DocumentPathItem>,
}

/// One segment of a JSON document path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocumentPathItem {
    Member(String),
    MemberAsterisk,
    ArrayIndex(u32),
    ArrayIndexAsterisk,
    DoubleAsterisk,
}

/// The content type of an octet-string scalar, controlling how it's rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    Plain = 0,
    Geometry = 1,
    Json = 2,
    Xml = 3,
}

/// A scalar literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    UInt(u64),
    SInt(i64),
    Null,
    Octets { bytes: Vec<u8>, content_type: ContentType },
    String(String),
    Double(f64),
    Float(f32),
    Bool(bool),
}

/// Comparison, logical and arithmetic operators used by `Expr::Operator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Not,
    Like,
    Regexp,
    Between,
    In,
    Is,
    IsNot,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    BitNot,
    Cast,
    Overlaps,
}

/// The recursive expression tree the generator walks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Ident(ColumnIdent),
    Literal(Scalar),
    Variable(String),
    FuncCall { name: String, args: Vec<Expr> },
    Operator { op: Operator, args: Vec<Expr> },
    Placeholder(usize),
    Object(Vec<(String, Expr)>),
    Array(Vec<Expr>),
}

/// Read-only context shared by every sub-generation within one statement.
pub struct GeneratorContext<'a> {
    pub args: &'a [Scalar],
    pub default_schema: Option<&'a str>,
    pub relational: bool,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(args: &'a [Scalar], default_schema: Option<&'a str>, relational: bool) -> Self {
        Self { args, default_schema, relational }
    }
}

/// Ascending/descending sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub expr: Expr,
    pub direction: SortDirection,
}

/// `LIMIT n [OFFSET m]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Limit {
    pub row_count: u64,
    pub offset: Option<u64>,
}

/// One row of an Insert, in projection order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertRow {
    pub fields: Vec<Expr>,
}

/// The kind of mutation an `UpdateOperation` performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOpKind {
    Set,
    ItemRemove,
    ItemSet,
    ItemReplace,
    ItemMerge,
    ArrayInsert,
    ArrayAppend,
}

/// One entry of an Update's operation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOperation {
    pub source: ColumnIdent,
    pub op: UpdateOpKind,
    pub value: Option<Expr>,
}

/// A decoded `Insert` CRUD message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertMessage {
    pub collection: Collection,
    pub data_model: DataModel,
    pub projection: Vec<String>,
    pub rows: Vec<InsertRow>,
    pub args: Vec<Scalar>,
}

/// A decoded `Update` CRUD message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMessage {
    pub collection: Collection,
    pub data_model: DataModel,
    pub operations: Vec<UpdateOperation>,
    pub criteria: Option<Expr>,
    pub order: Vec<Order>,
    pub limit: Option<Limit>,
    pub args: Vec<Scalar>,
}
