use std::fmt;

/// A column qualified by the alias of the table it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub table: &'static str,
    pub name: &'static str,
}

impl Column {
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self { table, name }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// Literal compared against a column. Always sent as a bound parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expr {
    Column(Column),
    Min(Column),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(column) => write!(f, "{column}"),
            Expr::Min(column) => write!(f, "MIN({column})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<&'static str>,
}

impl SelectItem {
    pub fn column(column: Column) -> Self {
        Self {
            expr: Expr::Column(column),
            alias: None,
        }
    }

    pub fn aliased(expr: Expr, alias: &'static str) -> Self {
        Self {
            expr,
            alias: Some(alias),
        }
    }

    /// Name the value carries in a result row.
    pub fn output_name(&self) -> String {
        match (self.alias, self.expr) {
            (Some(alias), _) => alias.to_string(),
            (None, Expr::Column(column)) | (None, Expr::Min(column)) => column.name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRef {
    pub name: &'static str,
    pub alias: &'static str,
}

impl TableRef {
    pub const fn new(name: &'static str, alias: &'static str) -> Self {
        Self { name, alias }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub left: Column,
    pub right: Column,
}

impl Join {
    pub fn left(table: TableRef, left: Column, right: Column) -> Self {
        Self {
            kind: JoinKind::Left,
            table,
            left,
            right,
        }
    }

    pub fn inner(table: TableRef, left: Column, right: Column) -> Self {
        Self {
            kind: JoinKind::Inner,
            table,
            left,
            right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(Column, Value),
    NotEq(Column, Value),
    /// An empty list matches nothing.
    In(Column, Vec<Value>),
    /// Case-insensitive substring match against any of the columns. The needle
    /// is kept raw; wildcard escaping belongs to the storage adapter.
    ContainsAny(Vec<Column>, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub expr: Expr,
    pub direction: SortDirection,
}

impl OrderTerm {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: SortDirection::Asc,
        }
    }

    pub fn new(expr: Expr, direction: SortDirection) -> Self {
        Self { expr, direction }
    }
}

/// Storage-neutral description of a single read query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub distinct: bool,
    pub selection: Vec<SelectItem>,
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub predicates: Vec<Predicate>,
    pub group_by: Vec<Column>,
    pub order_by: Vec<OrderTerm>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SelectQuery {
    pub fn select_from(table: TableRef) -> Self {
        Self {
            distinct: false,
            selection: Vec::new(),
            from: table,
            joins: Vec::new(),
            predicates: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn select(mut self, item: SelectItem) -> Self {
        self.selection.push(item);
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn group(mut self, column: Column) -> Self {
        self.group_by.push(column);
        self
    }

    pub fn order(mut self, term: OrderTerm) -> Self {
        self.order_by.push(term);
        self
    }

    pub fn page(mut self, limit: Option<i64>, offset: i64) -> Self {
        self.limit = limit;
        self.offset = (offset > 0).then_some(offset);
        self
    }
}
