use sqlx::{Postgres, QueryBuilder};

use crate::query::select::{Column, Join, JoinKind, Predicate, SelectQuery, Value};

/// Escapes LIKE metacharacters so user text only ever matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub fn contains_pattern(raw: &str) -> String {
    format!("%{}%", escape_like(raw))
}

/// Renders the full statement. Every literal goes through `push_bind`.
pub fn render_select(query: &SelectQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT ");
    if query.distinct {
        builder.push("DISTINCT ");
    }

    for (idx, item) in query.selection.iter().enumerate() {
        if idx > 0 {
            builder.push(", ");
        }
        builder.push(item.expr.to_string());
        if let Some(alias) = item.alias {
            builder.push(" AS ");
            builder.push(alias);
        }
    }

    push_source(&mut builder, query);
    push_predicates(&mut builder, &query.predicates);

    if !query.group_by.is_empty() {
        builder.push(" GROUP BY ");
        push_columns(&mut builder, &query.group_by);
    }

    if !query.order_by.is_empty() {
        builder.push(" ORDER BY ");
        for (idx, term) in query.order_by.iter().enumerate() {
            if idx > 0 {
                builder.push(", ");
            }
            builder.push(format!("{} {}", term.expr, term.direction.as_sql()));
        }
    }

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    if let Some(offset) = query.offset {
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }

    builder
}

/// Renders `SELECT COUNT(DISTINCT key)` over the same source and predicates,
/// ignoring grouping, ordering and paging.
pub fn render_count(query: &SelectQuery, key: Column) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(DISTINCT {key})"));
    push_source(&mut builder, query);
    push_predicates(&mut builder, &query.predicates);
    builder
}

fn push_source(builder: &mut QueryBuilder<'static, Postgres>, query: &SelectQuery) {
    builder.push(format!(" FROM {} AS {}", query.from.name, query.from.alias));
    for join in &query.joins {
        push_join(builder, join);
    }
}

fn push_join(builder: &mut QueryBuilder<'static, Postgres>, join: &Join) {
    let keyword = match join.kind {
        JoinKind::Inner => "INNER JOIN",
        JoinKind::Left => "LEFT JOIN",
    };
    builder.push(format!(
        " {keyword} {} AS {} ON {} = {}",
        join.table.name, join.table.alias, join.left, join.right
    ));
}

fn push_columns(builder: &mut QueryBuilder<'static, Postgres>, columns: &[Column]) {
    for (idx, column) in columns.iter().enumerate() {
        if idx > 0 {
            builder.push(", ");
        }
        builder.push(column.to_string());
    }
}

fn push_predicates(builder: &mut QueryBuilder<'static, Postgres>, predicates: &[Predicate]) {
    for (idx, predicate) in predicates.iter().enumerate() {
        builder.push(if idx == 0 { " WHERE " } else { " AND " });
        push_predicate(builder, predicate);
    }
}

fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::Eq(column, value) => {
            builder.push(format!("{column} = "));
            push_value(builder, value);
        }
        Predicate::NotEq(column, value) => {
            builder.push(format!("{column} <> "));
            push_value(builder, value);
        }
        Predicate::In(_, values) if values.is_empty() => {
            builder.push("FALSE");
        }
        Predicate::In(column, values) => {
            builder.push(format!("{column} IN ("));
            for (idx, value) in values.iter().enumerate() {
                if idx > 0 {
                    builder.push(", ");
                }
                push_value(builder, value);
            }
            builder.push(")");
        }
        Predicate::ContainsAny(columns, needle) => {
            let pattern = contains_pattern(needle);
            builder.push("(");
            for (idx, column) in columns.iter().enumerate() {
                if idx > 0 {
                    builder.push(" OR ");
                }
                builder.push(format!("{column} ILIKE "));
                builder.push_bind(pattern.clone());
                builder.push(r" ESCAPE '\'");
            }
            builder.push(")");
        }
    }
}

fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &Value) {
    match value {
        Value::Int(value) => {
            builder.push_bind(*value);
        }
        Value::Text(value) => {
            builder.push_bind(value.clone());
        }
    }
}
