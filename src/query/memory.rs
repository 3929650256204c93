//! In-memory interpreter for [`SelectQuery`], used by tests to check query
//! semantics without a database. Rows are handed in already joined, keyed by
//! qualified column name (`"a.id"`, `"ua.name"`); a `None` cell stands for
//! SQL NULL, as produced by a left join with no match.

use std::{cmp::Ordering, collections::HashMap};

use crate::query::{
    render::contains_pattern,
    select::{Column, Expr, Predicate, SelectQuery, SortDirection, Value},
};

pub type Row = HashMap<String, Option<Value>>;

pub fn cell(row: &Row, column: Column) -> Option<&Value> {
    row.get(&column.to_string()).and_then(Option::as_ref)
}

pub fn execute(query: &SelectQuery, rows: &[Row]) -> Vec<Row> {
    let matching: Vec<&Row> = rows
        .iter()
        .filter(|row| query.predicates.iter().all(|predicate| matches(predicate, row)))
        .collect();

    let mut groups: Vec<Vec<&Row>> = Vec::new();
    if query.group_by.is_empty() {
        groups.extend(matching.into_iter().map(|row| vec![row]));
    } else {
        let mut index: HashMap<Vec<Option<Value>>, usize> = HashMap::new();
        for row in matching {
            let key: Vec<Option<Value>> = query
                .group_by
                .iter()
                .map(|column| cell(row, *column).cloned())
                .collect();
            match index.get(&key) {
                Some(&slot) => groups[slot].push(row),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            }
        }
    }

    groups.sort_by(|left, right| {
        for term in &query.order_by {
            let ordering = compare_nullable(eval(term.expr, left), eval(term.expr, right));
            let ordering = match term.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    let mut output: Vec<Row> = Vec::new();
    for group in &groups {
        let projected: Row = query
            .selection
            .iter()
            .map(|item| (item.output_name(), eval(item.expr, group)))
            .collect();
        if query.distinct && output.contains(&projected) {
            continue;
        }
        output.push(projected);
    }

    let offset = query.offset.unwrap_or(0).max(0) as usize;
    let output = output.into_iter().skip(offset);
    match query.limit {
        Some(limit) => output.take(limit.max(0) as usize).collect(),
        None => output.collect(),
    }
}

fn eval(expr: Expr, group: &[&Row]) -> Option<Value> {
    match expr {
        Expr::Column(column) => group.first().and_then(|row| cell(row, column).cloned()),
        Expr::Min(column) => group.iter().filter_map(|row| cell(row, column)).min().cloned(),
    }
}

// NULLs sort last in ascending order, matching PostgreSQL.
fn compare_nullable(left: Option<Value>, right: Option<Value>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn matches(predicate: &Predicate, row: &Row) -> bool {
    match predicate {
        Predicate::Eq(column, value) => cell(row, *column) == Some(value),
        Predicate::NotEq(column, value) => cell(row, *column).is_some_and(|cell| cell != value),
        Predicate::In(column, values) => cell(row, *column).is_some_and(|cell| values.contains(cell)),
        Predicate::ContainsAny(columns, needle) => {
            let pattern = like_tokens(&contains_pattern(needle));
            columns.iter().any(|column| match cell(row, *column) {
                Some(Value::Text(text)) => {
                    let text: Vec<char> = text.to_lowercase().chars().collect();
                    like_matches(&text, &pattern)
                }
                _ => false,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    AnyRun,
    AnyChar,
    Literal(char),
}

/// Reads a pattern the way `ILIKE ... ESCAPE '\'` does, lowercased.
fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars().flat_map(char::to_lowercase);
    while let Some(ch) = chars.next() {
        tokens.push(match ch {
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyChar,
            other => LikeToken::Literal(other),
        });
    }
    tokens
}

fn like_matches(text: &[char], pattern: &[LikeToken]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((LikeToken::AnyRun, rest)) => {
            (0..=text.len()).any(|skip| like_matches(&text[skip..], rest))
        }
        Some((LikeToken::AnyChar, rest)) => !text.is_empty() && like_matches(&text[1..], rest),
        Some((LikeToken::Literal(ch), rest)) => {
            text.first() == Some(ch) && like_matches(&text[1..], rest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ilike(text: &str, pattern: &str) -> bool {
        let text: Vec<char> = text.to_lowercase().chars().collect();
        like_matches(&text, &like_tokens(pattern))
    }

    #[test]
    fn unescaped_metacharacters_are_wildcards() {
        assert!(ilike("Release 50 x done", "%50%%"));
        assert!(ilike("snakeXcase", "SNAKE_case"));
        assert!(!ilike("snake", "snake_"));
    }

    #[test]
    fn escaped_metacharacters_match_literally() {
        assert!(ilike("Release 50% done", &contains_pattern("50%")));
        assert!(!ilike("Release 50 x done", &contains_pattern("50%")));
        assert!(ilike("snake_case", &contains_pattern("SNAKE_")));
        assert!(!ilike("snakeXcase", &contains_pattern("SNAKE_")));
        assert!(ilike(r"C:\temp", &contains_pattern(r"c:\")));
    }
}
