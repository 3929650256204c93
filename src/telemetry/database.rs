use std::time::Instant;

use tracing::{Instrument, debug, info_span, trace, warn};

/// Runs a storage call inside a `db_query` span and records latency, row
/// count and failures. The rendered statement is only emitted at trace level.
pub async fn log_query<F, T, E, R>(
    query_name: &str,
    statement: Option<&str>,
    query: F,
    row_counter: R,
) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
    R: Fn(&T) -> Option<u64>,
{
    let span = info_span!("db_query", query = %query_name);
    if let Some(sql) = statement {
        span.in_scope(|| trace!(sql = %sql, "Executing statement"));
    }
    let start = Instant::now();
    let result = query.instrument(span.clone()).await;
    let duration_ms = start.elapsed().as_millis();

    span.in_scope(|| match &result {
        Ok(value) => {
            if let Some(rows) = row_counter(value) {
                debug!(latency_ms = %duration_ms, rows = %rows, "Query executed successfully");
            } else {
                debug!(latency_ms = %duration_ms, "Query executed successfully");
            }
        }
        Err(error) => {
            warn!(latency_ms = %duration_ms, error = ?error, "Query failed");
        }
    });

    result
}

#[macro_export]
macro_rules! log_query_fetch_all {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, None, $query, |rows| {
            Some(rows.len() as u64)
        })
        .await
    };
    ($name:expr, $sql:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, Some($sql), $query, |rows| {
            Some(rows.len() as u64)
        })
        .await
    };
}

#[macro_export]
macro_rules! log_query_fetch_optional {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, None, $query, |row| {
            Some(u64::from(row.is_some()))
        })
        .await
    };
}

#[macro_export]
macro_rules! log_query_fetch_one {
    ($name:expr, $sql:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, Some($sql), $query, |_| Some(1)).await
    };
}
