//! `tracing` output for rendered statements.

use crate::builder::Mode;
use crate::config::{BuilderConfig, LogLevel};

pub(crate) const SQL_TARGET: &str = "condsql.sql";

/// Cut `sql` at `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn truncate_sql(sql: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
        _ => sql.to_string(),
    }
}

/// Emit the rendered statement under the `condsql.sql` target.
pub(crate) fn log_rendered(config: &BuilderConfig, mode: Mode, param_count: usize, sql: &str) {
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                LogLevel::Error => tracing::error!($($field)*),
                LogLevel::Warn  => tracing::warn!($($field)*),
                LogLevel::Info  => tracing::info!($($field)*),
                LogLevel::Debug => tracing::debug!($($field)*),
                LogLevel::Trace => tracing::trace!($($field)*),
            }
        };
    }

    let sql = truncate_sql(sql, config.max_log_sql_length);
    emit_at_level!(
        config.log_level,
        target: SQL_TARGET,
        mode = ?mode,
        param_count,
        sql = %sql,
    );
}
