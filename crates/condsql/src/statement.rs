//! Rendered statements.

use crate::params::Params;

/// SQL text plus its named parameters.
///
/// A paged SELECT with a count, or an INSERT with `select_identity`, renders
/// several statements joined by `;`. They must be executed together against
/// the same parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Params) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The individual statements, without empty trailing pieces.
    pub fn statements(&self) -> Vec<&str> {
        self.sql
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Split a paged query into `(rows_sql, count_sql)`.
    ///
    /// `count_sql` is `None` when the statement carries no count query.
    pub fn split_page(&self) -> (&str, Option<&str>) {
        match self.sql.split_once(";SELECT COUNT(0)") {
            Some((rows, _)) => (rows, Some(&self.sql[rows.len() + 1..])),
            None => (self.sql.as_str(), None),
        }
    }

    pub fn into_parts(self) -> (String, Params) {
        (self.sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_drop_empty_pieces() {
        let st = Statement::new(
            "INSERT INTO t (a) VALUES (@a);SELECT LAST_INSERT_ID() AS id;",
            Params::new(),
        );
        assert_eq!(
            st.statements(),
            vec!["INSERT INTO t (a) VALUES (@a)", "SELECT LAST_INSERT_ID() AS id"]
        );
    }

    #[test]
    fn split_page_separates_count() {
        let st = Statement::new(
            "SELECT * FROM t LIMIT 0,20;SELECT COUNT(0) AS Count FROM (SELECT * FROM t) AS CT",
            Params::new(),
        );
        let (rows, count) = st.split_page();
        assert_eq!(rows, "SELECT * FROM t LIMIT 0,20");
        assert_eq!(
            count,
            Some("SELECT COUNT(0) AS Count FROM (SELECT * FROM t) AS CT")
        );

        let plain = Statement::new("SELECT * FROM t", Params::new());
        assert_eq!(plain.split_page(), ("SELECT * FROM t", None));
    }
}
