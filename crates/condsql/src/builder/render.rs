use super::{ClauseKind, Fragment, Mode, SqlBuilder};
use crate::error::{SqlError, SqlResult};
use crate::log::log_rendered;
use crate::statement::Statement;

impl SqlBuilder {
    /// Render the SQL text for the current mode.
    ///
    /// Does not reset the builder; rendering twice yields the same text.
    pub fn render(&self) -> SqlResult<String> {
        let sql = match self.mode {
            Mode::Select => self.render_select()?,
            Mode::Insert => self.render_insert()?,
            Mode::Update => self.render_update()?,
            Mode::Delete => self.render_delete()?,
        };
        log_rendered(&self.config, self.mode, self.params.len(), &sql);
        Ok(sql)
    }

    /// Render and hand over the SQL together with the bound parameters.
    pub fn build(self) -> SqlResult<Statement> {
        let sql = self.render()?;
        Ok(Statement::new(sql, self.params))
    }

    fn single_table(&self, verb: &str) -> SqlResult<&str> {
        match self.parts.get(ClauseKind::Table) {
            [Fragment::Text(table)] => Ok(table.as_str()),
            [] => Err(SqlError::configuration(format!("{verb} requires a table"))),
            tables => Err(SqlError::configuration(format!(
                "{verb} requires exactly one table, got {}",
                tables.len()
            ))),
        }
    }

    fn where_suffix(&self) -> String {
        self.parts
            .joined(ClauseKind::Where)
            .map(|w| format!(" WHERE {w}"))
            .unwrap_or_default()
    }

    fn render_insert(&self) -> SqlResult<String> {
        let table = self.single_table("INSERT")?;

        let (fields, values): (Vec<&str>, Vec<&str>) = self
            .parts
            .get(ClauseKind::InsertValue)
            .iter()
            .filter_map(|f| match f {
                Fragment::Column { field, value } => Some((field.as_str(), value.as_str())),
                _ => None,
            })
            .unzip();
        if fields.is_empty() {
            return Err(SqlError::configuration("INSERT requires at least one value"));
        }

        let mut sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            fields.join(","),
            values.join(",")
        );

        let duplicates: Vec<String> = self
            .parts
            .get(ClauseKind::DuplicateUpdate)
            .iter()
            .filter_map(|f| match f {
                Fragment::Duplicate { field, value } => Some(format!("{field}={value}")),
                _ => None,
            })
            .collect();
        if !duplicates.is_empty() {
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            sql.push_str(&duplicates.join(","));
        }

        if self.select_identity {
            sql.push_str(";SELECT LAST_INSERT_ID() AS id;");
        }
        Ok(sql)
    }

    fn render_update(&self) -> SqlResult<String> {
        let table = self.single_table("UPDATE")?;
        let sets = self
            .parts
            .joined(ClauseKind::UpdateValue)
            .ok_or_else(|| SqlError::configuration("UPDATE requires at least one SET assignment"))?;
        Ok(format!("UPDATE {table} SET {sets}{}", self.where_suffix()))
    }

    fn render_delete(&self) -> SqlResult<String> {
        let table = self.single_table("DELETE")?;
        Ok(format!("DELETE FROM {table}{}", self.where_suffix()))
    }

    fn render_select(&self) -> SqlResult<String> {
        let tables = self
            .parts
            .joined(ClauseKind::Table)
            .ok_or_else(|| SqlError::configuration("SELECT requires a table"))?;
        let columns = self
            .parts
            .joined(ClauseKind::Select)
            .unwrap_or_else(|| "*".to_string());

        let mut base = format!("SELECT {columns} FROM {tables}");
        if let Some(joins) = self.parts.joined(ClauseKind::Join) {
            base.push(' ');
            base.push_str(&joins);
        }
        base.push_str(&self.where_suffix());
        if let Some(group) = self.parts.joined(ClauseKind::GroupBy) {
            base.push_str(" GROUP BY ");
            base.push_str(&group);
        }
        if let Some(order) = self.parts.joined(ClauseKind::OrderBy) {
            base.push_str(" ORDER BY ");
            base.push_str(&order);
        }
        if let Some((offset, rows)) = self.parts.limit() {
            base.push_str(&format!(" LIMIT {offset},{rows}"));
        }

        let for_update = self.parts.has(ClauseKind::ForUpdate);
        let Some(page) = self.parts.page() else {
            if for_update {
                base.push_str(" FOR UPDATE");
            }
            return Ok(base);
        };

        let mut sql = format!("{base} LIMIT {},{}", page.offset, page.page_size);
        if for_update {
            sql.push_str(" FOR UPDATE");
        }
        if page.emit_count {
            let totals = if page.totals.is_empty() {
                String::new()
            } else {
                format!(", {}", page.totals)
            };
            sql.push_str(&format!(";SELECT COUNT(0) AS Count{totals} FROM ({base}) AS CT"));
        }
        Ok(sql)
    }
}
