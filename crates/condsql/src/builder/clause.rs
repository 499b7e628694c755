//! Clause fragment storage.

use std::collections::BTreeMap;

/// The clause a fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseKind {
    Table,
    Select,
    Join,
    Where,
    GroupBy,
    OrderBy,
    Limit,
    Page,
    ForUpdate,
    InsertValue,
    UpdateValue,
    DuplicateUpdate,
}

impl ClauseKind {
    /// Separator placed between fragments of this kind.
    pub fn separator(self) -> &'static str {
        match self {
            ClauseKind::Where => " AND ",
            ClauseKind::Join => " ",
            _ => ",",
        }
    }
}

/// Pagination directive. Always stored whole, so readers never see a
/// partially recorded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageArgs {
    pub offset: i64,
    pub page_size: i32,
    pub emit_count: bool,
    /// Extra aggregate columns for the count statement (may be empty).
    pub totals: String,
}

impl PageArgs {
    /// Directive for the 1-based `page_index`.
    pub fn new(page_index: i32, page_size: i32, emit_count: bool, totals: impl Into<String>) -> Self {
        Self {
            offset: (i64::from(page_index) - 1) * i64::from(page_size),
            page_size,
            emit_count,
            totals: totals.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Raw clause text.
    Text(String),
    /// A `column`/`value` pair for INSERT; `value` is `@name` or a literal.
    Column { field: String, value: String },
    /// `field=value` assignment for ON DUPLICATE KEY UPDATE.
    Duplicate { field: String, value: String },
    Limit { offset: i64, rows: i64 },
    Page(PageArgs),
    ForUpdate,
}

impl Fragment {
    pub fn text(s: impl Into<String>) -> Self {
        Fragment::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Fragment::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Ordered multi-map from clause kind to fragments.
///
/// Fragments of one kind keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseStore {
    parts: BTreeMap<ClauseKind, Vec<Fragment>>,
}

impl ClauseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ClauseKind, fragment: Fragment) {
        self.parts.entry(kind).or_default().push(fragment);
    }

    /// Drop every fragment of `kind`.
    pub fn remove(&mut self, kind: ClauseKind) -> Option<Vec<Fragment>> {
        self.parts.remove(&kind)
    }

    /// Drop every fragment of `kind` and store `fragment` alone.
    pub fn replace(&mut self, kind: ClauseKind, fragment: Fragment) {
        self.parts.insert(kind, vec![fragment]);
    }

    /// Fragments of `kind`, empty if none were added.
    pub fn get(&self, kind: ClauseKind) -> &[Fragment] {
        self.parts.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, kind: ClauseKind) -> bool {
        !self.get(kind).is_empty()
    }

    pub fn count(&self, kind: ClauseKind) -> usize {
        self.get(kind).len()
    }

    /// Text fragments of `kind`, joined by the kind's separator.
    pub fn joined(&self, kind: ClauseKind) -> Option<String> {
        let texts: Vec<&str> = self.get(kind).iter().filter_map(Fragment::as_text).collect();
        (!texts.is_empty()).then(|| texts.join(kind.separator()))
    }

    pub fn page(&self) -> Option<&PageArgs> {
        self.get(ClauseKind::Page).iter().find_map(|f| match f {
            Fragment::Page(args) => Some(args),
            _ => None,
        })
    }

    pub fn limit(&self) -> Option<(i64, i64)> {
        self.get(ClauseKind::Limit).iter().find_map(|f| match f {
            Fragment::Limit { offset, rows } => Some((*offset, *rows)),
            _ => None,
        })
    }
}
