//! Flat tree rows of the source control list.
//!
//! The SCM tree is rendered as a flat, virtualized list. Hierarchy is only
//! recoverable from each row's `data-index` and `aria-level`.

use std::ops::Range;

/// What a rendered row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Repository header (only present with more than one provider).
    Provider,
    /// "Changes", "Staged Changes", "Merge Changes".
    Group,
    /// One changed file.
    Change,
}

/// One list row as read from the DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub index: usize,
    pub level: usize,
    pub kind: RowKind,
    pub label: String,
    /// Count badge of a group row, zero otherwise.
    pub count: usize,
}

impl Row {
    pub fn new(index: usize, level: usize, kind: RowKind, label: impl Into<String>) -> Self {
        Self {
            index,
            level,
            kind,
            label: label.into(),
            count: 0,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Label VS Code gives the group holding staged or unstaged changes.
pub fn group_label(staged: bool) -> &'static str {
    if staged {
        "Staged Changes"
    } else {
        "Changes"
    }
}

/// Change rows that belong to `header`: the run of rows nested below the
/// header, cut at the first row back at or above its level, with index in
/// `(header.index, header.index + count]`.
pub fn changes_of<'r>(rows: &'r [Row], header: &Row, count: usize) -> Vec<&'r Row> {
    let last = header.index + count;
    rows.iter()
        .skip_while(|r| r.index <= header.index)
        .take_while(|r| r.level > header.level && r.index <= last)
        .filter(|r| r.kind == RowKind::Change)
        .collect()
}

/// Positions (into `rows`) of the provider headers.
pub fn provider_headers(rows: &[Row]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, r)| r.kind == RowKind::Provider)
        .map(|(i, _)| i)
        .collect()
}

/// Positions covered by the provider whose header has `data-index` equal to
/// `header_index`: the header itself up to the next provider header. `None`
/// when the header is not rendered.
pub fn provider_span(rows: &[Row], header_index: usize) -> Option<Range<usize>> {
    let start = rows
        .iter()
        .position(|r| r.kind == RowKind::Provider && r.index == header_index)?;
    let end = rows[start + 1..]
        .iter()
        .position(|r| r.kind == RowKind::Provider)
        .map_or(rows.len(), |p| start + 1 + p);
    Some(start..end)
}

/// Position of the staged or unstaged group inside `span`.
pub fn find_group(rows: &[Row], span: Range<usize>, staged: bool) -> Option<usize> {
    let wanted = group_label(staged);
    span.into_iter()
        .find(|&i| rows[i].kind == RowKind::Group && rows[i].label.eq_ignore_ascii_case(wanted))
}
