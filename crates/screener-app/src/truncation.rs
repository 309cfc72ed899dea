// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ResultRow;
use tracing::debug;

/// A pre-rendered result row. Position is fixed at construction; `visible` is
/// only ever written by [`apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct RowHandle {
    pub ordinal: usize,
    pub row: ResultRow,
    pub visible: bool,
}

impl RowHandle {
    pub const fn rank(&self) -> usize {
        self.ordinal + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationState {
    /// Parsed positive input, `None` when the input fell back to "show all".
    pub requested: Option<usize>,
    pub effective_count: usize,
    pub total: usize,
    pub was_capped: bool,
}

impl TruncationState {
    pub const fn is_visible(&self, ordinal: usize) -> bool {
        ordinal < self.effective_count
    }

    pub fn status_text(&self) -> String {
        if self.total == 0 {
            return "no results available".to_owned();
        }
        if self.was_capped {
            format!(
                "showing {} of {} (capped at {})",
                self.effective_count, self.total, self.total
            )
        } else {
            format!("showing {} of {}", self.effective_count, self.total)
        }
    }
}

/// Lenient base-10 parse of live input: surrounding whitespace and an optional
/// sign are accepted, then the leading digit run is used. Anything that does
/// not yield a positive integer returns `None`.
pub fn parse_requested_count(raw: &str) -> Option<usize> {
    let trimmed = raw.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = unsigned
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if digits.is_empty() || negative {
        return None;
    }

    // All-digit input that overflows is still "more than we have".
    let value = digits.parse::<usize>().unwrap_or(usize::MAX);
    (value > 0).then_some(value)
}

pub fn recompute(raw: &str, total: usize) -> TruncationState {
    let requested = parse_requested_count(raw);
    match requested {
        Some(count) if count > total => TruncationState {
            requested,
            effective_count: total,
            total,
            was_capped: total > 0,
        },
        Some(count) => TruncationState {
            requested,
            effective_count: count,
            total,
            was_capped: false,
        },
        None => TruncationState {
            requested,
            effective_count: total,
            total,
            was_capped: false,
        },
    }
}

pub fn apply(state: &TruncationState, rows: &mut [RowHandle]) {
    for row in rows {
        row.visible = state.is_visible(row.ordinal);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListTruncationController {
    rows: Vec<RowHandle>,
    input: String,
    state: TruncationState,
}

impl ListTruncationController {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self::with_input(rows, "")
    }

    pub fn with_input(rows: Vec<ResultRow>, input: &str) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(ordinal, row)| RowHandle {
                ordinal,
                row,
                visible: false,
            })
            .collect::<Vec<_>>();
        let total = rows.len();
        let mut controller = Self {
            rows,
            input: String::new(),
            state: recompute("", total),
        };
        controller.on_input_changed(input);
        controller
    }

    pub fn on_input_changed(&mut self, raw: &str) -> TruncationState {
        self.input = raw.to_owned();
        self.state = recompute(raw, self.rows.len());
        apply(&self.state, &mut self.rows);
        debug!(
            input = raw,
            effective = self.state.effective_count,
            total = self.state.total,
            capped = self.state.was_capped,
            "recomputed row visibility"
        );
        self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub const fn state(&self) -> &TruncationState {
        &self.state
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[RowHandle] {
        &self.rows
    }

    pub fn row(&self, ordinal: usize) -> Option<&RowHandle> {
        self.rows.get(ordinal)
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &RowHandle> {
        self.rows.iter().filter(|row| row.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.state.effective_count
    }
}
