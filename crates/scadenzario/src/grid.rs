//! Month-grid construction: date buckets, cell enumeration, navigation.
//!
//! Everything here is a pure computation over the loaded task list; the
//! rendering step lives in `html` and consumes the [`CalendarView`] this
//! module produces.

use chrono::{Datelike, Months, NaiveDate};
use std::collections::HashMap;

use crate::types::{PriorityClass, Task};

/// Fixed grid size: 6 rows of 7 days.
pub const GRID_CELLS: usize = 42;

/// One task as it appears inside a calendar cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    /// Store identifier, carried so the renderer can address the edit route
    pub task_id: String,
    pub title: String,
    pub priority: PriorityClass,
    /// Due strictly before today and still open
    pub overdue: bool,
}

/// Tasks grouped by their due-date key.
///
/// Built once from a task list and never mutated afterwards; display order
/// inside a bucket is input order. Refreshing means rebuilding from a fresh
/// list.
#[derive(Debug, Default)]
pub struct DateBucketIndex {
    buckets: HashMap<String, Vec<DisplayRecord>>,
}

impl DateBucketIndex {
    pub fn build(tasks: &[Task], today: NaiveDate) -> Self {
        let today_key = today.format("%Y-%m-%d").to_string();

        let mut buckets: HashMap<String, Vec<DisplayRecord>> = HashMap::new();
        for task in tasks {
            // Both sides are zero-padded YYYY-MM-DD, so the string compare
            // is date order. A malformed due date never compares as past.
            let overdue = task.due_date.as_str() < today_key.as_str() && !task.is_completed();

            buckets
                .entry(task.due_date.clone())
                .or_default()
                .push(DisplayRecord {
                    task_id: task.id.clone(),
                    title: task.subject.clone(),
                    priority: task.priority_class(),
                    overdue,
                });
        }

        Self { buckets }
    }

    pub fn get(&self, key: &str) -> Option<&[DisplayRecord]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Number of distinct due dates.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Canonical zero-padded YYYY-MM-DD key.
pub fn date_key(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

/// The currently displayed month, tracked as an explicit value owned by the
/// caller rather than ambient state. Always holds the first day of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    first: NaiveDate,
}

impl MonthCursor {
    /// Cursor for the given 1-based month, or None when out of range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// Cursor for the month containing `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// Shift the displayed month by `dir` months (±1 from the navigation
    /// arrows), wrapping year boundaries. Saturates at the ends of the
    /// representable date range.
    pub fn advance(&mut self, dir: i32) {
        let shifted = if dir >= 0 {
            self.first.checked_add_months(Months::new(dir as u32))
        } else {
            self.first.checked_sub_months(Months::new(dir.unsigned_abs()))
        };

        if let Some(first) = shifted {
            self.first = first;
        }
    }

    /// Point the cursor back at the real-world current month.
    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::for_date(today);
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// 1-based month.
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }
}

/// One of the 42 slots in the rendered grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// Day-of-month number shown in the cell corner
    pub day: u32,
    /// False for the previous/next-month padding cells
    pub in_month: bool,
    pub is_today: bool,
    /// Set iff the cell belongs to the displayed month
    pub date_key: Option<String>,
    /// Bucket contents for in-month cells, input order
    pub tasks: Vec<DisplayRecord>,
}

impl GridCell {
    fn other_month(day: u32) -> Self {
        Self {
            day,
            in_month: false,
            is_today: false,
            date_key: None,
            tasks: Vec::new(),
        }
    }
}

/// A fully computed month view, ready for rendering.
#[derive(Debug, Clone)]
pub struct CalendarView {
    pub year: i32,
    /// 1-based month
    pub month: u32,
    /// Heading in "June 2024" form
    pub title: String,
    /// Exactly [`GRID_CELLS`] entries
    pub cells: Vec<GridCell>,
}

/// Build the 42-cell view for the cursor's month.
///
/// Leading cells carry the tail of the previous month and trailing cells the
/// head of the next; neither is date-addressable.
pub fn generate(cursor: MonthCursor, index: &DateBucketIndex, today: NaiveDate) -> CalendarView {
    let first = cursor.first_day();
    let year = first.year();
    let month = first.month();

    // 0 = Sunday, matching the leftmost grid column
    let first_weekday = first.weekday().num_days_from_sunday();
    let days_in_month = month_length(first);
    let prev_month_last_day = first.pred_opt().map_or(0, |d| d.day());

    let mut cells = Vec::with_capacity(GRID_CELLS);

    // Tail of the previous month
    for i in (1..=first_weekday).rev() {
        cells.push(GridCell::other_month(prev_month_last_day + 1 - i));
    }

    // The displayed month itself
    for day in 1..=days_in_month {
        let key = date_key(year, month, day);
        let is_today = today.year() == year && today.month() == month && today.day() == day;
        let tasks = index.get(&key).map(<[DisplayRecord]>::to_vec).unwrap_or_default();

        cells.push(GridCell {
            day,
            in_month: true,
            is_today,
            date_key: Some(key),
            tasks,
        });
    }

    // Head of the next month, up to the fixed grid size
    let mut next_day = 1;
    while cells.len() < GRID_CELLS {
        cells.push(GridCell::other_month(next_day));
        next_day += 1;
    }

    CalendarView {
        year,
        month,
        title: first.format("%B %Y").to_string(),
        cells,
    }
}

/// Number of days in the month starting at `first`.
fn month_length(first: NaiveDate) -> u32 {
    match first.checked_add_months(Months::new(1)) {
        Some(next_first) => (next_first - first).num_days() as u32,
        None => 31,
    }
}
