use std::ops::Range;

/// Default number of plate columns handled per wash group.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Air-dry time before elution when the wash ends on an odd group count.
pub const AIR_DRY_SECONDS: f64 = 120.0;

/// Split `count` ordered items into consecutive groups of `batch_size`.
///
/// The last group holds whatever is left over: 10 items in threes give
/// `[0..3, 3..6, 6..9, 9..10]`. A batch size of zero is treated as one.
pub fn group_for_batch(count: usize, batch_size: usize) -> Vec<Range<usize>> {
    let batch_size = batch_size.max(1);
    (0..count)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(count))
        .collect()
}

/// Seconds the wash liquid sits before it is removed from a group of
/// `group_len` columns.
///
/// A full group goes straight to aspiration because adding to the later
/// columns already took that long. Short groups wait to make up the
/// difference: 5 s for one column short, 3 s more per further column.
pub fn soak_seconds(group_len: usize, batch_size: usize) -> f64 {
    match batch_size.saturating_sub(group_len) {
        0 => 0.0,
        short => 5.0 + 3.0 * (short - 1) as f64,
    }
}

/// Column grouping and timings for a bead-cleanup wash.
#[derive(Debug, Clone, PartialEq)]
pub struct WashSchedule {
    /// Wash groups in processing order.
    pub groups: Vec<Range<usize>>,
    /// Columns eluted together. With more than two wash groups the first
    /// part gets its elution buffer early, during the second wash.
    pub elution: Vec<Range<usize>>,
    /// Index of the wash group after which the early elution buffer is
    /// added, if any.
    pub early_elution_after: Option<usize>,
    /// Whether the beads air-dry before elution.
    pub air_dry: bool,
    batch_size: usize,
}

impl WashSchedule {
    /// Plan washes for `columns` plate columns.
    pub fn new(columns: usize, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        let groups = group_for_batch(columns, batch_size);

        let (elution, early_elution_after) = if groups.len() <= 2 {
            (vec![0..columns], None)
        } else {
            let split = (2 * batch_size).min(columns);
            (vec![0..split, split..columns], Some(2))
        };

        Self {
            air_dry: groups.len() % 2 == 1,
            groups,
            elution,
            early_elution_after,
            batch_size,
        }
    }

    /// Soak time for the group at `index`.
    pub fn soak_seconds(&self, index: usize) -> f64 {
        self.groups
            .get(index)
            .map(|g| soak_seconds(g.len(), self.batch_size))
            .unwrap_or(0.0)
    }
}
