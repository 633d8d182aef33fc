/// Top-3 leaderboard.
///
/// Order: deeper floor first, then faster time. Depth always beats speed.
/// `insert` is the only mutation; the list is re-sorted and cut back to
/// `CAPACITY` every time, so it is sorted and short at all times.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::layout::GOAL_FLOOR;

pub const CAPACITY: usize = 3;
pub const NAME_MAX_CHARS: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub name: String,
    /// Records written before depth was tracked only exist for cleared runs.
    #[serde(default = "legacy_floor")]
    pub floor: usize,
    /// Seconds.
    pub time: f64,
}

fn legacy_floor() -> usize {
    GOAL_FLOOR
}

impl RankingRecord {
    pub fn new(name: impl Into<String>, floor: usize, time: f64) -> Self {
        RankingRecord { name: name.into(), floor, time }
    }
}

/// Leaderboard order: `Less` means `a` ranks above `b`.
pub fn compare(a_floor: usize, a_time: f64, b_floor: usize, b_time: f64) -> Ordering {
    b_floor.cmp(&a_floor).then(a_time.total_cmp(&b_time))
}

fn compare_records(a: &RankingRecord, b: &RankingRecord) -> Ordering {
    compare(a.floor, a.time, b.floor, b.time)
}

#[derive(Clone, Debug, Default)]
pub struct RankingStore {
    records: Vec<RankingRecord>,
}

impl RankingStore {
    pub fn new() -> Self {
        RankingStore { records: Vec::new() }
    }

    /// Build from arbitrary (e.g. loaded) records, enforcing order and size.
    pub fn from_records(mut records: Vec<RankingRecord>) -> Self {
        records.sort_by(compare_records);
        records.truncate(CAPACITY);
        RankingStore { records }
    }

    pub fn records(&self) -> &[RankingRecord] {
        &self.records
    }

    pub fn best(&self) -> Option<&RankingRecord> {
        self.records.first()
    }

    /// Would a run ending on `floor` after `time` seconds make the board?
    pub fn qualifies(&self, floor: usize, time: f64) -> bool {
        match self.records.get(CAPACITY - 1) {
            None => true,
            Some(last) => compare(floor, time, last.floor, last.time) == Ordering::Less,
        }
    }

    pub fn insert(&mut self, record: RankingRecord) {
        self.records.push(record);
        // stable: an exact tie keeps the older record ahead
        self.records.sort_by(compare_records);
        self.records.truncate(CAPACITY);
    }
}
