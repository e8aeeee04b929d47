//! Journal storage
//!
//! `Journal` is the narrow interface the scheduler core consumes;
//! `SledJournal` persists records to a sled database so bills survive
//! process restart. Keys are big-endian record ids, values are bincode,
//! so a plain key scan yields records in id order.

use chrono::NaiveDateTime;
use sled::Db;
use std::path::Path;

use crate::error::{JournalError, JournalResult};
use crate::record::{DetailRecord, NewRecord, RecordId};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Narrow journal interface consumed by the scheduler
pub trait Journal: Send + Sync {
    /// Open a new record; `start_time` is set to the request time
    fn create_record(&self, seed: NewRecord) -> JournalResult<RecordId>;

    /// Update a record's segment cost, optionally closing it
    ///
    /// Closing sets the end time and the service duration in seconds.
    /// Every cost write refreshes the record's per-room running total.
    fn update_cost(
        &self,
        record_id: RecordId,
        cost: f64,
        end_time: Option<&str>,
    ) -> JournalResult<()>;

    /// Refresh a record's fee rate and fan speed after a speed change
    fn update_fan_speed(
        &self,
        record_id: RecordId,
        fee_rate: f64,
        fan_speed: &str,
    ) -> JournalResult<()>;

    /// Fetch a single record
    fn get(&self, record_id: RecordId) -> JournalResult<Option<DetailRecord>>;

    /// All records for a room, id ascending
    fn list_for_room(&self, room_id: u32) -> JournalResult<Vec<DetailRecord>>;

    /// Total segment cost for a room
    fn sum_for_room(&self, room_id: u32) -> JournalResult<f64>;

    /// Total segment cost across all rooms
    fn sum_all(&self) -> JournalResult<f64>;

    /// Total segment cost for records whose start time falls in the range
    ///
    /// Bounds are inclusive `%Y-%m-%d %H:%M:%S` strings compared
    /// lexically; `None` leaves that side unbounded.
    fn sum_range(&self, start: Option<&str>, end: Option<&str>) -> JournalResult<f64>;

    /// Delete every record
    fn clear_all(&self) -> JournalResult<()>;
}

/// Sled-backed journal
pub struct SledJournal {
    db: Db,
}

impl SledJournal {
    /// Open (or create) a journal at the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> JournalResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// In-memory journal for tests; nothing is kept on disk
    pub fn temporary() -> JournalResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    fn load(&self, record_id: RecordId) -> JournalResult<DetailRecord> {
        match self.db.get(record_id.to_be_bytes())? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Err(JournalError::RecordNotFound(record_id)),
        }
    }

    fn save(&self, record: &DetailRecord) -> JournalResult<()> {
        let bytes = bincode::serialize(record)?;
        self.db.insert(record.id.to_be_bytes(), bytes)?;
        Ok(())
    }

    /// Iterate all records in id order, applying `f` to each
    fn fold<T>(
        &self,
        mut acc: T,
        mut f: impl FnMut(&mut T, DetailRecord),
    ) -> JournalResult<T> {
        for entry in self.db.iter() {
            let (_, bytes) = entry?;
            let record: DetailRecord = bincode::deserialize(&bytes)?;
            f(&mut acc, record);
        }
        Ok(acc)
    }

    fn parse_time(value: &str) -> JournalResult<NaiveDateTime> {
        NaiveDateTime::parse_from_str(value, TIME_FORMAT)
            .map_err(|_| JournalError::InvalidTimestamp(value.to_string()))
    }
}

impl Journal for SledJournal {
    fn create_record(&self, seed: NewRecord) -> JournalResult<RecordId> {
        let id = self.db.generate_id()?;
        let prior = self.sum_for_room(seed.room_id)?;
        let record = DetailRecord {
            id,
            room_id: seed.room_id,
            start_time: seed.request_time.clone(),
            request_time: seed.request_time,
            end_time: None,
            mode: seed.mode,
            target_temp: seed.target_temp,
            fan_speed: seed.fan_speed,
            fee_rate: seed.fee_rate,
            service_duration: 0,
            cost: 0.0,
            accumulated_cost: prior,
            operation_type: seed.operation_type.to_string(),
        };
        self.save(&record)?;
        Ok(id)
    }

    fn update_cost(
        &self,
        record_id: RecordId,
        cost: f64,
        end_time: Option<&str>,
    ) -> JournalResult<()> {
        let mut record = self.load(record_id)?;
        // Running total = everything this room accrued before this
        // segment, plus this segment's cost so far.
        let prior = self.fold(0.0, |sum, r| {
            if r.room_id == record.room_id && r.id < record_id {
                *sum += r.cost;
            }
        })?;
        record.cost = cost;
        record.accumulated_cost = prior + cost;
        if let Some(end) = end_time {
            let started = Self::parse_time(&record.start_time)?;
            let ended = Self::parse_time(end)?;
            record.end_time = Some(end.to_string());
            record.service_duration = (ended - started).num_seconds().max(0);
        }
        self.save(&record)
    }

    fn update_fan_speed(
        &self,
        record_id: RecordId,
        fee_rate: f64,
        fan_speed: &str,
    ) -> JournalResult<()> {
        let mut record = self.load(record_id)?;
        record.fee_rate = fee_rate;
        record.fan_speed = fan_speed.to_string();
        self.save(&record)
    }

    fn get(&self, record_id: RecordId) -> JournalResult<Option<DetailRecord>> {
        match self.db.get(record_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn list_for_room(&self, room_id: u32) -> JournalResult<Vec<DetailRecord>> {
        self.fold(Vec::new(), |list, record| {
            if record.room_id == room_id {
                list.push(record);
            }
        })
    }

    fn sum_for_room(&self, room_id: u32) -> JournalResult<f64> {
        self.fold(0.0, |sum, record| {
            if record.room_id == room_id {
                *sum += record.cost;
            }
        })
    }

    fn sum_all(&self) -> JournalResult<f64> {
        self.fold(0.0, |sum, record| *sum += record.cost)
    }

    fn sum_range(&self, start: Option<&str>, end: Option<&str>) -> JournalResult<f64> {
        self.fold(0.0, |sum, record| {
            let after_start = start.map_or(true, |s| record.start_time.as_str() >= s);
            let before_end = end.map_or(true, |e| record.start_time.as_str() <= e);
            if after_start && before_end {
                *sum += record.cost;
            }
        })
    }

    fn clear_all(&self) -> JournalResult<()> {
        self.db.clear()?;
        self.db.flush()?;
        Ok(())
    }
}
