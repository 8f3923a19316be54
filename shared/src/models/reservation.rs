//! Reservation Model
//!
//! Cached reservations use different field names than the `reservations`
//! table (`table_no` is cached as `table`, `duration_minutes` as `duration`).
//! [`ReservationField`] is the single mapping between the two; every row
//! read, insert payload and patch goes through it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce;

/// Status given to reservations that have not been handled yet
pub const DEFAULT_STATUS: &str = "new";

/// Default sitting length in minutes
pub const DEFAULT_DURATION_MINUTES: u32 = 90;

/// Reservation fields, with their cache key and server column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReservationField {
    Id,
    Name,
    Phone,
    Date,
    People,
    Status,
    Notes,
    Table,
    Duration,
}

impl ReservationField {
    pub const ALL: [ReservationField; 9] = [
        Self::Id,
        Self::Name,
        Self::Phone,
        Self::Date,
        Self::People,
        Self::Status,
        Self::Notes,
        Self::Table,
        Self::Duration,
    ];

    /// Field name in the local cache
    pub const fn cache_key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Date => "date",
            Self::People => "people",
            Self::Status => "status",
            Self::Notes => "notes",
            Self::Table => "table",
            Self::Duration => "duration",
        }
    }

    /// Column name in the `reservations` table
    pub const fn column(self) -> &'static str {
        match self {
            Self::Table => "table_no",
            Self::Duration => "duration_minutes",
            other => other.cache_key(),
        }
    }

    pub fn from_cache_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.cache_key() == key)
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == column)
    }

    /// Comma-separated column list for `select`
    pub fn select_columns() -> String {
        Self::ALL
            .iter()
            .map(|f| f.column())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Reservation entity as cached for the admin views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub name: String,
    pub phone: String,
    /// ISO-8601 start time
    pub date: String,
    pub people: u32,
    pub status: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub table: String,
    pub duration: u32,
    /// When this entry was last written to the cache (ISO-8601)
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl Reservation {
    /// Build from a raw `reservations` row, stamping `updated_at`.
    pub fn from_row(row: &Value, updated_at: &str) -> Self {
        let col = |field: ReservationField| row.get(field.column());
        Self {
            id: coerce::text(col(ReservationField::Id)),
            name: coerce::text(col(ReservationField::Name)),
            phone: coerce::text(col(ReservationField::Phone)),
            date: coerce::text(col(ReservationField::Date)),
            people: people(col(ReservationField::People)),
            status: status(col(ReservationField::Status)),
            notes: coerce::text(col(ReservationField::Notes)),
            table: coerce::text(col(ReservationField::Table)),
            duration: duration(col(ReservationField::Duration)),
            updated_at: updated_at.to_string(),
        }
    }
}

fn people(value: Option<&Value>) -> u32 {
    coerce::integer(value).clamp(1, u32::MAX as i64) as u32
}

fn status(value: Option<&Value>) -> String {
    coerce::opt_text(value).unwrap_or_else(|| DEFAULT_STATUS.to_string())
}

fn duration(value: Option<&Value>) -> u32 {
    match coerce::integer(value) {
        n if n > 0 => n.min(u32::MAX as i64) as u32,
        _ => DEFAULT_DURATION_MINUTES,
    }
}

/// Party size as stored: at least 1
fn clamp_people(people: u32) -> u32 {
    people.max(1)
}

/// Sitting length as stored: 0 means the default
fn duration_or_default(minutes: Option<u32>) -> u32 {
    minutes
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES)
}

/// Create reservation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewReservation {
    pub name: String,
    pub phone: String,
    /// ISO-8601 start time
    #[serde(alias = "iso")]
    pub date: String,
    pub people: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
}

impl NewReservation {
    /// Server row for insert (status is always `new`)
    pub fn to_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        let mut put = |field: ReservationField, value: Value| {
            row.insert(field.column().to_string(), value);
        };
        put(ReservationField::Name, Value::from(self.name.as_str()));
        put(ReservationField::Phone, Value::from(self.phone.as_str()));
        put(ReservationField::Date, Value::from(self.date.as_str()));
        put(ReservationField::People, Value::from(clamp_people(self.people)));
        put(ReservationField::Status, Value::from(DEFAULT_STATUS));
        put(
            ReservationField::Notes,
            Value::from(self.notes.clone().unwrap_or_default()),
        );
        put(
            ReservationField::Table,
            self.table.clone().map(Value::from).unwrap_or(Value::Null),
        );
        put(ReservationField::Duration, Value::from(duration_or_default(self.duration)));
        row
    }

    /// Cache entry shown until the next admin sync replaces it
    pub fn to_optimistic(&self, id: String, updated_at: &str) -> Reservation {
        Reservation {
            id,
            name: self.name.clone(),
            phone: self.phone.clone(),
            date: self.date.clone(),
            people: clamp_people(self.people),
            status: DEFAULT_STATUS.to_string(),
            notes: self.notes.clone().unwrap_or_default(),
            table: self.table.clone().unwrap_or_default(),
            duration: duration_or_default(self.duration),
            updated_at: updated_at.to_string(),
        }
    }
}

/// Partial reservation update, keyed by cache field names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "iso")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl ReservationPatch {
    /// Fields present in this patch, in mapping-table order
    ///
    /// `people` and `duration` are normalized the same way rows are read, so
    /// the server row and the patched cache entry agree.
    pub fn fields(&self) -> Vec<(ReservationField, Value)> {
        let text = |v: &Option<String>| v.as_deref().map(Value::from);
        [
            (ReservationField::Name, text(&self.name)),
            (ReservationField::Phone, text(&self.phone)),
            (ReservationField::Date, text(&self.date)),
            (
                ReservationField::People,
                self.people.map(|p| Value::from(clamp_people(p))),
            ),
            (ReservationField::Status, text(&self.status)),
            (ReservationField::Notes, text(&self.notes)),
            (ReservationField::Table, text(&self.table)),
            (
                ReservationField::Duration,
                self.duration.map(|d| Value::from(duration_or_default(Some(d)))),
            ),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Server-side update body, keyed by column
    pub fn to_columns(&self) -> Map<String, Value> {
        self.fields()
            .into_iter()
            .map(|(field, value)| (field.column().to_string(), value))
            .collect()
    }

    /// Overwrite the present fields on a cached entry and restamp it.
    pub fn apply_to(&self, entry: &mut Reservation, updated_at: &str) {
        if let Some(name) = &self.name {
            entry.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            entry.phone = phone.clone();
        }
        if let Some(date) = &self.date {
            entry.date = date.clone();
        }
        if let Some(people) = self.people {
            entry.people = clamp_people(people);
        }
        if let Some(status) = &self.status {
            entry.status = status.clone();
        }
        if let Some(notes) = &self.notes {
            entry.notes = notes.clone();
        }
        if let Some(table) = &self.table {
            entry.table = table.clone();
        }
        if let Some(duration) = self.duration {
            entry.duration = duration_or_default(Some(duration));
        }
        entry.updated_at = updated_at.to_string();
    }
}
