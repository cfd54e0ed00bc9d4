//! Snapshot data model consumed by the board.
//!
//! The upstream ticketing service returns `{ events, tickets, message, ... }`
//! from its TV endpoint. Decoding is deliberately tolerant: lists default to
//! empty, `null` strings decode to empty strings and unknown fields are ignored,
//! so a sparse payload renders the empty states instead of failing.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treat empty and whitespace-only strings as absent.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Immutable payload of one successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub broadcast_notes: Vec<BroadcastNote>,
}

/// Planned, non-ticket occurrence (shipment, safety note, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    /// Calendar day, optionally followed by a time part (`2025-01-10T00:00:00Z`)
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_icon: Option<String>,
    #[serde(default)]
    pub category_label: Option<String>,
    #[serde(default)]
    pub category_color: Option<String>,
}

impl Event {
    pub fn day(&self) -> Option<NaiveDate> {
        let day = self.date.split(['T', ' ']).next()?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn time_of_day(&self) -> Option<NaiveTime> {
        self.time.as_deref().and_then(parse_time)
    }

    /// Day plus the optional time of day; midnight when untimed.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let day = self.day()?;
        Some(day.and_time(self.time_of_day().unwrap_or(NaiveTime::MIN)))
    }

    /// `HH:MM` label, when the event is timed.
    pub fn time_label(&self) -> Option<String> {
        self.time_of_day().map(|t| t.format("%H:%M").to_string())
    }

    pub fn details_text(&self) -> Option<&str> {
        non_blank(&self.details)
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(&self.category_label)
    }

    /// Subtitle of the Today card.
    pub fn summary(&self) -> Option<&str> {
        non_blank(&self.description).or_else(|| self.category())
    }
}

/// Read projection of a maintenance ticket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    /// Human ticket code shown on cards (`CNC-0042`)
    #[serde(default)]
    pub ticket_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub machine_name: String,
    #[serde(default)]
    pub assignee_name: Option<String>,
    #[serde(default)]
    pub reporter_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    #[serde(default)]
    pub scheduled_date: Option<String>,
}

impl Ticket {
    pub fn is_in_progress(&self) -> bool {
        self.status == "in_progress"
    }

    pub fn is_critical(&self) -> bool {
        self.priority == "critical"
    }

    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        self.scheduled_date.as_deref().and_then(parse_moment)
    }

    pub fn scheduled_day(&self) -> Option<NaiveDate> {
        self.scheduled_at().map(|at| at.date())
    }

    pub fn description_text(&self) -> Option<&str> {
        non_blank(&self.description)
    }

    pub fn code(&self) -> String {
        self.ticket_id
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Dashboard note shown in the broadcast ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadcastNote {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl BroadcastNote {
    pub fn day(&self) -> Option<NaiveDate> {
        let date = non_blank(&self.date)?;
        NaiveDate::parse_from_str(date.split(['T', ' ']).next()?, "%Y-%m-%d").ok()
    }

    pub fn starts_at(&self) -> Option<NaiveTime> {
        non_blank(&self.time).and_then(parse_time)
    }

    pub fn ends_at(&self) -> Option<NaiveTime> {
        non_blank(&self.end_time).and_then(parse_time)
    }
}

// =============================================================================
// Display items
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Ticket,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Ticket => "ticket",
        }
    }
}

/// Stable identity of a display item across render passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub kind: ItemKind,
    pub id: i64,
}

impl ItemKey {
    pub fn event(id: i64) -> Self {
        Self {
            kind: ItemKind::Event,
            id,
        }
    }

    pub fn ticket(id: i64) -> Self {
        Self {
            kind: ItemKind::Ticket,
            id,
        }
    }

    /// Parse `event:12` / `ticket:7`.
    pub fn parse(s: &str) -> Option<Self> {
        let (kind, id) = s.split_once(':')?;
        let kind = match kind {
            "event" => ItemKind::Event,
            "ticket" => ItemKind::Ticket,
            _ => return None,
        };
        Some(Self {
            kind,
            id: id.parse().ok()?,
        })
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ItemData {
    Event(Event),
    Ticket(Ticket),
}

/// Wrapper produced fresh on every render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayItem {
    #[serde(flatten)]
    pub data: ItemData,
    /// Milliseconds since the epoch of the local wall clock; 0 pins an item first
    pub sort_time: i64,
}

impl DisplayItem {
    pub fn event(event: Event, sort_time: i64) -> Self {
        Self {
            data: ItemData::Event(event),
            sort_time,
        }
    }

    pub fn ticket(ticket: Ticket, sort_time: i64) -> Self {
        Self {
            data: ItemData::Ticket(ticket),
            sort_time,
        }
    }

    pub fn key(&self) -> ItemKey {
        match &self.data {
            ItemData::Event(e) => ItemKey::event(e.id),
            ItemData::Ticket(t) => ItemKey::ticket(t.id),
        }
    }

    pub fn title(&self) -> &str {
        match &self.data {
            ItemData::Event(e) => &e.title,
            ItemData::Ticket(t) => &t.title,
        }
    }

    /// Whether the details overlay has anything to say about this item.
    ///
    /// A ticket needs a description; an event needs details or a category label.
    pub fn has_details(&self) -> bool {
        match &self.data {
            ItemData::Ticket(t) => t.description_text().is_some(),
            ItemData::Event(e) => e.details_text().is_some() || e.category().is_some(),
        }
    }
}

// =============================================================================
// Date parsing
// =============================================================================

const MOMENT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an upstream timestamp into local wall-clock time.
///
/// RFC 3339 values carry an offset and are converted to local time; naive
/// values are taken as already local; a bare date means midnight.
pub fn parse_moment(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in MOMENT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}
