//! Explicit focus cursor.
//!
//! The surface has no focus of its own: whichever target the cursor names is
//! the focused one, and every controller reads it from here. Item targets are
//! addressed by list zone plus stable item key, never by position, so a
//! cursor survives a re-render as long as its item does.

use std::fmt;

use super::model::ItemKey;

/// The two item lists of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListZone {
    Today,
    Upcoming,
}

impl ListZone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Upcoming => "upcoming",
        }
    }
}

/// One rendered item: the same ticket may be rendered in both lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub zone: ListZone,
    pub key: ItemKey,
}

impl Slot {
    pub fn new(zone: ListZone, key: ItemKey) -> Self {
        Self { zone, key }
    }

    /// Parse the `data-slot` attribute value, `today:ticket:12`.
    pub fn parse(s: &str) -> Option<Self> {
        let (zone, key) = s.split_once(':')?;
        let zone = match zone {
            "today" => ListZone::Today,
            "upcoming" => ListZone::Upcoming,
            _ => return None,
        };
        Some(Self {
            zone,
            key: ItemKey::parse(key)?,
        })
    }

    /// DOM id of the rendered element.
    pub fn dom_id(&self) -> String {
        format!("{}-{}-{}", self.zone.as_str(), self.key.kind.as_str(), self.key.id)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.zone.as_str(), self.key)
    }
}

/// DOM id of the header control (fullscreen toggle).
pub const HEADER_DOM_ID: &str = "btn-fullscreen";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    None,
    Header,
    Item(Slot),
}

impl FocusTarget {
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::Item(slot) => Some(*slot),
            _ => None,
        }
    }

    pub fn dom_id(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Header => Some(HEADER_DOM_ID.to_string()),
            Self::Item(slot) => Some(slot.dom_id()),
        }
    }

    /// Parse an input target: `header` or a slot.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "header" {
            Some(Self::Header)
        } else {
            Slot::parse(s).map(Self::Item)
        }
    }
}
