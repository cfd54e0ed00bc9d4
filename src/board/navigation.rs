//! D-pad navigation across the header control and the two item lists.

use serde::{Deserialize, Serialize};

use super::focus::{FocusTarget, ListZone, Slot};
use super::layout::BoardLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a DOM `KeyboardEvent.key` value. Anything else is not consumed.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Where focus moves for `direction`, or `None` when the input is a no-op.
///
/// A cursor naming a slot that is no longer rendered is treated like an
/// empty cursor.
pub fn navigate(
    layout: &BoardLayout,
    focus: FocusTarget,
    direction: Direction,
) -> Option<FocusTarget> {
    match focus {
        FocusTarget::Item(slot) if layout.contains(&slot) => within_list(layout, slot, direction),
        FocusTarget::Header => match direction {
            Direction::Down => first_available(layout),
            _ => None,
        },
        FocusTarget::None | FocusTarget::Item(_) => first_available(layout),
    }
}

fn first_available(layout: &BoardLayout) -> Option<FocusTarget> {
    layout
        .first_slot(ListZone::Today)
        .or_else(|| layout.first_slot(ListZone::Upcoming))
        .map(FocusTarget::Item)
}

fn within_list(layout: &BoardLayout, slot: Slot, direction: Direction) -> Option<FocusTarget> {
    let slots = layout.slots(slot.zone);
    let index = slots.iter().position(|s| *s == slot)?;

    match (direction, slot.zone) {
        (Direction::Up, _) if index == 0 => Some(FocusTarget::Header),
        (Direction::Up, _) => Some(FocusTarget::Item(slots[index - 1])),
        (Direction::Down, _) => slots.get(index + 1).copied().map(FocusTarget::Item),
        (Direction::Right, ListZone::Today) => {
            layout.first_slot(ListZone::Upcoming).map(FocusTarget::Item)
        }
        (Direction::Left, ListZone::Upcoming) => {
            layout.first_slot(ListZone::Today).map(FocusTarget::Item)
        }
        (Direction::Left, ListZone::Today) | (Direction::Right, ListZone::Upcoming) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::layout::build_layout;
    use crate::board::model::{Event, ItemKey, Snapshot};
    use chrono::NaiveDateTime;

    fn layout(today: &[i64], upcoming: &[i64]) -> BoardLayout {
        let mut events = Vec::new();
        for id in today {
            events.push(Event {
                id: *id,
                date: "2025-01-10".into(),
                ..Default::default()
            });
        }
        for id in upcoming {
            events.push(Event {
                id: *id,
                date: "2025-01-12".into(),
                ..Default::default()
            });
        }
        let now = NaiveDateTime::parse_from_str("2025-01-10 08:00", "%Y-%m-%d %H:%M").unwrap();
        let snapshot = Snapshot {
            events,
            ..Default::default()
        };
        build_layout(&snapshot, now)
    }

    fn item(zone: ListZone, id: i64) -> FocusTarget {
        FocusTarget::Item(Slot::new(zone, ItemKey::event(id)))
    }

    #[test]
    fn up_from_first_escapes_to_header() {
        let layout = layout(&[1, 2], &[3]);
        let first = item(ListZone::Today, 1);
        assert_eq!(navigate(&layout, first, Direction::Up), Some(FocusTarget::Header));
        assert_eq!(
            navigate(&layout, item(ListZone::Today, 2), Direction::Up),
            Some(first)
        );
    }

    #[test]
    fn down_stops_at_last_item() {
        let layout = layout(&[1], &[3, 4]);
        let last = item(ListZone::Upcoming, 4);
        assert_eq!(
            navigate(&layout, item(ListZone::Upcoming, 3), Direction::Down),
            Some(last)
        );
        assert_eq!(navigate(&layout, last, Direction::Down), None);
    }

    #[test]
    fn sideways_uses_fixed_anchors() {
        let layout = layout(&[1, 2], &[3, 4]);
        assert_eq!(
            navigate(&layout, item(ListZone::Today, 2), Direction::Right),
            Some(item(ListZone::Upcoming, 3))
        );
        assert_eq!(
            navigate(&layout, item(ListZone::Upcoming, 4), Direction::Left),
            Some(item(ListZone::Today, 1))
        );
        assert_eq!(navigate(&layout, item(ListZone::Today, 1), Direction::Left), None);
        assert_eq!(navigate(&layout, item(ListZone::Upcoming, 3), Direction::Right), None);
    }

    #[test]
    fn right_without_upcoming_is_noop() {
        let layout = layout(&[1], &[]);
        assert_eq!(navigate(&layout, item(ListZone::Today, 1), Direction::Right), None);
    }

    #[test]
    fn header_only_answers_down() {
        let layout = layout(&[], &[3]);
        assert_eq!(
            navigate(&layout, FocusTarget::Header, Direction::Down),
            Some(item(ListZone::Upcoming, 3))
        );
        assert_eq!(navigate(&layout, FocusTarget::Header, Direction::Up), None);
        assert_eq!(navigate(&layout, FocusTarget::Header, Direction::Right), None);
    }

    #[test]
    fn empty_cursor_enters_today_first() {
        let layout = layout(&[1], &[3]);
        assert_eq!(
            navigate(&layout, FocusTarget::None, Direction::Left),
            Some(item(ListZone::Today, 1))
        );
        let empty = layout_empty();
        assert_eq!(navigate(&empty, FocusTarget::None, Direction::Down), None);
    }

    fn layout_empty() -> BoardLayout {
        layout(&[], &[])
    }

    #[test]
    fn confined_up_down_never_wraps() {
        let layout = layout(&[1, 2, 3], &[]);
        let mut focus = item(ListZone::Today, 2);
        let steps = [
            Direction::Down,
            Direction::Down,
            Direction::Down,
            Direction::Up,
            Direction::Up,
            Direction::Up,
            Direction::Up,
        ];
        for dir in steps {
            if let Some(next) = navigate(&layout, focus, dir) {
                focus = next;
            }
            if let FocusTarget::Item(slot) = focus {
                assert!(layout.contains(&slot));
            }
        }
        assert_eq!(focus, FocusTarget::Header);
    }

    #[test]
    fn key_mapping() {
        assert_eq!(Direction::from_key("ArrowLeft"), Some(Direction::Left));
        assert_eq!(Direction::from_key("Enter"), None);
    }
}
