//! Dashboard layout: partitions a snapshot into the Today and Upcoming lists.
//!
//! Pure transform of `(snapshot, local wall clock)`. A layout is rebuilt from
//! scratch for every new snapshot; only the banner is re-evaluated in place.

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::focus::{ListZone, Slot};
use super::model::{DisplayItem, ItemKey, Snapshot};

/// Upcoming items sharing one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub items: Vec<DisplayItem>,
}

/// Header counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub urgent: usize,
    pub in_progress: usize,
    pub today_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerEntry {
    pub text: String,
    /// Timed note (amber theme) rather than a standing announcement
    pub scheduled: bool,
}

/// Broadcast ticker content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub entries: Vec<BannerEntry>,
}

impl Banner {
    /// Theme follows the leading entry.
    pub fn scheduled(&self) -> bool {
        self.entries.first().is_some_and(|e| e.scheduled)
    }

    /// Seconds for one full ticker pass, longer for longer text.
    pub fn scroll_secs(&self) -> u32 {
        let chars: usize = self.entries.iter().map(|e| e.text.chars().count()).sum();
        let secs = 10.0 + chars as f64 * 0.15;
        secs.max(20.0).round() as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardLayout {
    pub today: Vec<DisplayItem>,
    pub upcoming: Vec<DateGroup>,
    pub stats: BoardStats,
    pub banner: Option<Banner>,
}

impl BoardLayout {
    pub fn is_today_empty(&self) -> bool {
        self.today.is_empty()
    }

    /// Item keys of one list, in display order.
    pub fn keys(&self, zone: ListZone) -> Vec<ItemKey> {
        match zone {
            ListZone::Today => self.today.iter().map(DisplayItem::key).collect(),
            ListZone::Upcoming => self
                .upcoming
                .iter()
                .flat_map(|g| g.items.iter().map(DisplayItem::key))
                .collect(),
        }
    }

    pub fn slots(&self, zone: ListZone) -> Vec<Slot> {
        self.keys(zone)
            .into_iter()
            .map(|key| Slot::new(zone, key))
            .collect()
    }

    /// Every focusable slot: Today in display order, then Upcoming.
    pub fn cycle_order(&self) -> Vec<Slot> {
        let mut slots = self.slots(ListZone::Today);
        slots.extend(self.slots(ListZone::Upcoming));
        slots
    }

    pub fn first_slot(&self, zone: ListZone) -> Option<Slot> {
        let key = match zone {
            ListZone::Today => self.today.first().map(DisplayItem::key),
            ListZone::Upcoming => self
                .upcoming
                .iter()
                .find_map(|g| g.items.first())
                .map(DisplayItem::key),
        }?;
        Some(Slot::new(zone, key))
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.item(slot).is_some()
    }

    pub fn item(&self, slot: &Slot) -> Option<&DisplayItem> {
        match slot.zone {
            ListZone::Today => self.today.iter().find(|i| i.key() == slot.key),
            ListZone::Upcoming => self
                .upcoming
                .iter()
                .flat_map(|g| g.items.iter())
                .find(|i| i.key() == slot.key),
        }
    }


    pub fn item_count(&self) -> usize {
        self.today.len() + self.upcoming.iter().map(|g| g.items.len()).sum::<usize>()
    }
}

fn millis(at: NaiveDateTime) -> i64 {
    at.and_utc().timestamp_millis()
}

/// Build the Today / Upcoming partition for `now`.
pub fn build_layout(snapshot: &Snapshot, now: NaiveDateTime) -> BoardLayout {
    let today = now.date();

    BoardLayout {
        today: today_items(snapshot, today),
        upcoming: upcoming_groups(snapshot, today),
        stats: stats(snapshot, today),
        banner: build_banner(snapshot, now),
    }
}

fn today_items(snapshot: &Snapshot, today: NaiveDate) -> Vec<DisplayItem> {
    let mut items = Vec::new();

    for event in &snapshot.events {
        if event.day() == Some(today) {
            let sort_time = event.timestamp().map(millis).unwrap_or_default();
            items.push(DisplayItem::event(event.clone(), sort_time));
        }
    }

    for ticket in &snapshot.tickets {
        let scheduled = ticket.scheduled_at();
        let scheduled_today = scheduled.is_some_and(|at| at.date() == today);
        if ticket.is_in_progress() {
            items.push(DisplayItem::ticket(ticket.clone(), 0));
        } else if let (true, Some(at)) = (scheduled_today, scheduled) {
            items.push(DisplayItem::ticket(ticket.clone(), millis(at)));
        }
    }

    // Stable: ties keep arrival order
    items.sort_by_key(|item| item.sort_time);
    items
}

fn upcoming_groups(snapshot: &Snapshot, today: NaiveDate) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();

    let mut add = |date: NaiveDate, item: DisplayItem| {
        if date <= today {
            return;
        }
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.items.push(item),
            None => groups.push(DateGroup {
                date,
                items: vec![item],
            }),
        }
    };

    for event in &snapshot.events {
        if let Some(day) = event.day() {
            let sort_time = event.timestamp().map(millis).unwrap_or_default();
            add(day, DisplayItem::event(event.clone(), sort_time));
        }
    }
    for ticket in &snapshot.tickets {
        if let Some(at) = ticket.scheduled_at() {
            add(at.date(), DisplayItem::ticket(ticket.clone(), millis(at)));
        }
    }

    groups.sort_by_key(|g| g.date);
    groups
}

fn stats(snapshot: &Snapshot, today: NaiveDate) -> BoardStats {
    let tickets_today = snapshot
        .tickets
        .iter()
        .filter(|t| t.scheduled_day() == Some(today))
        .count();
    let events_today = snapshot
        .events
        .iter()
        .filter(|e| e.day() == Some(today))
        .count();

    BoardStats {
        urgent: snapshot.tickets.iter().filter(|t| t.is_critical()).count(),
        in_progress: snapshot.tickets.iter().filter(|t| t.is_in_progress()).count(),
        today_count: tickets_today + events_today,
    }
}

/// Broadcast ticker content for `now`.
///
/// Active notes are dated today (or undated) and, when timed, inside their
/// window; a timed note without an end runs for one hour. Without any active
/// note the legacy single `message` is shown.
pub fn build_banner(snapshot: &Snapshot, now: NaiveDateTime) -> Option<Banner> {
    let today = now.date();

    let entries: Vec<BannerEntry> = snapshot
        .broadcast_notes
        .iter()
        .filter(|note| !note.text.trim().is_empty())
        .filter(|note| {
            if note.date.as_deref().is_some_and(|d| !d.trim().is_empty())
                && note.day() != Some(today)
            {
                return false;
            }
            let Some(start) = note.starts_at() else {
                return true;
            };
            let start = today.and_time(start);
            let end = note
                .ends_at()
                .map(|t| today.and_time(t))
                .unwrap_or(start + ChronoDuration::hours(1));
            now >= start && now < end
        })
        .map(|note| BannerEntry {
            text: note.text.trim().to_string(),
            scheduled: note.starts_at().is_some(),
        })
        .collect();

    if !entries.is_empty() {
        return Some(Banner { entries });
    }

    snapshot
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| Banner {
            entries: vec![BannerEntry {
                text: m.to_string(),
                scheduled: false,
            }],
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::model::{BroadcastNote, Event, Ticket};

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
    }

    fn event(id: i64, date: &str, title: &str) -> Event {
        Event {
            id,
            date: date.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    fn ticket(id: i64, status: &str, scheduled: Option<&str>) -> Ticket {
        Ticket {
            id,
            title: format!("Ticket {id}"),
            status: status.into(),
            priority: "normal".into(),
            scheduled_date: scheduled.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn single_event_today() {
        let snapshot = Snapshot {
            events: vec![event(1, "2025-01-10", "Livraison")],
            ..Default::default()
        };
        let layout = build_layout(&snapshot, at("2025-01-10", "08:00"));

        assert_eq!(layout.today.len(), 1);
        assert_eq!(layout.today[0].title(), "Livraison");
        assert!(layout.upcoming.is_empty());
        assert!(!layout.is_today_empty());
        assert_eq!(layout.stats.today_count, 1);
    }

    #[test]
    fn in_progress_ticket_leads_today() {
        let snapshot = Snapshot {
            tickets: vec![
                ticket(1, "open", Some("2025-01-10 09:00:00")),
                ticket(2, "in_progress", Some("2025-01-10 14:00:00")),
            ],
            ..Default::default()
        };
        let layout = build_layout(&snapshot, at("2025-01-10", "07:00"));

        assert_eq!(
            layout.keys(ListZone::Today),
            vec![ItemKey::ticket(2), ItemKey::ticket(1)]
        );
        assert_eq!(layout.stats.in_progress, 1);
    }

    #[test]
    fn in_progress_without_schedule_still_today() {
        let snapshot = Snapshot {
            tickets: vec![ticket(5, "in_progress", None)],
            ..Default::default()
        };
        let layout = build_layout(&snapshot, at("2025-01-10", "07:00"));
        assert_eq!(layout.keys(ListZone::Today), vec![ItemKey::ticket(5)]);
    }

    #[test]
    fn events_ordered_by_time_with_tickets() {
        let mut early = event(1, "2025-01-10", "Early");
        early.time = Some("07:30".into());
        let mut late = event(2, "2025-01-10", "Late");
        late.time = Some("16:00".into());
        let snapshot = Snapshot {
            events: vec![late, early],
            tickets: vec![ticket(9, "open", Some("2025-01-10 11:00"))],
            ..Default::default()
        };
        let layout = build_layout(&snapshot, at("2025-01-10", "06:00"));
        assert_eq!(
            layout.keys(ListZone::Today),
            vec![ItemKey::event(1), ItemKey::ticket(9), ItemKey::event(2)]
        );
    }

    #[test]
    fn upcoming_groups_by_date_and_keeps_arrival_order() {
        let snapshot = Snapshot {
            events: vec![
                event(1, "2025-01-12", "B"),
                event(2, "2025-01-11", "A"),
                event(3, "2025-01-12", "C"),
                event(4, "2025-01-09", "Past"),
                event(5, "2025-01-10", "Today"),
            ],
            tickets: vec![ticket(7, "open", Some("2025-01-11 08:00"))],
            ..Default::default()
        };
        let layout = build_layout(&snapshot, at("2025-01-10", "12:00"));

        let dates: Vec<_> = layout.upcoming.iter().map(|g| g.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-01-11", "2025-01-12"]);
        assert_eq!(
            layout.keys(ListZone::Upcoming),
            vec![ItemKey::event(2), ItemKey::ticket(7), ItemKey::event(1), ItemKey::event(3)]
        );
        assert_eq!(layout.keys(ListZone::Today), vec![ItemKey::event(5)]);
    }

    #[test]
    fn today_and_upcoming_never_share_dates() {
        let snapshot = Snapshot {
            events: (0..20)
                .map(|i| event(i, &format!("2025-01-{:02}", 1 + i), "e"))
                .collect(),
            tickets: (0..20)
                .map(|i| ticket(100 + i, "open", Some(&format!("2025-01-{:02} 10:00", 1 + i))))
                .collect(),
            ..Default::default()
        };
        let now = at("2025-01-10", "12:00");
        let layout = build_layout(&snapshot, now);

        for item in &layout.today {
            let day = match &item.data {
                crate::board::model::ItemData::Event(e) => e.day(),
                crate::board::model::ItemData::Ticket(t) => t.scheduled_day(),
            };
            assert_eq!(day, Some(now.date()));
        }
        assert!(layout.upcoming.iter().all(|g| g.date > now.date()));
    }

    #[test]
    fn cycle_order_is_today_then_upcoming() {
        let snapshot = Snapshot {
            events: vec![event(1, "2025-01-11", "Next"), event(2, "2025-01-10", "Now")],
            ..Default::default()
        };
        let layout = build_layout(&snapshot, at("2025-01-10", "12:00"));
        let order = layout.cycle_order();
        assert_eq!(order[0], Slot::new(ListZone::Today, ItemKey::event(2)));
        assert_eq!(order[1], Slot::new(ListZone::Upcoming, ItemKey::event(1)));
        assert_eq!(layout.first_slot(ListZone::Upcoming), Some(order[1]));
    }

    #[test]
    fn banner_prefers_active_notes() {
        let snapshot = Snapshot {
            message: Some("Legacy".into()),
            broadcast_notes: vec![
                BroadcastNote {
                    text: "Standing".into(),
                    ..Default::default()
                },
                BroadcastNote {
                    text: "Meeting".into(),
                    date: Some("2025-01-10".into()),
                    time: Some("09:00".into()),
                    ..Default::default()
                },
                BroadcastNote {
                    text: "Yesterday".into(),
                    date: Some("2025-01-09".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let banner = build_banner(&snapshot, at("2025-01-10", "09:30")).unwrap();
        let texts: Vec<_> = banner.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Standing", "Meeting"]);
        assert!(!banner.scheduled());

        // Meeting window closed after an hour
        let banner = build_banner(&snapshot, at("2025-01-10", "10:30")).unwrap();
        assert_eq!(banner.entries.len(), 1);
    }

    #[test]
    fn banner_falls_back_to_message() {
        let snapshot = Snapshot {
            message: Some("  Bonne semaine  ".into()),
            ..Default::default()
        };
        let banner = build_banner(&snapshot, at("2025-01-10", "09:30")).unwrap();
        assert_eq!(banner.entries[0].text, "Bonne semaine");
        assert_eq!(banner.scroll_secs(), 20);

        assert!(build_banner(&Snapshot::default(), at("2025-01-10", "09:30")).is_none());
    }
}
