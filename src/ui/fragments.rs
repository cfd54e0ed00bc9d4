//! Server-rendered markup fragments swapped into the TV page.
//!
//! Every interactive item carries `data-slot="{zone}:{kind}:{id}"` and a DOM
//! id derived from the same slot, so the surface can report which item an
//! input hit and mirror the server's focus cursor.

use chrono::NaiveDate;
use dioxus::prelude::*;

use crate::board::details::{BadgeTone, DetailsView};
use crate::board::focus::{ListZone, Slot};
use crate::board::layout::{Banner, BoardLayout, DateGroup};
use crate::board::model::{DisplayItem, Event, ItemData, Ticket};

fn item_attrs(zone: ListZone, item: &DisplayItem) -> (String, String) {
    let slot = Slot::new(zone, item.key());
    (slot.dom_id(), slot.to_string())
}

// =============================================================================
// Today
// =============================================================================

#[component]
fn TodayTicket(ticket: Ticket, dom_id: String, slot: String) -> Element {
    let icon = if ticket.is_critical() {
        "🔴"
    } else if ticket.is_in_progress() {
        "⚡"
    } else {
        "🎫"
    };
    let code = ticket.code();
    let reporter = ticket.reporter_name.clone().unwrap_or_else(|| "Unknown".to_string());
    let assignee = ticket.assignee_name.clone().filter(|a| !a.trim().is_empty());
    let card_class = if ticket.is_critical() {
        "board-item today-card ticket critical"
    } else if ticket.is_in_progress() {
        "board-item today-card ticket active"
    } else {
        "board-item today-card ticket"
    };

    rsx! {
        div { id: "{dom_id}", class: "{card_class}", tabindex: "0", "data-slot": "{slot}",
            div { class: "card-head",
                span { class: "card-icon", "{icon}" }
                span { class: "ticket-code", "#{code}" }
                if ticket.is_in_progress() {
                    span { class: "pill pill-active", "IN PROGRESS" }
                }
                if ticket.is_critical() {
                    span { class: "pill pill-critical", "CRITICAL" }
                }
            }
            h3 { class: "card-title", "{ticket.title}" }
            div { class: "card-machine",
                i { class: "fas fa-industry" }
                " {ticket.machine_name}"
            }
            div { class: "card-people",
                div { class: "person",
                    span { class: "person-label", "Reported by" }
                    span { class: "person-name", "{reporter}" }
                }
                div { class: "person",
                    span { class: "person-label", "Assignee" }
                    if let Some(name) = assignee {
                        span { class: "person-name assigned", "{name}" }
                    } else {
                        span { class: "person-name unassigned", "Unassigned" }
                    }
                }
            }
        }
    }
}

#[component]
fn TodayEvent(event: Event, dom_id: String, slot: String) -> Element {
    let icon = event.category_icon.clone().unwrap_or_else(|| "fa-calendar".to_string());
    let accent = event
        .category_color
        .clone()
        .map(|c| format!("border-left-color: {c};"))
        .unwrap_or_default();
    let summary = event.summary().unwrap_or_default().to_string();

    rsx! {
        div { id: "{dom_id}", class: "board-item today-card event", style: "{accent}",
            tabindex: "0", "data-slot": "{slot}",
            div { class: "event-icon", i { class: "fas {icon}" } }
            div { class: "event-body",
                div { class: "card-head",
                    h3 { class: "card-title", "{event.title}" }
                    if let Some(time) = event.time_label() {
                        span { class: "time-chip", "{time}" }
                    }
                }
                p { class: "card-summary", "{summary}" }
            }
        }
    }
}

#[component]
pub fn TodayList(items: Vec<DisplayItem>) -> Element {
    if items.is_empty() {
        return rsx! {
            div { id: "today-empty", class: "empty-state",
                i { class: "fas fa-check-circle" }
                h3 { "All clear" }
            }
        };
    }

    rsx! {
        for item in items.iter() {
            {
                let (dom_id, slot) = item_attrs(ListZone::Today, item);
                match &item.data {
                    ItemData::Ticket(ticket) => rsx! {
                        TodayTicket { key: "{slot}", ticket: ticket.clone(), dom_id: dom_id.clone(), slot: slot.clone() }
                    },
                    ItemData::Event(event) => rsx! {
                        TodayEvent { key: "{slot}", event: event.clone(), dom_id: dom_id.clone(), slot: slot.clone() }
                    },
                }
            }
        }
    }
}

// =============================================================================
// Upcoming
// =============================================================================

#[component]
fn UpcomingRow(item: DisplayItem) -> Element {
    let (dom_id, slot) = item_attrs(ListZone::Upcoming, &item);

    match item.data {
        ItemData::Ticket(ticket) => {
            let assignee = ticket.assignee_name.clone().filter(|a| !a.trim().is_empty());
            rsx! {
                div { id: "{dom_id}", class: "board-item timeline-row ticket", tabindex: "0",
                    "data-slot": "{slot}",
                    div { class: "row-head",
                        span { class: "row-title", "{ticket.title}" }
                        if ticket.is_critical() {
                            i { class: "fas fa-exclamation-triangle critical-mark" }
                        }
                    }
                    div { class: "row-meta",
                        span { class: "card-machine", i { class: "fas fa-industry" } " {ticket.machine_name}" }
                        if let Some(name) = assignee {
                            span { class: "person-name assigned", "→ {name}" }
                        } else {
                            span { class: "person-name unassigned", "Unassigned" }
                        }
                    }
                }
            }
        }
        ItemData::Event(event) => {
            let icon = event.category_icon.clone().unwrap_or_else(|| "fa-calendar-day".to_string());
            let label = event.category().unwrap_or_default().to_string();
            rsx! {
                div { id: "{dom_id}", class: "board-item timeline-row event", tabindex: "0",
                    "data-slot": "{slot}",
                    div { class: "row-icon", i { class: "fas {icon}" } }
                    div { class: "row-body",
                        div { class: "row-head",
                            if let Some(time) = event.time_label() {
                                span { class: "time-chip", "{time}" }
                            }
                            span { class: "row-title", "{event.title}" }
                        }
                        div { class: "row-label", "{label}" }
                    }
                }
            }
        }
    }
}

fn date_heading(date: NaiveDate) -> String {
    date.format("%A %-d %B").to_string()
}

#[component]
pub fn UpcomingTimeline(groups: Vec<DateGroup>) -> Element {
    if groups.is_empty() {
        return rsx! {
            div { id: "upcoming-empty", class: "empty-state",
                i { class: "fas fa-calendar-times" }
                p { "Nothing planned yet" }
            }
        };
    }

    rsx! {
        div { class: "timeline-line" }
        for group in groups.iter() {
            div { key: "{group.date}", class: "date-group",
                div { class: "date-heading",
                    span { class: "date-dot" }
                    span { "{date_heading(group.date)}" }
                }
                for item in group.items.iter() {
                    UpcomingRow { key: "{item.key()}", item: item.clone() }
                }
            }
        }
    }
}

// =============================================================================
// Banner and details
// =============================================================================

#[component]
pub fn BannerTicker(banner: Banner) -> Element {
    let theme = if banner.scheduled() { "broadcast scheduled" } else { "broadcast" };
    let icon = if banner.scheduled() { "fa-clock" } else { "fa-bullhorn" };
    let text = banner
        .entries
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join("  •  ");
    let duration = banner.scroll_secs();

    rsx! {
        div { id: "tv-broadcast", class: "{theme}",
            div { class: "broadcast-icon", i { class: "fas {icon}" } }
            div { class: "broadcast-track",
                span { class: "ticker-text", style: "animation-duration: {duration}s", "{text}" }
            }
        }
    }
}

#[component]
pub fn DetailsPanel(view: DetailsView) -> Element {
    let badge = view.badge.clone().map(|badge| {
        let tone = match badge.tone {
            BadgeTone::Active => "badge badge-active",
            BadgeTone::Planned => "badge badge-planned",
            BadgeTone::Neutral => "badge badge-neutral",
        };
        (badge.label, tone)
    });

    rsx! {
        div { class: "detail-content",
            div { class: "detail-head",
                if let Some((label, tone)) = badge {
                    span { id: "detail-badge", class: "{tone}", "{label}" }
                }
                div { id: "detail-meta", "{view.meta}" }
            }
            h3 { class: "detail-title", "{view.title}" }
            p { id: "detail-desc", "{view.body}" }
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

pub fn render_today(layout: &BoardLayout) -> String {
    let items = layout.today.clone();
    dioxus::ssr::render_element(rsx! { TodayList { items } })
}

pub fn render_upcoming(layout: &BoardLayout) -> String {
    let groups = layout.upcoming.clone();
    dioxus::ssr::render_element(rsx! { UpcomingTimeline { groups } })
}

pub fn render_banner(banner: &Banner) -> String {
    let banner = banner.clone();
    dioxus::ssr::render_element(rsx! { BannerTicker { banner } })
}

pub fn render_details(view: &DetailsView) -> String {
    let view = view.clone();
    dioxus::ssr::render_element(rsx! { DetailsPanel { view } })
}
