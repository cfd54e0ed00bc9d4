//! TV board page.
//!
//! A thin surface: all controller state lives on the server. The script below
//! swaps in server-rendered fragments from the `/tv/events` frame stream,
//! mirrors the focus cursor with `.is-focused` plus a centred scroll, and
//! forwards raw input to `POST /tv/input`.

use dioxus::prelude::*;

use crate::board::focus::HEADER_DOM_ID;
use crate::ui::components::KioskLayout;

const TV_STYLES: &str = r#"
.board { display: flex; flex-direction: column; height: 100vh; }
.board-header { height: 4rem; flex: none; display: flex; align-items: center; gap: 1rem; padding: 0 1.5rem;
  background: rgba(15,23,42,.9); border-bottom: 1px solid #1e293b; }
.brand h1 { margin: 0; font-size: 1.1rem; color: #fff; letter-spacing: -.02em; }
.brand p { margin: 0; color: #60a5fa; font: 700 .75rem monospace; letter-spacing: .2em; text-transform: uppercase; }
.banner-slot { flex: 1; min-width: 0; }
.stats { display: flex; gap: .75rem; font: 700 .9rem monospace; }
.stat { padding: .2rem .6rem; border-radius: .4rem; background: #1e293b; }
.stat.urgent { color: #f87171; } .stat.active { color: #4ade80; } .stat.today { color: #93c5fd; }
.clock { text-align: right; font-family: monospace; line-height: 1; }
#clock-time { font-size: 2.25rem; font-weight: 700; color: #fff; }
#clock-date { font-size: .8rem; color: #93c5fd; text-transform: uppercase; }
main.columns { flex: 1; display: flex; overflow: hidden; }
.column { display: flex; flex-direction: column; overflow: hidden; }
.column.today { width: 60%; border-right: 1px solid #1e293b; padding: 1rem 1.5rem; }
.column.upcoming { width: 40%; background: #020617; }
.column-head { display: flex; align-items: center; justify-content: space-between; gap: .75rem;
  border-bottom: 1px solid #1e293b; padding-bottom: .75rem; margin-bottom: 1rem; }
.column-head h2 { margin: 0; font-size: 1.75rem; color: #fff; text-transform: uppercase; }
.weather { display: flex; align-items: center; gap: .5rem; font-size: 1.5rem; font-weight: 700; }
#today-date-large { color: #60a5fa; font: 700 1.25rem monospace; text-transform: uppercase; letter-spacing: .15em; }
.scroller { flex: 1; overflow-y: auto; padding-top: 1.5rem; padding-bottom: 50vh; }
.column.upcoming .column-head { padding: 1rem; margin: 0; background: #0f172a; }
.column.upcoming .scroller { padding-left: 2rem; padding-right: 1rem; position: relative; }
#btn-fullscreen { padding: .6rem .8rem; border-radius: .5rem; background: #1e293b; color: #60a5fa;
  border: 1px solid #334155; cursor: pointer; }
.board-item { outline: none; cursor: pointer; transition: transform .2s, box-shadow .2s; }
.today-card { background: rgba(30,41,59,.6); border-radius: .75rem; padding: 1rem 1.25rem; margin-bottom: 1rem;
  border-left: 6px solid #3b82f6; }
.today-card.ticket.active { border-left-color: #22c55e; }
.today-card.ticket.critical { border-left-color: #dc2626; }
.today-card.event { display: flex; gap: 1rem; align-items: center; }
.card-head { display: flex; align-items: center; gap: .6rem; justify-content: space-between; }
.card-title { margin: .4rem 0; font-size: 1.6rem; color: #fff; line-height: 1.2; }
.card-machine { color: #93c5fd; font-family: monospace; }
.card-people { display: flex; gap: 1rem; margin-top: .75rem; padding-top: .75rem; border-top: 1px solid #334155; }
.person { flex: 1; background: #1e293b; border-radius: .5rem; padding: .5rem .75rem; }
.person-label { display: block; font-size: .75rem; text-transform: uppercase; color: #cbd5e1; }
.person-name { font-weight: 700; color: #fff; }
.person-name.assigned { color: #4ade80; } .person-name.unassigned { color: #64748b; font-style: italic; }
.pill { padding: .1rem .5rem; border-radius: 999px; font-size: .75rem; font-weight: 700; }
.pill-active { background: #22c55e; color: #000; } .pill-critical { background: #dc2626; color: #fff; }
.ticket-code { font-family: monospace; color: #94a3b8; font-weight: 600; }
.time-chip { font: 700 .95rem monospace; color: #67e8f9; background: #0f172a; border: 1px solid #475569;
  padding: .1rem .5rem; border-radius: .3rem; white-space: nowrap; }
.event-icon { height: 3rem; width: 3rem; border-radius: 999px; background: #1e293b; display: flex;
  align-items: center; justify-content: center; font-size: 1.4rem; flex: none; }
.card-summary { margin: 0; color: #94a3b8; }
.timeline-line { position: absolute; left: 1.45rem; top: 0; bottom: 0; width: 2px; background: #1e293b; }
.date-heading { display: flex; align-items: center; gap: .75rem; margin: 1rem 0 .75rem; color: #60a5fa;
  font: 700 1rem monospace; text-transform: uppercase; letter-spacing: .15em; }
.date-dot { height: 1rem; width: 1rem; border-radius: 999px; border: 2px solid #3b82f6; background: #0f172a;
  margin-left: -1.05rem; }
.timeline-row { margin: 0 0 .75rem 1rem; background: rgba(30,41,59,.5); border: 1px solid #334155;
  border-radius: .5rem; padding: .6rem .9rem; }
.timeline-row.event { display: flex; gap: .75rem; align-items: center; }
.row-head { display: flex; gap: .5rem; align-items: center; justify-content: space-between; }
.row-title { font-weight: 700; color: #fff; font-size: 1.1rem; }
.row-meta { display: flex; justify-content: space-between; font-size: .85rem; color: #94a3b8; margin-top: .25rem; }
.row-label { color: #64748b; }
.critical-mark { color: #ef4444; }
.is-focused { transform: scale(1.02); box-shadow: 0 0 0 4px #3b82f6, 0 10px 30px rgba(59,130,246,.35); }
#btn-fullscreen.is-focused { box-shadow: 0 0 0 4px #3b82f6; }
#tv-broadcast { display: flex; align-items: center; gap: .75rem; padding: .35rem 1rem .35rem .4rem;
  border-radius: 999px; background: rgba(15,23,42,.9); border: 1px solid rgba(16,185,129,.5); overflow: hidden; }
#tv-broadcast.scheduled { border-color: rgba(245,158,11,.6); }
.broadcast-icon { height: 2.2rem; width: 2.2rem; border-radius: 999px; background: #059669; display: flex;
  align-items: center; justify-content: center; flex: none; }
#tv-broadcast.scheduled .broadcast-icon { background: #d97706; }
.broadcast-track { flex: 1; overflow: hidden; white-space: nowrap; }
.ticker-text { display: inline-block; padding-left: 100%; font-weight: 700; font-size: 1.25rem; color: #d1fae5;
  animation: ticker linear infinite; }
#tv-broadcast.scheduled .ticker-text { color: #fef3c7; }
@keyframes ticker { from { transform: translateX(0); } to { transform: translateX(-100%); } }
#details-panel { position: fixed; left: 0; right: 0; bottom: 0; max-height: 35vh; padding: 1.5rem 2rem;
  background: rgba(15,23,42,.97); border-top: 2px solid #3b82f6; transform: translateY(100%);
  transition: transform .3s ease; z-index: 100; }
#details-panel.visible { transform: translateY(0); }
.detail-head { display: flex; align-items: center; gap: 1rem; }
#detail-meta { color: #60a5fa; font-family: monospace; text-transform: uppercase; letter-spacing: .15em; }
.detail-title { margin: .5rem 0; color: #fff; font-size: 1.5rem; }
#detail-desc { margin: 0; font-size: 1.6rem; font-weight: 300; line-height: 1.4; color: #e2e8f0; }
.badge { padding: .15rem .6rem; border-radius: .3rem; font-size: .8rem; font-weight: 700; border: 1px solid; }
.badge-active { background: #14532d; color: #86efac; border-color: #15803d; }
.badge-planned { background: #1e3a8a; color: #93c5fd; border-color: #1d4ed8; }
.badge-neutral { background: #1e293b; color: #cbd5e1; border-color: #475569; }
body[data-mode="manual"] .mode-indicator { opacity: 1; }
.mode-indicator { position: fixed; right: 1rem; bottom: 1rem; opacity: 0; color: #64748b; transition: opacity .3s; }
.loading { position: fixed; inset: 0; display: flex; align-items: center; justify-content: center;
  background: #020617; font-size: 1.5rem; color: #64748b; z-index: 200; }
.loading.hidden { display: none; }
"#;

/// Client-side script for the TV page.
const TV_SCRIPT: &str = r#"
const ARROWS = ['ArrowUp', 'ArrowDown', 'ArrowLeft', 'ArrowRight'];
const $ = (id) => document.getElementById(id);
let lastFocused = null;

function applyFrame(f) {
    if (f.setup_required) {
        window.location.href = '/tv/setup';
        return;
    }
    if (f.has_data) $('loading').classList.add('hidden');
    if (f.lists) {
        $('today-content').innerHTML = f.lists.today;
        $('timeline-content').innerHTML = f.lists.upcoming;
        lastFocused = null;
    }

    $('clock-time').textContent = f.clock.time;
    $('clock-date').textContent = f.clock.date;
    $('today-date-large').textContent = f.clock.long_date;

    $('stat-urgent').textContent = f.stats.urgent;
    $('stat-active').textContent = f.stats.in_progress;
    $('stat-today').textContent = f.stats.today_count;

    if (f.weather) {
        $('weather-icon').className = `fas ${esc(f.weather.icon)} ${esc(f.weather.tone)}`;
        $('weather-temp').className = esc(f.weather.tone);
        $('weather-temp').textContent = f.weather.label;
    }

    $('banner-slot').innerHTML = f.banner || '';

    document.querySelectorAll('.is-focused').forEach(el => el.classList.remove('is-focused'));
    if (f.focused) {
        const el = $(f.focused);
        if (el) {
            el.classList.add('is-focused');
            if (f.focused !== lastFocused) el.scrollIntoView({ block: 'center', behavior: 'auto' });
        }
    }
    lastFocused = f.focused;

    const panel = $('details-panel');
    if (f.details) {
        panel.innerHTML = f.details;
        panel.classList.add('visible');
    } else {
        panel.classList.remove('visible');
    }
    document.body.dataset.mode = f.mode;
}

function send(input) {
    fetch('/tv/input', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(input),
    }).catch(() => {});
}

function targetOf(node) {
    if (!node || !node.closest) return null;
    const item = node.closest('[data-slot]');
    if (item) return item.dataset.slot;
    return node.closest('#HEADER_ID') ? 'header' : null;
}

document.addEventListener('keydown', (e) => {
    if (ARROWS.includes(e.key) || e.key === 'Backspace') e.preventDefault();
    send({ type: 'key', key: e.key });
});

let lastMove = 0;
document.addEventListener('mousemove', () => {
    const now = Date.now();
    if (now - lastMove < 250) return;
    lastMove = now;
    send({ type: 'pointer_move' });
});

document.addEventListener('mouseover', (e) => {
    const target = targetOf(e.target);
    if (target && target !== targetOf(e.relatedTarget)) send({ type: 'pointer_enter', target });
});
document.addEventListener('mouseout', (e) => {
    const target = targetOf(e.target);
    if (target && target !== targetOf(e.relatedTarget)) send({ type: 'pointer_leave', target });
});
document.addEventListener('touchstart', (e) => send({ type: 'touch_start', target: targetOf(e.target) }), { passive: true });
document.addEventListener('touchend', (e) => send({ type: 'touch_end', target: targetOf(e.target) }), { passive: true });
document.addEventListener('click', (e) => send({ type: 'click', target: targetOf(e.target) }));

function toggleFullscreen() {
    if (!document.fullscreenElement) {
        document.documentElement.requestFullscreen().catch(() => {});
    } else if (document.exitFullscreen) {
        document.exitFullscreen();
    }
}
$('HEADER_ID').addEventListener('click', toggleFullscreen);

// Kiosk browsers only allow fullscreen after a user gesture
const enterFullscreen = () => {
    if (!document.fullscreenElement) toggleFullscreen();
    ['click', 'touchstart', 'keydown'].forEach(ev => document.removeEventListener(ev, enterFullscreen));
};
['click', 'touchstart', 'keydown'].forEach(ev => document.addEventListener(ev, enterFullscreen));

function connect() {
    const es = new EventSource('/tv/events');
    es.addEventListener('frame', (e) => {
        try { applyFrame(JSON.parse(e.data)); } catch (err) { console.error('Frame error:', err); }
    });
    es.onerror = () => {
        es.close();
        setTimeout(connect, 5000);
    };
}
connect();
"#;

#[component]
pub fn TvPage(today_html: String, upcoming_html: String) -> Element {
    let script = TV_SCRIPT.replace("HEADER_ID", HEADER_DOM_ID);

    rsx! {
        KioskLayout {
            title: "TV Board".to_string(),
            styles: Some(TV_STYLES.to_string()),
            scripts: Some(script),

            div { id: "loading", class: "loading", "Loading board..." }
            div { class: "board",
                header { class: "board-header",
                    div { class: "brand",
                        h1 { "PLANNING" }
                        p { "Dashboard" }
                    }
                    div { id: "banner-slot", class: "banner-slot" }
                    div { class: "stats",
                        span { class: "stat urgent", title: "Critical tickets",
                            i { class: "fas fa-exclamation-triangle" } " " span { id: "stat-urgent", "0" }
                        }
                        span { class: "stat active", title: "In progress",
                            i { class: "fas fa-bolt" } " " span { id: "stat-active", "0" }
                        }
                        span { class: "stat today", title: "Today",
                            i { class: "fas fa-calendar-day" } " " span { id: "stat-today", "0" }
                        }
                    }
                    div { class: "clock",
                        div { id: "clock-time", "--:--" }
                        div { id: "clock-date", "---" }
                    }
                }
                main { class: "columns",
                    section { class: "column today",
                        div { class: "column-head",
                            h2 { "Today" }
                            div { class: "weather",
                                i { id: "weather-icon", class: "fas fa-cloud-sun text-yellow-400" }
                                div { id: "weather-temp", "--°" }
                            }
                            span { id: "today-date-large", "..." }
                        }
                        div { id: "today-content", class: "scroller", dangerous_inner_html: "{today_html}" }
                    }
                    section { class: "column upcoming",
                        div { class: "column-head",
                            h2 { i { class: "fas fa-history" } " Upcoming" }
                            button { id: HEADER_DOM_ID, tabindex: "0", title: "Fullscreen",
                                i { class: "fas fa-expand" }
                            }
                        }
                        div { id: "timeline-content", class: "scroller", dangerous_inner_html: "{upcoming_html}" }
                    }
                }
            }
            div { id: "details-panel" }
            div { class: "mode-indicator", i { class: "fas fa-hand-pointer" } " Manual" }
        }
    }
}
