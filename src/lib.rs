//! Facility TV Board
//!
//! Unattended TV dashboard for the maintenance ticketing and planning app.
//!
//! This library provides:
//! - Snapshot polling of the ticketing service's TV endpoint
//! - Today / Upcoming layout with a broadcast banner and header stats
//! - Server-owned focus, D-pad navigation, details overlay and auto-cycle
//! - Clock and weather tickers
//! - A kiosk web surface driven over Server-Sent Events

pub mod access;
pub mod adapters;
pub mod api;
pub mod board;
pub mod bus;
pub mod config;
pub mod ui;
