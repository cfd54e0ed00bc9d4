//! TV board: layout, focus and timing state for the planning dashboard.
//!
//! Everything except `runtime` is synchronous and clock-free; `runtime` owns
//! the single controller instance and feeds it time, inputs and snapshots.

pub mod controller;
pub mod details;
pub mod focus;
pub mod inactivity;
pub mod layout;
pub mod model;
pub mod navigation;
pub mod presentation;
pub mod runtime;
pub mod tickers;
pub mod timer;

pub use controller::{BoardController, BoardInput, BoardSettings, BoardView};
pub use runtime::{spawn_board, system_clock, BoardFrame, BoardHandle, WallClock};
