//! Mock servers for adapter integration testing
//!
//! These mock servers simulate the upstream services the board polls,
//! allowing full integration testing without a live ticketing instance.

pub mod tickets;
pub mod weather;

pub use tickets::MockTicketService;
pub use weather::MockWeatherService;
