//! Background adapters feeding the board: the ticketing snapshot and the weather

pub mod snapshot;
pub mod traits;
pub mod weather;

pub use snapshot::{FetchError, FetchOutcome, SnapshotFetcher};
pub use traits::Startable;
pub use weather::WeatherAdapter;
