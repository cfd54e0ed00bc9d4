mod setup;
mod tv;

pub use setup::SetupPage;
pub use tv::TvPage;
