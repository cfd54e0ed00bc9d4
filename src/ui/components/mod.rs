//! Shared Dioxus components

mod layout;

pub use layout::KioskLayout;
