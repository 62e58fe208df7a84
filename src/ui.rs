//! Terminal chat surface
//!
//! A view over runtime snapshots: message list, typing indicator, quota
//! badge and an input line. Holds no conversation state of its own.

mod app;
mod render;
mod state;

pub use app::App;
