//! UI module - terminal rendering and input handling

mod app;

pub use app::App;
