//! Audio system
//!
//! An abstract backend trait consumed by the chime controller, plus the
//! Kira-based production implementation.

pub mod backend;
pub mod kira;

pub use backend::{AudioBackend, AudioError};
pub use kira::KiraBackend;
