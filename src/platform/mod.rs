//! Platform abstraction layer
//!
//! Host-side helpers that sit between browser/native events and the
//! simulation:
//! - Tilt and thrust input filtering

pub mod input;

pub use input::InputFilter;
