//! Codecs for the progress passwords of Metroid, Kid Icarus, Mega Man 2 and
//! Solar Jetman.
//!
//! Start from [`core_api::Engine::builtin`] and ask it for a
//! [`password::Password`], either blank or decoded from text.

pub mod bits;
pub mod cells;
pub mod core_api;
pub mod digits;
pub mod field;
pub mod password;
pub mod settings;
pub mod structure;
pub mod structured;
pub mod text;
