//! Pokédex TUI - browse the PokeAPI catalog
//!
//! The library exposes every module so integration tests can drive the
//! reducer, the components and the HTTP client directly.

pub mod action;
pub mod api;
pub mod components;
pub mod effect;
pub mod filter;
pub mod logging;
pub mod reducer;
pub mod sprite;
pub mod state;
