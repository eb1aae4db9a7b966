//! # IO Module
//!
//! Outer surfaces consulted by a presentation layer. Today that is route
//! guarding; rendering lives outside this crate.

pub mod navigation;

pub use navigation::{require_admin, require_auth, resolve, Access, Navigation, Route, ROUTES};
