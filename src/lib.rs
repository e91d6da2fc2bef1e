//! Verse Canvas
//!
//! A large verse corpus laid out as one pannable, zoomable canvas with exact
//! and semantic search.
//!
//! The pure core (layout, viewport math, search engines, render
//! reconciliation) sits behind the [`controller::Controller`]; the terminal
//! front-end in [`view`] is the impure shell that paints the scene and
//! forwards input.

pub mod config;
pub mod controller;
pub mod layout;
pub mod logging;
pub mod model;
pub mod render;
pub mod search;
pub mod source;
pub mod view;
pub mod view_state;

#[cfg(test)]
mod test_harness;
