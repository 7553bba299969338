#![forbid(unsafe_code)]

//! Headless widgets for the cmdpal interaction engine.
//!
//! The only widget is the [`command_palette`]: a searchable, keyboard-driven
//! selection overlay with drill-down pages, recents, and async filtering. It
//! owns state and exposes binding descriptors; drawing is left to the host.

pub mod command_palette;
