#![forbid(unsafe_code)]

//! Core: key events, hotkey matching, and the overlay transition lifecycle.

pub mod animation;
pub mod event;
pub mod hotkey;
