#![forbid(unsafe_code)]

//! cmdpal public facade crate.
//!
//! Re-exports the palette controller and the types an embedder touches
//! day to day, plus a prelude.
//!
//! ```
//! use cmdpal::prelude::*;
//!
//! let mut palette = CommandPalette::new(
//!     vec![Command::new("open", "Open File"), Command::new("save", "Save File")],
//!     |_| {},
//! );
//! palette.open();
//! palette.set_query("file");
//! assert_eq!(palette.results().len(), 2);
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use cmdpal_core::animation::{AnimationState, Clock, ManualClock, SystemClock};
pub use cmdpal_core::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use cmdpal_core::hotkey::{Hotkey, HotkeyParseError, HotkeySet, Platform};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "state-persistence")]
pub use cmdpal_runtime::FileStorage;
pub use cmdpal_runtime::{
    CancellationToken, MemoryStorage, Responder, StorageBackend, StorageError, StoredEntry,
    TaskError,
};

// --- Widget re-exports -----------------------------------------------------

pub use cmdpal_widgets::command_palette::{
    Command, CommandFilter, CommandGroup, CommandPalette, CommandRegistry, FilterReply,
    FilterRequest, FocusHost, PaletteConfig, PaletteMsg, ThreadedFilter, default_filter,
};

pub use cmdpal_core as core;
pub use cmdpal_runtime as runtime;
pub use cmdpal_widgets as widgets;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for embedders wiring up a palette.
#[derive(Debug)]
pub enum Error {
    /// A hotkey descriptor did not parse.
    Hotkey(HotkeyParseError),
    /// A storage backend failed.
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hotkey(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Hotkey(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<HotkeyParseError> for Error {
    fn from(err: HotkeyParseError) -> Self {
        Self::Hotkey(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(StorageError::Io(err))
    }
}

/// Standard result type for cmdpal APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Command, CommandPalette, CommandRegistry, Error, HotkeySet, KeyCode, KeyEvent, Modifiers,
        PaletteConfig, PaletteMsg, Platform, Result,
    };
}
