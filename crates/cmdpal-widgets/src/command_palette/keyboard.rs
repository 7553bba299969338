#![forbid(unsafe_code)]

//! Key-to-action mapping for the palette's query input.
//!
//! | Key                        | Action         |
//! |----------------------------|----------------|
//! | Down, Tab                  | `MoveNext`     |
//! | Up, Shift+Tab, BackTab     | `MovePrevious` |
//! | Enter                      | `Confirm`      |
//! | Escape                     | `Dismiss`      |
//!
//! Movement wraps at both ends and is a no-op on an empty list.

use cmdpal_core::event::{KeyCode, KeyEvent};

/// What a key press asks the palette to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Highlight the next item; carries the wrapped target index.
    MoveNext(usize),
    /// Highlight the previous item; carries the wrapped target index.
    MovePrevious(usize),
    /// Select the item at this index.
    Confirm(usize),
    /// Close the palette.
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavKey {
    Next,
    Previous,
    Confirm,
    Dismiss,
}

fn classify(event: &KeyEvent) -> Option<NavKey> {
    if !event.is_actionable() {
        return None;
    }
    match event.code {
        KeyCode::Down => Some(NavKey::Next),
        KeyCode::Tab if event.shift() => Some(NavKey::Previous),
        KeyCode::Tab => Some(NavKey::Next),
        KeyCode::Up | KeyCode::BackTab => Some(NavKey::Previous),
        KeyCode::Enter => Some(NavKey::Confirm),
        KeyCode::Escape => Some(NavKey::Dismiss),
        _ => None,
    }
}

/// Whether the palette claims `event`, so the host should not act on it.
pub fn is_palette_key(event: &KeyEvent) -> bool {
    classify(event).is_some()
}

/// Map `event` against a list of `len` items with `index` highlighted.
///
/// Returns `None` for keys the palette ignores, for movement on an empty
/// list, and for Enter when nothing is highlighted.
pub fn map_key(len: usize, index: usize, event: &KeyEvent) -> Option<KeyAction> {
    match classify(event)? {
        NavKey::Next => next_index(len, index).map(KeyAction::MoveNext),
        NavKey::Previous => previous_index(len, index).map(KeyAction::MovePrevious),
        NavKey::Confirm => (index < len).then_some(KeyAction::Confirm(index)),
        NavKey::Dismiss => Some(KeyAction::Dismiss),
    }
}

/// Index after `index`, wrapping to 0. `None` on an empty list.
pub fn next_index(len: usize, index: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(if index + 1 < len { index + 1 } else { 0 })
}

/// Index before `index`, wrapping to the end. `None` on an empty list.
pub fn previous_index(len: usize, index: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(if index > 0 && index <= len { index - 1 } else { len - 1 })
}
