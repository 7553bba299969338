#![forbid(unsafe_code)]

//! Global hotkey descriptors and platform-aware matching.
//!
//! A [`Hotkey`] is a key plus a set of required modifiers, parsed from
//! strings like `"mod+k"`, `"ctrl+shift+p"` or `"alt+space"`. The `mod`
//! token names the platform's primary modifier: Command on macOS, Control
//! everywhere else. Matching is exact: every modifier the hotkey does not
//! name must be released.
//!
//! # Example
//!
//! ```
//! use cmdpal_core::event::{KeyCode, KeyEvent, Modifiers};
//! use cmdpal_core::hotkey::{Hotkey, Platform};
//!
//! let hotkey: Hotkey = "mod+k".parse().unwrap();
//! let ctrl_k = KeyEvent::new(KeyCode::Char('k')).with_modifiers(Modifiers::CTRL);
//! let cmd_k = KeyEvent::new(KeyCode::Char('k')).with_modifiers(Modifiers::SUPER);
//!
//! assert!(hotkey.matches(&ctrl_k, Platform::Other));
//! assert!(hotkey.matches(&cmd_k, Platform::Mac));
//! assert!(!hotkey.matches(&ctrl_k, Platform::Mac));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::event::{KeyCode, KeyEvent, Modifiers};

/// Hotkey used when the embedder configures none.
pub const DEFAULT_HOTKEY: &str = "mod+k";

/// Platform family, for resolving the `mod` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// macOS / iOS: `mod` is Command.
    Mac,
    /// Everything else: `mod` is Control.
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Mac
        } else {
            Self::Other
        }
    }

    /// The concrete modifier behind `mod`.
    #[must_use]
    pub const fn primary_modifier(self) -> Modifiers {
        match self {
            Self::Mac => Modifiers::SUPER,
            Self::Other => Modifiers::CTRL,
        }
    }
}

/// Errors from parsing a hotkey string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyParseError {
    /// The string was empty or had an empty segment (`"ctrl+"`).
    Empty,
    /// A modifier token was not recognized.
    UnknownModifier(String),
    /// The key token was not recognized.
    UnknownKey(String),
}

impl fmt::Display for HotkeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty hotkey"),
            Self::UnknownModifier(m) => write!(f, "unknown hotkey modifier: {m}"),
            Self::UnknownKey(k) => write!(f, "unknown hotkey key: {k}"),
        }
    }
}

impl std::error::Error for HotkeyParseError {}

/// A key plus the modifiers that must be held for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    /// The key. Character keys are stored lower-cased.
    pub key: KeyCode,
    /// Require the platform primary modifier (`mod`).
    pub primary: bool,
    /// Explicitly required modifiers, on top of `primary`.
    pub modifiers: Modifiers,
}

impl Hotkey {
    /// A hotkey with no modifiers.
    #[must_use]
    pub fn new(key: KeyCode) -> Self {
        Self {
            key: normalize_key(key),
            primary: false,
            modifiers: Modifiers::NONE,
        }
    }

    /// Require the platform primary modifier (builder).
    #[must_use]
    pub fn with_primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Require additional modifiers (builder).
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// The exact modifier set this hotkey expects on `platform`.
    #[must_use]
    pub fn required_modifiers(&self, platform: Platform) -> Modifiers {
        if self.primary {
            self.modifiers | platform.primary_modifier()
        } else {
            self.modifiers
        }
    }

    /// Whether `event` triggers this hotkey on `platform`.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        if !event.is_actionable() {
            return false;
        }
        let (code, mut held) = match event.code {
            // Terminals report Shift+Tab as its own key.
            KeyCode::BackTab => (KeyCode::Tab, event.modifiers | Modifiers::SHIFT),
            other => (normalize_key(other), event.modifiers),
        };
        // Shifted characters already encode Shift in the produced char.
        if matches!(code, KeyCode::Char(c) if !c.is_alphabetic())
            && !self.modifiers.contains(Modifiers::SHIFT)
        {
            held.remove(Modifiers::SHIFT);
        }
        code == self.key && held == self.required_modifiers(platform)
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        if lowered.is_empty() {
            return Err(HotkeyParseError::Empty);
        }
        let parts: Vec<&str> = lowered.split('+').map(str::trim).collect();
        let (key_token, modifier_tokens) = parts.split_last().ok_or(HotkeyParseError::Empty)?;

        let mut hotkey = Hotkey::new(parse_key(key_token)?);
        for token in modifier_tokens {
            match *token {
                "" => return Err(HotkeyParseError::Empty),
                "mod" => hotkey.primary = true,
                "ctrl" | "control" => hotkey.modifiers |= Modifiers::CTRL,
                "shift" => hotkey.modifiers |= Modifiers::SHIFT,
                "alt" | "option" => hotkey.modifiers |= Modifiers::ALT,
                "meta" | "cmd" | "command" | "super" => hotkey.modifiers |= Modifiers::SUPER,
                other => return Err(HotkeyParseError::UnknownModifier(other.to_string())),
            }
        }
        Ok(hotkey)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.primary {
            write!(f, "mod+")?;
        }
        for (flag, name) in [
            (Modifiers::CTRL, "ctrl"),
            (Modifiers::SUPER, "meta"),
            (Modifiers::ALT, "alt"),
            (Modifiers::SHIFT, "shift"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        match self.key {
            KeyCode::Char(' ') => write!(f, "space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => write!(f, "enter"),
            KeyCode::Escape => write!(f, "escape"),
            KeyCode::Backspace => write!(f, "backspace"),
            KeyCode::Tab | KeyCode::BackTab => write!(f, "tab"),
            KeyCode::Delete => write!(f, "delete"),
            KeyCode::Home => write!(f, "home"),
            KeyCode::End => write!(f, "end"),
            KeyCode::PageUp => write!(f, "pageup"),
            KeyCode::PageDown => write!(f, "pagedown"),
            KeyCode::Up => write!(f, "up"),
            KeyCode::Down => write!(f, "down"),
            KeyCode::Left => write!(f, "left"),
            KeyCode::Right => write!(f, "right"),
            KeyCode::F(n) => write!(f, "f{n}"),
        }
    }
}

fn normalize_key(key: KeyCode) -> KeyCode {
    match key {
        KeyCode::Char(c) => KeyCode::Char(c.to_lowercase().next().unwrap_or(c)),
        other => other,
    }
}

fn parse_key(token: &str) -> Result<KeyCode, HotkeyParseError> {
    let key = match token {
        "" => return Err(HotkeyParseError::Empty),
        "enter" | "return" => KeyCode::Enter,
        "escape" | "esc" => KeyCode::Escape,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "up" | "arrowup" => KeyCode::Up,
        "down" | "arrowdown" => KeyCode::Down,
        "left" | "arrowleft" => KeyCode::Left,
        "right" | "arrowright" => KeyCode::Right,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => parse_function_key(other)
                    .ok_or_else(|| HotkeyParseError::UnknownKey(other.to_string()))?,
            }
        }
    };
    Ok(key)
}

fn parse_function_key(token: &str) -> Option<KeyCode> {
    let n: u8 = token.strip_prefix('f')?.parse().ok()?;
    (1..=24).contains(&n).then_some(KeyCode::F(n))
}

/// One or more hotkeys, any of which toggles the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeySet {
    hotkeys: Vec<Hotkey>,
}

impl HotkeySet {
    /// Build a set from already-parsed hotkeys.
    #[must_use]
    pub fn new(hotkeys: Vec<Hotkey>) -> Self {
        Self { hotkeys }
    }

    /// Parse every descriptor; the first malformed one fails the whole set.
    pub fn parse<S: AsRef<str>>(descriptors: &[S]) -> Result<Self, HotkeyParseError> {
        let hotkeys = descriptors
            .iter()
            .map(|d| d.as_ref().parse())
            .collect::<Result<Vec<Hotkey>, _>>()?;
        Ok(Self { hotkeys })
    }

    /// The hotkeys in configuration order.
    #[must_use]
    pub fn hotkeys(&self) -> &[Hotkey] {
        &self.hotkeys
    }

    /// Whether any hotkey in the set matches `event`.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        self.hotkeys.iter().any(|h| h.matches(event, platform))
    }
}

impl Default for HotkeySet {
    fn default() -> Self {
        Self {
            hotkeys: vec![Hotkey::new(KeyCode::Char('k')).with_primary()],
        }
    }
}
