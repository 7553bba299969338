#![forbid(unsafe_code)]

//! Palette configuration.
//!
//! Built with `with_*` methods or read from the environment:
//!
//! | Variable                 | Meaning                                   |
//! |--------------------------|-------------------------------------------|
//! | `CMDPAL_ANIMATION_MS`    | Transition duration in ms (0 disables)    |
//! | `CMDPAL_CLOSE_ON_SELECT` | `1/true/yes/on` or `0/false/no/off`       |
//! | `CMDPAL_RECENT_MAX`      | Recents cap                               |
//! | `CMDPAL_RECENT_KEY`      | Storage key for recents                   |
//! | `CMDPAL_HOTKEYS`         | Comma-separated hotkeys, e.g. `mod+k,f1`  |
//!
//! Unparseable values are logged and ignored. [`PaletteConfig::validated`]
//! clamps everything into range.

use std::time::Duration;

use cmdpal_core::hotkey::{HotkeySet, Platform};

use super::recent::{DEFAULT_RECENT_KEY, DEFAULT_RECENT_MAX};

pub const ENV_ANIMATION_MS: &str = "CMDPAL_ANIMATION_MS";
pub const ENV_CLOSE_ON_SELECT: &str = "CMDPAL_CLOSE_ON_SELECT";
pub const ENV_RECENT_MAX: &str = "CMDPAL_RECENT_MAX";
pub const ENV_RECENT_KEY: &str = "CMDPAL_RECENT_KEY";
pub const ENV_HOTKEYS: &str = "CMDPAL_HOTKEYS";

/// Longest accepted transition.
pub const MAX_ANIMATION: Duration = Duration::from_millis(2000);
/// Largest accepted recents cap.
pub const MAX_RECENT: usize = 50;

/// Embedder-facing palette options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteConfig {
    /// Hotkeys that toggle the palette.
    pub hotkeys: HotkeySet,
    /// Platform used to resolve `mod` in hotkeys.
    pub platform: Platform,
    /// Enter/exit transition duration. Zero disables animation.
    pub animation: Duration,
    /// Close after a leaf is selected.
    pub close_on_select: bool,
    /// Start open (uncontrolled mode only).
    pub default_open: bool,
    /// Cap on remembered commands.
    pub recent_max: usize,
    /// Storage key for remembered commands.
    pub recent_key: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            hotkeys: HotkeySet::default(),
            platform: Platform::current(),
            animation: Duration::ZERO,
            close_on_select: true,
            default_open: false,
            recent_max: DEFAULT_RECENT_MAX,
            recent_key: DEFAULT_RECENT_KEY.to_string(),
        }
    }
}

impl PaletteConfig {
    /// Defaults overridden by `CMDPAL_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = env_parse::<u64>(&get_env, ENV_ANIMATION_MS) {
            config.animation = Duration::from_millis(ms);
        }
        if let Some(close) = env_bool(&get_env, ENV_CLOSE_ON_SELECT) {
            config.close_on_select = close;
        }
        if let Some(max) = env_parse::<usize>(&get_env, ENV_RECENT_MAX) {
            config.recent_max = max;
        }
        if let Some(key) = get_env(ENV_RECENT_KEY) {
            config.recent_key = key.trim().to_string();
        }
        if let Some(raw) = get_env(ENV_HOTKEYS) {
            let descriptors: Vec<&str> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            match HotkeySet::parse(&descriptors) {
                Ok(set) if !descriptors.is_empty() => config.hotkeys = set,
                Ok(_) => tracing::warn!(var = ENV_HOTKEYS, "no hotkeys given, keeping default"),
                Err(error) => {
                    tracing::warn!(var = ENV_HOTKEYS, value = %raw, %error, "ignoring hotkeys")
                }
            }
        }

        config.validated()
    }

    /// Set the toggle hotkeys (builder).
    #[must_use]
    pub fn with_hotkeys(mut self, hotkeys: HotkeySet) -> Self {
        self.hotkeys = hotkeys;
        self
    }

    /// Set the platform for `mod` resolution (builder).
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the transition duration (builder).
    #[must_use]
    pub fn with_animation(mut self, animation: Duration) -> Self {
        self.animation = animation;
        self
    }

    /// Keep the palette open after selection when `false` (builder).
    #[must_use]
    pub fn with_close_on_select(mut self, close: bool) -> Self {
        self.close_on_select = close;
        self
    }

    /// Start open (builder).
    #[must_use]
    pub fn with_default_open(mut self, open: bool) -> Self {
        self.default_open = open;
        self
    }

    /// Set the recents cap (builder).
    #[must_use]
    pub fn with_recent_max(mut self, max: usize) -> Self {
        self.recent_max = max;
        self
    }

    /// Set the recents storage key (builder).
    #[must_use]
    pub fn with_recent_key(mut self, key: impl Into<String>) -> Self {
        self.recent_key = key.into();
        self
    }

    /// Clamp values into their accepted ranges.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.animation = self.animation.min(MAX_ANIMATION);
        self.recent_max = self.recent_max.clamp(1, MAX_RECENT);
        if self.recent_key.is_empty() {
            self.recent_key = DEFAULT_RECENT_KEY.to_string();
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(
    get_env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = get_env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = key, value = %raw, "ignoring unparseable value");
            None
        }
    }
}

fn env_bool(get_env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = get_env(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(var = key, value = %raw, "ignoring unparseable flag");
            None
        }
    }
}
