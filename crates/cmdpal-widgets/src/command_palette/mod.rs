#![forbid(unsafe_code)]

//! Headless command palette controller.
//!
//! This module provides the state and behavior of a searchable command
//! overlay with:
//! - Substring and fuzzy scoring over labels and keywords
//! - Sync or async filtering with stale-result dropping
//! - Drill-down pages for nested commands
//! - Wrap-around keyboard navigation and a global toggle hotkey
//! - Persisted most-recently-used commands
//! - An enter/exit transition lifecycle
//! - Live-region announcements and binding descriptors for renderers
//!
//! # Usage
//!
//! ```
//! use cmdpal_core::event::{KeyCode, KeyEvent};
//! use cmdpal_widgets::command_palette::{Command, CommandPalette};
//!
//! let items = vec![
//!     Command::new("open", "Open File"),
//!     Command::new("save", "Save File"),
//! ];
//! let mut palette = CommandPalette::new(items, |cmd| println!("run {}", cmd.id));
//! palette.open();
//! palette.set_query("save");
//! assert_eq!(palette.results().len(), 1);
//!
//! // Feed key presses from the query input.
//! palette.handle_input_key(&KeyEvent::new(KeyCode::Enter));
//! assert!(!palette.is_open());
//! ```
//!
//! # Submodules
//!
//! - [`scorer`]: substring/fuzzy scoring
//! - [`filter`]: filter contract and orchestration
//! - [`pages`]: drill-down navigation stack
//! - [`recent`]: persisted MRU list
//! - [`keyboard`]: key-to-action mapping
//! - [`bindings`]: accessibility descriptors
//! - [`registry`]: keyed command registry
//! - [`config`]: configuration and environment overrides

pub mod bindings;
pub mod command;
pub mod config;
pub mod filter;
pub mod keyboard;
pub mod pages;
pub mod recent;
pub mod registry;
pub mod scorer;

pub use bindings::{ContainerBinding, InputBinding, ItemBinding, ListBinding, LiveRegionBinding};
pub use command::{Command, CommandGroup, group_commands};
pub use config::PaletteConfig;
pub use filter::{
    CommandFilter, DefaultFilter, FilterEngine, FilterReply, FilterRequest, ThreadedFilter,
    default_filter,
};
pub use keyboard::{KeyAction, map_key};
pub use pages::{PageFrame, PageStack};
pub use recent::RecencyTracker;
pub use registry::{CommandRegistry, SubscriptionId};
pub use scorer::{MatchResult, MatchType, score, score_command, score_match};

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use cmdpal_core::animation::{AnimationLifecycle, AnimationState, Clock, SystemClock};
use cmdpal_core::event::KeyEvent;
use cmdpal_runtime::StorageBackend;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Interactions a renderer reports back through [`CommandPalette::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteMsg {
    Open,
    Close,
    Toggle,
    /// The query input changed.
    SetQuery(String),
    /// Pointer hovered the item at this index.
    Highlight(usize),
    /// The item at `index` was activated. Ignored unless it still shows `id`.
    Activate { index: usize, id: String },
    GoBack,
    /// A key was pressed in the query input.
    InputKey(KeyEvent),
}

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// Host hook for saving and restoring focus around the overlay.
pub trait FocusHost {
    /// Identifier of the element that has focus now, if any.
    fn focused(&self) -> Option<String>;
    /// Move focus back to `target`.
    fn focus(&mut self, target: &str);
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

type SelectFn = Box<dyn FnMut(&Command)>;
type OpenChangeFn = Box<dyn FnMut(bool)>;

struct Controlled {
    open: bool,
    on_open_change: OpenChangeFn,
}

/// Headless command palette.
///
/// # Invariants
///
/// 1. `highlighted_index()` is < `results().len()`, or 0 when empty.
/// 2. Only the active page's direct children are filtered.
/// 3. Disabled commands are never selected, by any path.
/// 4. Closing always leaves an empty query at the root page.
/// 5. In controlled mode, open-state actions only notify the embedder;
///    the state moves when [`set_open`](Self::set_open) feeds it back.
pub struct CommandPalette {
    config: PaletteConfig,
    /// Open flag in uncontrolled mode.
    open: bool,
    controlled: Option<Controlled>,
    query: String,
    highlighted: usize,
    pages: PageStack,
    engine: FilterEngine,
    /// Filter revision already reflected in highlight and announcement.
    seen_revision: u64,
    recents: RecencyTracker,
    animation: AnimationLifecycle,
    announcement: String,
    on_select: SelectFn,
    focus: Option<Box<dyn FocusHost>>,
    saved_focus: Option<String>,
    clock: Box<dyn Clock>,
}

impl CommandPalette {
    /// Create a closed palette over `items` with default configuration.
    pub fn new(items: Vec<Command>, on_select: impl FnMut(&Command) + 'static) -> Self {
        let config = PaletteConfig::default();
        let mut palette = Self {
            open: config.default_open,
            controlled: None,
            query: String::new(),
            highlighted: 0,
            pages: PageStack::new(items),
            engine: FilterEngine::default(),
            seen_revision: 0,
            recents: RecencyTracker::disabled(),
            animation: AnimationLifecycle::new(config.animation, config.default_open),
            announcement: String::new(),
            on_select: Box::new(on_select),
            focus: None,
            saved_focus: None,
            clock: Box::new(SystemClock),
            config,
        };
        palette.refilter(false);
        palette
    }

    /// Apply configuration (builder).
    ///
    /// Resets the open state to `default_open` in uncontrolled mode and
    /// reloads recents under the configured key when they are enabled.
    pub fn with_config(mut self, config: PaletteConfig) -> Self {
        self.config = config.validated();
        if self.controlled.is_none() {
            self.open = self.config.default_open;
        }
        self.animation = AnimationLifecycle::new(self.config.animation, self.is_open());
        if let Some(storage) = self.recents.storage().cloned() {
            self.recents =
                RecencyTracker::new(storage, &self.config.recent_key, self.config.recent_max);
        }
        self
    }

    /// Replace the filter (builder).
    pub fn with_filter(mut self, filter: impl CommandFilter + 'static) -> Self {
        self.engine = FilterEngine::new(Box::new(filter));
        self.seen_revision = 0;
        self.refilter(false);
        self
    }

    /// Enable recents backed by `storage` (builder). Loads immediately.
    pub fn with_recents(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.recents =
            RecencyTracker::new(storage, &self.config.recent_key, self.config.recent_max);
        self
    }

    /// Save and restore focus through `host` (builder).
    pub fn with_focus_host(mut self, host: impl FocusHost + 'static) -> Self {
        self.focus = Some(Box::new(host));
        self
    }

    /// Read time from `clock` instead of the system clock (builder).
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Switch to controlled mode (builder).
    ///
    /// `open` is the embedder's current flag; `on_open_change` receives
    /// every open/close request.
    pub fn controlled(mut self, open: bool, on_open_change: impl FnMut(bool) + 'static) -> Self {
        self.controlled = Some(Controlled {
            open,
            on_open_change: Box::new(on_open_change),
        });
        self.animation = AnimationLifecycle::new(self.config.animation, open);
        self
    }
}

impl CommandPalette {
    // --- Visibility ---

    /// Whether the palette is open (the embedder's flag in controlled mode).
    pub fn is_open(&self) -> bool {
        match &self.controlled {
            Some(controlled) => controlled.open,
            None => self.open,
        }
    }

    /// Save focus and request open. No-op when already open.
    pub fn open(&mut self) {
        if self.is_open() {
            return;
        }
        self.saved_focus = self.focus.as_ref().and_then(|host| host.focused());
        self.request_open(true);
    }

    /// Clear the query, return to the root page, restore focus, and request
    /// close.
    pub fn close(&mut self) {
        self.end_session();
        self.request_open(false);
    }

    /// Open when closed, close when open.
    pub fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Set the open flag directly.
    ///
    /// This is how a controlled embedder feeds its flag back. Closing this
    /// way performs the same cleanup as [`close`](Self::close).
    pub fn set_open(&mut self, open: bool) {
        if self.is_open() == open {
            return;
        }
        match &mut self.controlled {
            Some(controlled) => controlled.open = open,
            None => self.open = open,
        }
        self.animation.transition(open, self.clock.now());
        tracing::debug!(open, controlled = self.controlled.is_some(), "palette open state changed");
        if open {
            self.announcement = "Command palette open".to_string();
        } else {
            self.end_session();
        }
    }

    fn request_open(&mut self, open: bool) {
        if self.is_open() == open {
            return;
        }
        match &mut self.controlled {
            Some(controlled) => (controlled.on_open_change)(open),
            None => self.set_open(open),
        }
    }

    /// Reset per-session state. Idempotent.
    fn end_session(&mut self) {
        self.highlighted = 0;
        if !self.query.is_empty() || self.pages.can_go_back() {
            self.query.clear();
            self.pages.reset();
            self.refilter(false);
        }
        if let Some(target) = self.saved_focus.take()
            && let Some(host) = self.focus.as_mut()
        {
            host.focus(&target);
        }
    }

    // --- Query & highlight ---

    /// Replace the query and reset the highlight.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.highlighted = 0;
        if text == self.query {
            return;
        }
        self.query = text;
        self.refilter(true);
    }

    /// Highlight the result at `index`. Out-of-range indices are ignored.
    pub fn highlight(&mut self, index: usize) {
        if index < self.engine.results().len() {
            self.highlighted = index;
        }
    }

    // --- Selection & pages ---

    /// Select `command`.
    ///
    /// Disabled commands are ignored. Branches open their page. Leaves are
    /// announced, recorded in recents, passed to the selection callback,
    /// and close the palette unless `close_on_select` is off.
    pub fn select(&mut self, command: &Command) {
        if command.disabled {
            tracing::trace!(id = %command.id, "ignoring disabled command");
            return;
        }
        if command.is_branch() {
            self.go_to_page(command);
            return;
        }
        self.announcement = format!("{} selected", command.label);
        self.recents.add(command);
        tracing::debug!(id = %command.id, "command selected");
        (self.on_select)(command);
        if self.config.close_on_select {
            self.close();
        }
    }

    /// Enter `command`'s page, clearing the query. Leaves and disabled
    /// commands are ignored.
    pub fn go_to_page(&mut self, command: &Command) {
        if command.disabled || !self.pages.push_page(command) {
            return;
        }
        tracing::debug!(id = %command.id, depth = self.pages.depth(), "entered page");
        self.query.clear();
        self.highlighted = 0;
        self.refilter(true);
    }

    /// Leave the current page. No-op at the root.
    pub fn go_back(&mut self) {
        if !self.pages.pop_page() {
            return;
        }
        tracing::debug!(depth = self.pages.depth(), "left page");
        self.highlighted = 0;
        self.refilter(true);
    }

    /// Replace the command tree and return to its root.
    pub fn set_items(&mut self, items: Vec<Command>) {
        self.pages.set_root(items);
        self.highlighted = 0;
        self.refilter(true);
    }

    // --- Events ---

    /// Toggle on a configured hotkey. Returns true when the host should
    /// suppress the key's default action.
    pub fn handle_global_key(&mut self, event: &KeyEvent) -> bool {
        if !self.config.hotkeys.matches(event, self.config.platform) {
            return false;
        }
        self.toggle();
        true
    }

    /// Handle a key press in the query input: navigation, confirm, dismiss.
    ///
    /// Returns true when the palette claims the key.
    pub fn handle_input_key(&mut self, event: &KeyEvent) -> bool {
        match map_key(self.engine.results().len(), self.highlighted, event) {
            Some(KeyAction::MoveNext(index) | KeyAction::MovePrevious(index)) => {
                self.highlighted = index;
            }
            Some(KeyAction::Confirm(index)) => {
                if let Some(command) = self.engine.results().get(index).cloned() {
                    self.select(&command);
                }
            }
            Some(KeyAction::Dismiss) => self.close(),
            None => {}
        }
        keyboard::is_palette_key(event)
    }

    /// Apply a message from a binding descriptor.
    pub fn dispatch(&mut self, msg: PaletteMsg) {
        match msg {
            PaletteMsg::Open => self.open(),
            PaletteMsg::Close => self.close(),
            PaletteMsg::Toggle => self.toggle(),
            PaletteMsg::SetQuery(text) => self.set_query(text),
            PaletteMsg::Highlight(index) => self.highlight(index),
            PaletteMsg::Activate { index, id } => {
                match self.engine.results().get(index) {
                    Some(command) if command.id == id => {
                        let command = command.clone();
                        self.select(&command);
                    }
                    _ => tracing::trace!(index, id = %id, "ignoring stale activation"),
                }
            }
            PaletteMsg::GoBack => self.go_back(),
            PaletteMsg::InputKey(event) => {
                self.handle_input_key(&event);
            }
        }
    }

    /// Advance transition timers and apply async filter answers.
    ///
    /// Returns true when visible state changed.
    pub fn tick(&mut self) -> bool {
        let settled = self.animation.poll(self.clock.now()).is_some();
        let was_loading = self.engine.is_loading();
        let polled = self.engine.poll();
        if polled {
            self.sync_results(true);
        }
        settled || polled || was_loading != self.engine.is_loading()
    }

    // --- Filtering ---

    fn refilter(&mut self, announce: bool) {
        self.engine.request(self.pages.current_items(), &self.query);
        self.sync_results(announce);
    }

    fn sync_results(&mut self, announce: bool) {
        let revision = self.engine.revision();
        if revision == self.seen_revision {
            return;
        }
        self.seen_revision = revision;

        let len = self.engine.results().len();
        self.highlighted = self.highlighted.min(len.saturating_sub(1));
        if announce && self.is_open() {
            self.announcement = format!("{len} result{}", if len == 1 { "" } else { "s" });
        }
    }

    // --- State access ---

    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlighted_index(&self) -> usize {
        self.highlighted
    }

    /// Filtered commands at the active page.
    pub fn results(&self) -> &[Command] {
        self.engine.results()
    }

    /// Filtered commands clustered by group.
    pub fn grouped_results(&self) -> Vec<CommandGroup> {
        group_commands(self.engine.results())
    }

    pub fn highlighted_command(&self) -> Option<&Command> {
        self.engine.results().get(self.highlighted)
    }

    /// Whether an async filter answer is outstanding.
    pub fn is_loading(&self) -> bool {
        self.engine.is_loading()
    }

    /// Whether the overlay should be rendered at all.
    pub fn is_mounted(&self) -> bool {
        self.animation.is_mounted()
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animation.state()
    }

    /// Eased transition progress for fades and slides.
    pub fn animation_progress(&self) -> f32 {
        self.animation.progress(self.clock.now())
    }

    /// When the host should next call [`tick`](Self::tick) for animation.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.animation.next_deadline()
    }

    /// Whether the recents view applies: root page, empty query.
    pub fn shows_recents(&self) -> bool {
        !self.pages.can_go_back() && self.query.is_empty()
    }

    /// Recent commands to display; empty unless [`shows_recents`](Self::shows_recents).
    pub fn recent_items(&self) -> &[Command] {
        if self.shows_recents() {
            self.recents.items()
        } else {
            &[]
        }
    }

    pub fn current_page(&self) -> Option<&Command> {
        self.pages.current_page()
    }

    pub fn breadcrumb(&self) -> Vec<&Command> {
        self.pages.breadcrumb()
    }

    pub fn can_go_back(&self) -> bool {
        self.pages.can_go_back()
    }

    /// Latest status text for assistive technology.
    pub fn announcement(&self) -> &str {
        &self.announcement
    }

    // --- Binding descriptors ---

    pub fn container_binding(&self) -> ContainerBinding {
        ContainerBinding::new()
    }

    pub fn list_binding(&self) -> ListBinding {
        ListBinding::new()
    }

    /// Descriptor for the result at `index`.
    pub fn item_binding(&self, index: usize) -> Option<ItemBinding> {
        self.engine
            .results()
            .get(index)
            .map(|command| ItemBinding::new(index, command, self.highlighted))
    }

    /// Descriptors for every result, in order.
    pub fn item_bindings(&self) -> Vec<ItemBinding> {
        self.engine
            .results()
            .iter()
            .enumerate()
            .map(|(index, command)| ItemBinding::new(index, command, self.highlighted))
            .collect()
    }

    pub fn input_binding(&self) -> InputBinding {
        InputBinding::new(&self.query, self.is_open(), self.highlighted_command())
    }

    pub fn live_region_binding(&self) -> LiveRegionBinding {
        LiveRegionBinding::new(&self.announcement)
    }
}

impl fmt::Debug for CommandPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandPalette")
            .field("open", &self.is_open())
            .field("controlled", &self.controlled.is_some())
            .field("query", &self.query)
            .field("highlighted", &self.highlighted)
            .field("depth", &self.pages.depth())
            .field("engine", &self.engine)
            .field("recents", &self.recents)
            .field("animation", &self.animation.state())
            .finish()
    }
}
