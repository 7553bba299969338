#![forbid(unsafe_code)]

//! Accessibility binding descriptors.
//!
//! Each descriptor is plain data a renderer copies onto its elements:
//! roles, ARIA-style state, stable element ids, and the [`PaletteMsg`]
//! values to send back through [`CommandPalette::dispatch`] when the user
//! interacts with the element.
//!
//! [`CommandPalette::dispatch`]: super::CommandPalette::dispatch

use cmdpal_core::event::KeyEvent;

use super::PaletteMsg;
use super::command::Command;

/// Id of the results list element.
pub const LIST_ID: &str = "cmd-palette-list";
/// Prefix of result item element ids.
pub const ITEM_ID_PREFIX: &str = "cmd-palette-item";
/// Accessible name of the palette container.
pub const CONTAINER_LABEL: &str = "Command palette";

/// Element id for the result item showing `command_id`.
pub fn item_element_id(command_id: &str) -> String {
    format!("{ITEM_ID_PREFIX}-{command_id}")
}

/// The palette's outer container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerBinding {
    pub role: &'static str,
    pub modal: bool,
    pub label: &'static str,
}

impl ContainerBinding {
    pub(crate) fn new() -> Self {
        Self {
            role: "dialog",
            modal: true,
            label: CONTAINER_LABEL,
        }
    }
}

/// The results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBinding {
    pub role: &'static str,
    pub id: &'static str,
}

impl ListBinding {
    pub(crate) fn new() -> Self {
        Self {
            role: "listbox",
            id: LIST_ID,
        }
    }
}

/// One result item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemBinding {
    pub role: &'static str,
    /// Whether this item is highlighted.
    pub selected: bool,
    pub disabled: bool,
    /// Element id, referenced by the input's active descendant.
    pub id: String,
    /// Sent on click/activation. `None` for disabled items.
    pub on_activate: Option<PaletteMsg>,
    /// Sent on pointer hover.
    pub on_hover: PaletteMsg,
}

impl ItemBinding {
    pub(crate) fn new(index: usize, command: &Command, highlighted: usize) -> Self {
        Self {
            role: "option",
            selected: index == highlighted,
            disabled: command.disabled,
            id: item_element_id(&command.id),
            on_activate: (!command.disabled).then(|| PaletteMsg::Activate {
                index,
                id: command.id.clone(),
            }),
            on_hover: PaletteMsg::Highlight(index),
        }
    }
}

/// The query input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBinding {
    pub role: &'static str,
    pub value: String,
    pub expanded: bool,
    /// Id of the list this input drives.
    pub controls: &'static str,
    /// Element id of the highlighted item, if any.
    pub active_descendant: Option<String>,
    pub autocomplete: &'static str,
}

impl InputBinding {
    pub(crate) fn new(query: &str, open: bool, highlighted: Option<&Command>) -> Self {
        Self {
            role: "combobox",
            value: query.to_string(),
            expanded: open,
            controls: LIST_ID,
            active_descendant: highlighted.map(|c| item_element_id(&c.id)),
            autocomplete: "off",
        }
    }

    /// Message for an edit of the input text.
    pub fn on_change(&self, text: impl Into<String>) -> PaletteMsg {
        PaletteMsg::SetQuery(text.into())
    }

    /// Message for a key press in the input.
    pub fn on_key(&self, event: KeyEvent) -> PaletteMsg {
        PaletteMsg::InputKey(event)
    }
}

/// Polite live region carrying the latest announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveRegionBinding {
    pub politeness: &'static str,
    pub atomic: bool,
    pub text: String,
}

impl LiveRegionBinding {
    pub(crate) fn new(announcement: &str) -> Self {
        Self {
            politeness: "polite",
            atomic: true,
            text: announcement.to_string(),
        }
    }
}
