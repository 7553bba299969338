#![forbid(unsafe_code)]

//! The command tree and display grouping.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A node in the command tree.
///
/// A command with a non-empty `children` list is a *branch*: selecting it
/// opens a page listing its children. Anything else is a *leaf*.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Identity, unique among siblings. Used for dedup and persistence.
    pub id: String,
    /// Display text; also the primary search field.
    pub label: String,
    /// Extra search terms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Display cluster. `None` falls in the ungrouped bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Shown but never selectable.
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Nested commands, shown one level at a time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Command>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Command {
    /// Create a leaf command.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            keywords: Vec::new(),
            group: None,
            disabled: false,
            children: Vec::new(),
        }
    }

    /// Set keywords (builder).
    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Set group (builder).
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the disabled flag (builder).
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set children (builder). A non-empty list makes this a branch.
    pub fn with_children(mut self, children: Vec<Command>) -> Self {
        self.children = children;
        self
    }

    /// Whether selecting this command opens a page.
    pub fn is_branch(&self) -> bool {
        !self.children.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// A run of commands sharing a `group`, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGroup {
    /// Group name, `None` for the ungrouped bucket.
    pub group: Option<String>,
    /// Members in filtered order.
    pub items: Vec<Command>,
}

/// Cluster `commands` by group.
///
/// Groups appear in order of their first member; members keep their
/// relative order. Every command lands in exactly one group.
pub fn group_commands(commands: &[Command]) -> Vec<CommandGroup> {
    let mut groups: Vec<CommandGroup> = Vec::new();
    for command in commands {
        match groups.iter_mut().find(|g| g.group == command.group) {
            Some(existing) => existing.items.push(command.clone()),
            None => groups.push(CommandGroup {
                group: command.group.clone(),
                items: vec![command.clone()],
            }),
        }
    }
    groups
}
