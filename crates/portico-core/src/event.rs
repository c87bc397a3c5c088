//! Input events delivered by a [`Document`](crate::Document).

use crate::dom::NodeId;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Keyboard key identity, following DOM `KeyboardEvent.key` values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Escape key
    Escape,
    /// Enter/Return
    Enter,
    /// Tab
    Tab,
    /// Space bar
    Space,
    /// Backspace
    Backspace,
    /// Delete
    Delete,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Printable character
    Char(char),
    /// Any other named key (`"F5"`, `"Shift"`, ...)
    Named(String),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value.
    ///
    /// Escape matches only the standard `"Escape"` value. The legacy `"Esc"`
    /// reported by old Edge and IE stays a [`Key::Named`] key.
    #[must_use]
    pub fn from_key_value(value: &str) -> Self {
        match value {
            "Escape" => Self::Escape,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            " " | "Spacebar" => Self::Space,
            "Backspace" => Self::Backspace,
            "Delete" | "Del" => Self::Delete,
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            "ArrowLeft" | "Left" => Self::Left,
            "ArrowRight" | "Right" => Self::Right,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Named(other.to_string()),
                }
            }
        }
    }

    /// The DOM `key` value for this key.
    #[must_use]
    pub fn key_value(&self) -> String {
        match self {
            Self::Escape => "Escape".to_string(),
            Self::Enter => "Enter".to_string(),
            Self::Tab => "Tab".to_string(),
            Self::Space => " ".to_string(),
            Self::Backspace => "Backspace".to_string(),
            Self::Delete => "Delete".to_string(),
            Self::Up => "ArrowUp".to_string(),
            Self::Down => "ArrowDown".to_string(),
            Self::Left => "ArrowLeft".to_string(),
            Self::Right => "ArrowRight".to_string(),
            Self::Char(c) => c.to_string(),
            Self::Named(name) => name.clone(),
        }
    }

    /// Whether this is the Escape key.
    #[must_use]
    pub const fn is_escape(&self) -> bool {
        matches!(self, Self::Escape)
    }
}

/// Document-level keydown event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key pressed
    pub key: Key,
}

impl KeyEvent {
    /// Create a keydown event.
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self { key }
    }
}

/// Click event as seen by one handler on the bubbling path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Node that was clicked
    pub target: NodeId,
    /// Node whose handler is running
    pub current_target: NodeId,
}

/// Click handler attached to an element.
pub type ClickHandler = Rc<dyn Fn(&ClickEvent)>;

/// Keydown handler.
pub type KeyHandler = Rc<dyn Fn(&KeyEvent)>;
