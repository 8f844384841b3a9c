//! Input events delivered to behaviours.
//!
//! The core does not read devices. A window or network layer produces these
//! values and the scene fans them out to every behaviour of every enabled actor.

use nebula_shared::Vec2;

/// Platform-neutral key identifier.
///
/// The numbering is owned by whoever produces the events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

/// Keyboard transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key that changed state.
    pub key: KeyCode,
    /// `true` on press, `false` on release.
    pub pressed: bool,
}

impl KeyEvent {
    /// Key press.
    #[must_use]
    pub const fn pressed(key: KeyCode) -> Self {
        Self { key, pressed: true }
    }

    /// Key release.
    #[must_use]
    pub const fn released(key: KeyCode) -> Self {
        Self { key, pressed: false }
    }
}

/// Mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// Any extra button, numbered by the producer.
    Other(u8),
}

/// What happened to the mouse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MouseEventKind {
    /// Cursor moved.
    Moved,
    /// Button went down.
    Pressed(MouseButton),
    /// Button went up.
    Released(MouseButton),
    /// Wheel scrolled by the given amount.
    Wheel(f32),
}

/// Mouse event in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseEvent {
    /// Event kind.
    pub kind: MouseEventKind,
    /// Cursor position when the event happened.
    pub position: Vec2,
}

/// Either kind of input, as queued by producers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Keyboard transition.
    Keyboard(KeyEvent),
    /// Mouse event.
    Mouse(MouseEvent),
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self::Keyboard(event)
    }
}

impl From<MouseEvent> for InputEvent {
    fn from(event: MouseEvent) -> Self {
        Self::Mouse(event)
    }
}
