#![forbid(unsafe_code)]

//! Input events as the page delivers them to controllers.

use chatkit_dom::NodeId;

/// Keys the interaction layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
}

/// Modifier state accompanying a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false };
    pub const SHIFT: Self = Self { shift: true };
}

/// One user-input (or host) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    KeyDown {
        key: Key,
        modifiers: Modifiers,
        target: NodeId,
    },
    KeyUp {
        key: Key,
        modifiers: Modifiers,
        target: NodeId,
    },
    Click {
        target: NodeId,
    },
    /// The element lost focus.
    Blur {
        target: NodeId,
    },
    /// The native dialog cancel gesture (escape on a modal dialog).
    /// Unless a controller prevents the default, the page closes the
    /// dialog directly, skipping any close choreography.
    DialogCancel {
        target: NodeId,
    },
    /// The page became visible or hidden.
    VisibilityChanged {
        visible: bool,
    },
}

/// Event category, for listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    Click,
    Blur,
    DialogCancel,
    Visibility,
}

impl UiEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::KeyUp { .. } => EventKind::KeyUp,
            Self::Click { .. } => EventKind::Click,
            Self::Blur { .. } => EventKind::Blur,
            Self::DialogCancel { .. } => EventKind::DialogCancel,
            Self::VisibilityChanged { .. } => EventKind::Visibility,
        }
    }

    /// The element the event was aimed at, when there is one.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Self::KeyDown { target, .. }
            | Self::KeyUp { target, .. }
            | Self::Click { target }
            | Self::Blur { target }
            | Self::DialogCancel { target } => Some(*target),
            Self::VisibilityChanged { .. } => None,
        }
    }
}
