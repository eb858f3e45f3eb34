#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    KeyDown,
    MouseEnter,
    MouseLeave,
    Error,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::KeyDown => "keydown",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Error => "error",
        }
    }

    /// `mouseenter`/`mouseleave` fire on the target only; page-level `error`
    /// events are delivered to the window directly.
    pub const fn bubbles(self) -> bool {
        matches!(self, Self::Click | Self::Input | Self::KeyDown)
    }
}

/// A key-down as seen by the shortcut dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn meta(key: &str) -> Self {
        Self {
            meta: true,
            ..Self::plain(key)
        }
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenTarget<N> {
    Window,
    Document,
    Node(N),
}

/// Which behavior a registered listener runs. Indexed variants point into
/// the owning component's table of bound controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    AnchorClick,
    PressFeedback(usize),
    SliderGlow(usize),
    TooltipEnter(usize),
    TooltipLeave(usize),
    Shortcut,
    SaveParameters,
    ReportError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent<N> {
    pub kind: EventKind,
    pub target: Option<N>,
    pub current_target: Option<N>,
    pub key: Option<KeyPress>,
    pub message: Option<String>,
    default_prevented: bool,
}

impl<N> HostEvent<N> {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            target: None,
            current_target: None,
            key: None,
            message: None,
            default_prevented: false,
        }
    }

    pub fn with_target(mut self, target: N) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_key(mut self, key: KeyPress) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// One observation reported by the shared viewport observer.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry<N> {
    pub target: N,
    pub is_intersecting: bool,
}
