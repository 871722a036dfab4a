/// Capture session state machine.
///
/// State transitions:
/// ```text
/// closed → opening → open ↔ previewing → autofocus_pending → capturing
///                              ↑                                  ↓
///                              └──────────────────────────────────┘
/// stop(): any state → closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Opening,
    /// Handle open, not streaming (no surface yet, or preview setup failed).
    Open,
    Previewing,
    AutofocusPending,
    Capturing,
}

impl SessionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Whether a hardware handle is held in this state.
    pub fn has_handle(&self) -> bool {
        !matches!(self, Self::Closed | Self::Opening)
    }

    pub fn is_previewing(&self) -> bool {
        matches!(self, Self::Previewing)
    }

    /// Whether a still capture is in flight.
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::AutofocusPending | Self::Capturing)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Previewing => "previewing",
            Self::AutofocusPending => "autofocus_pending",
            Self::Capturing => "capturing",
        }
    }
}
