//! Session state types.
//!
//! ```text
//! Disconnected → Connecting → AwaitingGreeting → Idle{unauthenticated}
//!   → LoggingIn → Idle{authenticated} → Selecting → Idle{folder}
//!   → Fetching → Idle{folder} → LoggingOut → Disconnected
//! ```
//!
//! Every in-flight state carries the idle state it was entered from, which
//! is where the session returns when the server rejects the command.

use crate::command::CommandKind;

/// What is established while no command is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdleState {
    /// LOGIN has succeeded.
    pub authenticated: bool,
    /// Name of the selected mailbox.
    pub folder: Option<String>,
}

/// Lifecycle state of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No transport. Initial and terminal state.
    #[default]
    Disconnected,
    /// Transport connect and TLS handshake in progress.
    Connecting,
    /// Transport is up; waiting for the server's `* OK` greeting.
    AwaitingGreeting,
    /// Ready for the next command.
    Idle(IdleState),
    /// LOGIN sent.
    LoggingIn(IdleState),
    /// SELECT sent.
    Selecting(IdleState),
    /// FETCH sent.
    Fetching(IdleState),
    /// LOGOUT sent.
    LoggingOut(IdleState),
}

impl SessionState {
    /// Builds the in-flight state for `kind`, remembering `prior`.
    #[must_use]
    pub const fn in_flight(kind: CommandKind, prior: IdleState) -> Self {
        match kind {
            CommandKind::Login => Self::LoggingIn(prior),
            CommandKind::Select => Self::Selecting(prior),
            CommandKind::Fetch => Self::Fetching(prior),
            CommandKind::Logout => Self::LoggingOut(prior),
        }
    }

    /// Returns the idle state when no command is in flight.
    #[must_use]
    pub const fn idle(&self) -> Option<&IdleState> {
        match self {
            Self::Idle(idle) => Some(idle),
            _ => None,
        }
    }

    /// Returns the idle state this state returns to, or is.
    #[must_use]
    pub const fn base(&self) -> Option<&IdleState> {
        match self {
            Self::Idle(idle)
            | Self::LoggingIn(idle)
            | Self::Selecting(idle)
            | Self::Fetching(idle)
            | Self::LoggingOut(idle) => Some(idle),
            Self::Disconnected | Self::Connecting | Self::AwaitingGreeting => None,
        }
    }

    /// Returns `true` once LOGIN has succeeded.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.base().is_some_and(|idle| idle.authenticated)
    }

    /// Returns the selected mailbox name, if any.
    #[must_use]
    pub fn selected_folder(&self) -> Option<&str> {
        self.base().and_then(|idle| idle.folder.as_deref())
    }

    /// Short name for logs and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingGreeting => "awaiting greeting",
            Self::Idle(_) => "idle",
            Self::LoggingIn(_) => "logging in",
            Self::Selecting(_) => "selecting",
            Self::Fetching(_) => "fetching",
            Self::LoggingOut(_) => "logging out",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
