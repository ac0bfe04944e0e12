//! Connection session state and identity.

use std::fmt;

/// State of a connection session.
///
/// ```text
/// Idle -> Connecting -> Open -> Closing -> Closed
///            |           |                   ^
///            +-----------+-------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl SessionState {
    /// Connecting or Open: the socket may still deliver a connection fault
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }

    /// Closed is terminal; a closed session ignores further socket callbacks
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Generation tag of a connection session.
///
/// Incremented on every join. Transport events carry the id of the
/// session that produced them so late callbacks from a superseded session
/// can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id of the session that supersedes this one
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
