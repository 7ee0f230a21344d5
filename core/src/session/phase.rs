use crate::detection::RequestToken;
use std::fmt;

/// Phase a session falls back to once no request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Markers mirror the latest detection response.
    Reconciled,
    /// Markers were edited by hand since the latest response.
    UserEdited,
}

/// Lifecycle of an overlay session.
///
/// `Detecting` carries the only token whose response may still be applied,
/// plus the phase to return to should that request fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Detecting {
        token: RequestToken,
        settled: Settled,
    },
    Reconciled,
    UserEdited,
}

impl SessionPhase {
    pub fn in_flight(&self) -> Option<RequestToken> {
        match self {
            SessionPhase::Detecting { token, .. } => Some(*token),
            _ => None,
        }
    }

    pub fn is_detecting(&self) -> bool {
        self.in_flight().is_some()
    }

    /// Phase after a manual edit.
    pub(crate) fn edited(self) -> Self {
        match self {
            SessionPhase::Detecting { token, .. } => SessionPhase::Detecting {
                token,
                settled: Settled::UserEdited,
            },
            _ => SessionPhase::UserEdited,
        }
    }

    /// Phase to fall back to when a request is started from here.
    pub(crate) fn settled(self) -> Settled {
        match self {
            SessionPhase::Detecting { settled, .. } => settled,
            SessionPhase::UserEdited => Settled::UserEdited,
            SessionPhase::Idle | SessionPhase::Reconciled => Settled::Reconciled,
        }
    }
}

impl From<Settled> for SessionPhase {
    fn from(settled: Settled) -> Self {
        match settled {
            Settled::Reconciled => SessionPhase::Reconciled,
            Settled::UserEdited => SessionPhase::UserEdited,
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Detecting { token, .. } => write!(f, "detecting {token}"),
            SessionPhase::Reconciled => write!(f, "reconciled"),
            SessionPhase::UserEdited => write!(f, "user edited"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_while_detecting_keeps_the_token() {
        let phase = SessionPhase::Detecting {
            token: RequestToken(4),
            settled: Settled::Reconciled,
        }
        .edited();
        assert_eq!(phase.in_flight(), Some(RequestToken(4)));
        assert_eq!(phase.settled(), Settled::UserEdited);
    }

    #[test]
    fn editing_a_settled_session_marks_it_user_edited() {
        assert_eq!(SessionPhase::Reconciled.edited(), SessionPhase::UserEdited);
        assert_eq!(SessionPhase::UserEdited.settled(), Settled::UserEdited);
    }
}
