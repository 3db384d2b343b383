use std::fmt;

/// External provider a credential session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Registry,
    Cloud,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Registry => "registry",
            Self::Cloud => "cloud",
        };
        f.write_str(s)
    }
}

/// Short-lived authenticated handle to a provider.
///
/// Opaque on purpose: the account identity is available to the provider that
/// issued the session (it needs it to revoke), but `Debug` shows only the
/// provider so handles can never leak identities into logs.
pub struct Session {
    provider: Provider,
    account: Option<String>,
}

impl Session {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            account: None,
        }
    }

    pub fn with_account(provider: Provider, account: impl Into<String>) -> Self {
        Self {
            provider,
            account: Some(account.into()),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// Sessions acquired during one pipeline run.
///
/// The sequencer drains this at end of run and hands each session back to
/// its provider for release, on every exit path.
#[derive(Debug, Default)]
pub struct CredentialSet {
    sessions: Vec<Session>,
}

impl CredentialSet {
    pub fn insert(&mut self, session: Session) {
        self.sessions.push(session);
    }

    pub fn has(&self, provider: Provider) -> bool {
        self.sessions.iter().any(|s| s.provider() == provider)
    }

    pub fn drain(&mut self) -> Vec<Session> {
        std::mem::take(&mut self.sessions)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
