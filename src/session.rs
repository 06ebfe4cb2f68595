use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Active(Credentials),
    SignedOut,
}

/// The signed-in user's bearer credentials. One instance is shared
/// by every request made on behalf of the user; only the refresh flow in
/// [crate::api::ApiClient] mutates it.
pub struct Session {
    state: watch::Sender<SessionState>,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        let (state, _) = watch::channel(SessionState::Active(credentials));
        Self { state }
    }

    pub fn access_token(&self) -> Option<String> {
        match &*self.state.borrow() {
            SessionState::Active(c) => Some(c.access_token.clone()),
            SessionState::SignedOut => None,
        }
    }

    pub fn refresh_token(&self) -> Option<String> {
        match &*self.state.borrow() {
            SessionState::Active(c) => c.refresh_token.clone(),
            SessionState::SignedOut => None,
        }
    }

    pub(crate) fn apply_refreshed(&self, access_token: String, refresh_token: Option<String>) {
        self.state.send_if_modified(|state| match state {
            SessionState::Active(c) => {
                c.access_token = access_token;
                if let Some(refresh_token) = refresh_token {
                    c.refresh_token = Some(refresh_token);
                }
                true
            }
            SessionState::SignedOut => false,
        });
    }

    pub(crate) fn sign_out(&self) {
        self.state.send_if_modified(|state| {
            if *state == SessionState::SignedOut {
                return false;
            }

            log::warn!("Session credentials rejected, signing out");
            *state = SessionState::SignedOut;
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}
