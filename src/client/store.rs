use std::sync::RwLock;

/// Where the client keeps its session, the way a browser keeps it in local storage.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn username(&self) -> Option<String>;

    /// Stores everything a successful login returns.
    fn save_login(&self, access_token: &str, refresh_token: &str, username: &str);

    /// Replaces only the access token, after a refresh.
    fn set_access_token(&self, access_token: &str);

    /// Forgets the whole session.
    fn clear(&self);
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    username: Option<String>,
}

/// Process-local `TokenStore`.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: RwLock<Session>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, pick: impl FnOnce(&Session) -> T) -> T {
        match self.session.read() {
            Ok(session) => pick(&session),
            Err(poisoned) => pick(&poisoned.into_inner()),
        }
    }

    fn write(&self, change: impl FnOnce(&mut Session)) {
        match self.session.write() {
            Ok(mut session) => change(&mut session),
            Err(poisoned) => change(&mut poisoned.into_inner()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.read(|session| session.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.read(|session| session.refresh_token.clone())
    }

    fn username(&self) -> Option<String> {
        self.read(|session| session.username.clone())
    }

    fn save_login(&self, access_token: &str, refresh_token: &str, username: &str) {
        self.write(|session| {
            session.access_token = Some(access_token.to_string());
            session.refresh_token = Some(refresh_token.to_string());
            session.username = Some(username.to_string());
        });
    }

    fn set_access_token(&self, access_token: &str) {
        self.write(|session| session.access_token = Some(access_token.to_string()));
    }

    fn clear(&self) {
        self.write(|session| *session = Session::default());
    }
}
