/// Logged-in identity and bearer token
///
/// At most one session exists. It is read from storage once at startup,
/// written on a successful login and cleared on logout. There is no
/// refresh and no expiry check.
use serde::{Deserialize, Serialize};

use super::storage::Storage;
use crate::api::LoginResponse;
use crate::error::{ApiError, AppError, StorageError};

/// Entry holding `{"email": ...}` as JSON
const USER_KEY: &str = "user";
/// Entry holding the raw bearer token
const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    email: String,
}

/// Result of a login attempt that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted(Session),
    Rejected,
}

/// Owner of the session; handed explicitly to whatever needs the user
#[derive(Debug)]
pub struct SessionStore {
    storage: Storage,
    current: Option<Session>,
}

impl SessionStore {
    /// Read the persisted session, if any
    pub fn open(storage: Storage) -> Result<Self, StorageError> {
        let current = restore(&storage)?;

        match &current {
            Some(session) => tracing::info!(email = %session.email, "session restored"),
            None => tracing::info!("no stored session"),
        }

        Ok(Self { storage, current })
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Apply the answer of `POST /api/login`.
    ///
    /// Non-2xx statuses and `success:false` are rejections and leave stored
    /// state alone. Transport and decode failures are errors.
    pub fn finish_login(
        &mut self,
        result: Result<LoginResponse, ApiError>,
    ) -> Result<LoginOutcome, AppError> {
        let response = match result {
            Ok(response) => response,
            Err(ApiError::Status { status, .. }) => {
                tracing::info!(status, "login rejected by server");
                return Ok(LoginOutcome::Rejected);
            }
            Err(err) => return Err(err.into()),
        };

        let (email, token) = match response {
            LoginResponse {
                success: true,
                email: Some(email),
                token: Some(token),
            } => (email, token),
            _ => {
                tracing::info!("login rejected");
                return Ok(LoginOutcome::Rejected);
            }
        };

        let user = serde_json::to_string(&StoredUser {
            email: email.clone(),
        })
        .map_err(StorageError::from)?;
        self.storage
            .set_many(&[(USER_KEY, user.as_str()), (TOKEN_KEY, token.as_str())])?;

        let session = Session { email, token };
        tracing::info!(email = %session.email, "logged in");
        self.current = Some(session.clone());

        Ok(LoginOutcome::Accepted(session))
    }

    /// Forget the session in memory and on disk
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.storage.remove(USER_KEY)?;
        self.storage.remove(TOKEN_KEY)?;

        if let Some(session) = self.current.take() {
            tracing::info!(email = %session.email, "logged out");
        }
        Ok(())
    }
}

/// Both entries must be present. A user entry that does not parse is
/// deleted and treated as no session.
fn restore(storage: &Storage) -> Result<Option<Session>, StorageError> {
    let (Some(user), Some(token)) = (storage.get(USER_KEY)?, storage.get(TOKEN_KEY)?) else {
        return Ok(None);
    };

    match serde_json::from_str::<StoredUser>(&user) {
        Ok(user) => Ok(Some(Session {
            email: user.email,
            token,
        })),
        Err(err) => {
            tracing::debug!(error = %err, "discarding corrupt user entry");
            storage.remove(USER_KEY)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, Credentials};
    use std::path::Path;

    fn accepted(email: &str, token: &str) -> LoginResponse {
        LoginResponse {
            success: true,
            email: Some(email.into()),
            token: Some(token.into()),
        }
    }

    fn reopen(path: &Path) -> SessionStore {
        SessionStore::open(Storage::open(path).unwrap()).unwrap()
    }

    #[test]
    fn test_login_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        let mut store = reopen(&path);
        assert!(store.current().is_none());

        let outcome = store.finish_login(Ok(accepted("a@b.com", "T"))).unwrap();
        assert_eq!(
            outcome,
            LoginOutcome::Accepted(Session {
                email: "a@b.com".into(),
                token: "T".into()
            })
        );
        drop(store);

        let store = reopen(&path);
        let session = store.current().unwrap();
        assert_eq!(session.email, "a@b.com");
        assert_eq!(session.token, "T");
    }

    #[test]
    fn test_failed_login_keeps_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        let mut store = reopen(&path);
        store.finish_login(Ok(accepted("old@yard.kr", "OLD"))).unwrap();

        let rejected = LoginResponse {
            success: false,
            email: None,
            token: None,
        };
        assert_eq!(store.finish_login(Ok(rejected)).unwrap(), LoginOutcome::Rejected);
        drop(store);

        let store = reopen(&path);
        assert_eq!(store.current().unwrap().email, "old@yard.kr");
    }

    #[test]
    fn test_failed_login_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        let mut store = reopen(&path);
        let outcome = store
            .finish_login(Err(ApiError::Status {
                method: "POST",
                url: "http://localhost/api/login".into(),
                status: 401,
            }))
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected);

        // success without a token is not a usable session either
        let outcome = store
            .finish_login(Ok(LoginResponse {
                success: true,
                email: Some("a@b.com".into()),
                token: None,
            }))
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected);
        drop(store);

        assert!(reopen(&path).current().is_none());
    }

    #[test]
    fn test_transport_failure_is_an_error() {
        let mut store = SessionStore::open(Storage::in_memory().unwrap()).unwrap();
        let result = store.finish_login(Err(ApiError::Transport {
            url: "http://localhost/api/login".into(),
            message: "connection refused".into(),
        }));

        assert!(matches!(result, Err(AppError::Api(_))));
        assert!(store.current().is_none());
    }

    #[test]
    fn test_logout_clears_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        let mut store = reopen(&path);
        store.finish_login(Ok(accepted("a@b.com", "T"))).unwrap();
        store.logout().unwrap();
        assert!(store.current().is_none());
        drop(store);

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_user_entry_is_discarded() {
        let storage = Storage::in_memory().unwrap();
        storage.set(USER_KEY, "{not json").unwrap();
        storage.set(TOKEN_KEY, "T").unwrap();

        let store = SessionStore::open(storage).unwrap();

        assert!(store.current().is_none());
        assert_eq!(store.storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_token_without_user_is_logged_out() {
        let storage = Storage::in_memory().unwrap();
        storage.set(TOKEN_KEY, "T").unwrap();

        let store = SessionStore::open(storage).unwrap();
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_login_against_server() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/login")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"email":"a@b.com","token":"T"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");
        let api = ApiClient::new(&server.url()).unwrap();

        let mut store = reopen(&path);
        let response = api
            .login(&Credentials {
                email: "a@b.com".into(),
                password: "secret".into(),
            })
            .await;
        store.finish_login(response).unwrap();
        drop(store);

        assert_eq!(reopen(&path).current().unwrap().email, "a@b.com");
    }
}
