use word_api::auth::{
    AuthPayload, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile,
};

use crate::api::WordApi;
use crate::error::{ApiError, AuthError, FormError};
use crate::store::{AUTH_TOKEN_KEY, KeyValueStore, USER_KEY};

/// Bearer token and profile of the signed-in user, mirrored to local storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSession {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl AuthSession {
    pub fn load(store: &impl KeyValueStore) -> Self {
        let token = store.get(AUTH_TOKEN_KEY).filter(|t| !t.trim().is_empty());
        let user = token.as_ref().and_then(|_| store.load_json(USER_KEY));
        Self { token, user }
    }

    fn from_payload(store: &impl KeyValueStore, payload: AuthPayload) -> Self {
        let session = Self {
            token: Some(payload.token),
            user: Some(payload.user),
        };
        session.persist(store);
        session
    }

    pub fn persist(&self, store: &impl KeyValueStore) {
        let result = match (&self.token, &self.user) {
            (Some(token), user) => store.set(AUTH_TOKEN_KEY, token).and_then(|_| match user {
                Some(user) => store.save_json(USER_KEY, user),
                None => store.remove(USER_KEY),
            }),
            (None, _) => store
                .remove(AUTH_TOKEN_KEY)
                .and_then(|_| store.remove(USER_KEY)),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn bearer(&self) -> Result<&str, ApiError> {
        self.token.as_deref().ok_or(ApiError::MissingToken)
    }

    /// Drops the session everywhere. Used for logout and for any 401.
    pub fn clear(store: &impl KeyValueStore) -> Self {
        let session = Self::default();
        session.persist(store);
        session
    }
}

/// Result of validating a rehydrated session against `/api/auth/me`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCheck {
    Anonymous,
    Valid(AuthSession),
    /// The server rejected the token; the session has been cleared.
    Expired,
    /// The server could not be asked; the stored session is kept.
    Unverified(AuthSession, ApiError),
}

pub async fn validate<A: WordApi>(
    api: &A,
    store: &impl KeyValueStore,
    session: AuthSession,
) -> SessionCheck {
    let Some(token) = session.token.clone() else {
        return SessionCheck::Anonymous;
    };
    match api.me(&token).await {
        Ok(user) => {
            let session = AuthSession {
                token: Some(token),
                user: Some(user),
            };
            session.persist(store);
            SessionCheck::Valid(session)
        }
        Err(e) if e.needs_login() => {
            tracing::info!("stored session rejected, logging out");
            AuthSession::clear(store);
            SessionCheck::Expired
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not validate session");
            SessionCheck::Unverified(session, e)
        }
    }
}

fn check_username(username: &str) -> Result<(), FormError> {
    let len = username.trim().chars().count();
    if (3..=50).contains(&len) {
        Ok(())
    } else {
        Err(FormError::Username)
    }
}

fn check_password(password: &str) -> Result<(), FormError> {
    let len = password.chars().count();
    if (6..=100).contains(&len) {
        Ok(())
    } else {
        Err(FormError::Password)
    }
}

fn check_email(email: &str) -> Result<(), FormError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') && email.len() <= 100 => {
            Ok(())
        }
        _ => Err(FormError::Email),
    }
}

pub async fn login<A: WordApi>(
    api: &A,
    store: &impl KeyValueStore,
    request: LoginRequest,
) -> Result<AuthSession, AuthError> {
    if request.username.trim().is_empty() {
        return Err(FormError::Required("Username").into());
    }
    if request.password.is_empty() {
        return Err(FormError::Required("Password").into());
    }
    let request = LoginRequest {
        username: request.username.trim().to_owned(),
        ..request
    };
    let payload = api.login(&request).await?;
    tracing::info!(username = %payload.user.username, "logged in");
    Ok(AuthSession::from_payload(store, payload))
}

pub async fn register<A: WordApi>(
    api: &A,
    store: &impl KeyValueStore,
    request: RegisterRequest,
    confirm_password: &str,
) -> Result<AuthSession, AuthError> {
    check_username(&request.username)?;
    check_email(&request.email)?;
    check_password(&request.password)?;
    if request.password != confirm_password {
        return Err(FormError::Mismatch.into());
    }
    let request = RegisterRequest {
        username: request.username.trim().to_owned(),
        email: request.email.trim().to_owned(),
        full_name: request.full_name.trim().to_owned(),
        ..request
    };
    let payload = api.register(&request).await?;
    tracing::info!(username = %payload.user.username, "registered");
    Ok(AuthSession::from_payload(store, payload))
}

pub async fn update_profile<A: WordApi>(
    api: &A,
    store: &impl KeyValueStore,
    session: &AuthSession,
    request: ProfileUpdate,
) -> Result<AuthSession, AuthError> {
    if !request.email.trim().is_empty() {
        check_email(&request.email)?;
    }
    let user = api.update_profile(session.bearer()?, &request).await?;
    let session = AuthSession {
        token: session.token.clone(),
        user: Some(user),
    };
    session.persist(store);
    Ok(session)
}

pub async fn change_password<A: WordApi>(
    api: &A,
    session: &AuthSession,
    request: ChangePasswordRequest,
    confirm_password: &str,
) -> Result<(), AuthError> {
    if request.current_password.is_empty() {
        return Err(FormError::Required("Current password").into());
    }
    check_password(&request.new_password)?;
    if request.new_password != confirm_password {
        return Err(FormError::Mismatch.into());
    }
    api.change_password(session.bearer()?, &request).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn session_round_trips_through_store() {
        let store = MemoryStore::new();
        let session = AuthSession {
            token: Some("t0k".into()),
            user: Some(UserProfile {
                id: "u1".into(),
                username: "amy".into(),
                ..Default::default()
            }),
        };
        session.persist(&store);
        assert_eq!(AuthSession::load(&store), session);

        AuthSession::clear(&store);
        assert_eq!(AuthSession::load(&store), AuthSession::default());
        assert!(!store.contains(USER_KEY));
    }

    #[test]
    fn user_without_token_is_ignored() {
        let store = MemoryStore::new();
        store
            .save_json(USER_KEY, &UserProfile::default())
            .unwrap();
        assert_eq!(AuthSession::load(&store), AuthSession::default());
    }

    #[test]
    fn bearer_requires_token() {
        assert_eq!(AuthSession::default().bearer(), Err(ApiError::MissingToken));
    }

    #[test]
    fn form_rules() {
        assert_eq!(check_username("ab"), Err(FormError::Username));
        assert!(check_username("amy").is_ok());
        assert_eq!(check_password("12345"), Err(FormError::Password));
        assert!(check_password("123456").is_ok());
        assert_eq!(check_email("amy.example.com"), Err(FormError::Email));
        assert_eq!(check_email("@example.com"), Err(FormError::Email));
        assert!(check_email("amy@example.com").is_ok());
    }
}
