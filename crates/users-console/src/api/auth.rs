use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::IdentityConfig;
use crate::storage::LocalStorage;

/// Local storage key holding the persisted session.
pub const SESSION_KEY: &str = "authSession";
/// Local storage key mirroring the signed-in identity for other readers.
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Sign-in rejected: {0}")]
    Rejected(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Session storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id_token: String,
    pub refresh_token: String,
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Session {
    pub fn identity(&self) -> AuthIdentity {
        AuthIdentity {
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            uid: self.uid.clone(),
        }
    }
}

/// Minimal identity published on sign-in and mirrored into local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthIdentity {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub uid: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct IdentityErrorBody {
    error: IdentityErrorDetail,
}

#[derive(Deserialize)]
struct IdentityErrorDetail {
    message: String,
}

/// JWT payload claims we need for expiry checking
#[derive(Deserialize)]
struct JwtClaims {
    exp: i64,
}

/// Decode JWT payload and extract expiration time
pub fn decode_token_exp(token: &str) -> Option<i64> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let claims: JwtClaims = serde_json::from_slice(&payload).ok()?;

    Some(claims.exp)
}

/// Email/password client for the identity provider.
///
/// The session is persisted in [`LocalStorage`] and sign-in state changes are
/// published on a watch channel.
pub struct AuthClient {
    http: Client,
    config: IdentityConfig,
    storage: Arc<LocalStorage>,
    session: Option<Session>,
    state: watch::Sender<Option<AuthIdentity>>,
}

impl AuthClient {
    pub fn new(config: IdentityConfig, storage: Arc<LocalStorage>) -> Self {
        tracing::info!(
            "Initializing identity client for {} ({})",
            config.project_id,
            config.auth_domain
        );
        let (state, _) = watch::channel(None);

        Self {
            http: Client::new(),
            config,
            storage,
            session: None,
            state,
        }
    }

    /// Load a persisted session, returning whether one was found.
    pub fn restore(&mut self) -> Result<bool, AuthError> {
        let Some(raw) = self.storage.get_item(SESSION_KEY) else {
            return Ok(false);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                self.set_session(Some(session))?;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable session: {}", e);
                self.set_session(None)?;
                Ok(false)
            }
        }
    }

    /// Receive sign-in/sign-out notifications. The current state is marked seen.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthIdentity>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Option<AuthIdentity> {
        self.session.as_ref().map(Session::identity)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<AuthIdentity, AuthError> {
        let url = format!(
            "{}/v1/accounts:signInWithPassword?key={}",
            self.config.identity_endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.config.api_key)
        );

        let response = self
            .http
            .post(&url)
            .header("X-Firebase-gmpid", &self.config.app_id)
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: SignInResponse = response.json().await?;
        let session = Session {
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            uid: body.local_id,
            email: body.email,
            display_name: body.display_name,
        };
        let identity = session.identity();

        self.set_session(Some(session))?;
        Ok(identity)
    }

    pub fn sign_out(&mut self) -> Result<(), AuthError> {
        self.set_session(None)
    }

    /// Current id token, refreshed first when it expires within 60 seconds.
    /// `None` when signed out.
    pub async fn id_token(&mut self) -> Result<Option<String>, AuthError> {
        let Some(session) = &self.session else {
            return Ok(None);
        };

        let expiring = decode_token_exp(&session.id_token)
            .map(|exp| exp < chrono::Utc::now().timestamp() + 60)
            .unwrap_or(false);

        if expiring {
            self.refresh().await?;
        }

        Ok(self.session.as_ref().map(|s| s.id_token.clone()))
    }

    async fn refresh(&mut self) -> Result<(), AuthError> {
        let Some(mut session) = self.session.clone() else {
            return Ok(());
        };

        let url = format!(
            "{}/v1/token?key={}",
            self.config.secure_token_endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.config.api_key)
        );

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", session.refresh_token.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            tracing::warn!("Token refresh failed, signing out: {}", err);
            self.set_session(None)?;
            return Err(err);
        }

        let body: RefreshResponse = response.json().await?;
        session.id_token = body.id_token;
        session.refresh_token = body.refresh_token;

        self.set_session(Some(session))
    }

    fn set_session(&mut self, session: Option<Session>) -> Result<(), AuthError> {
        match &session {
            Some(session) => {
                let raw = serde_json::to_string(session).map_err(anyhow::Error::from)?;
                self.storage.set_item(SESSION_KEY, &raw)?;
            }
            None => self.storage.remove_item(SESSION_KEY)?,
        }

        let identity = session.as_ref().map(Session::identity);
        self.session = session;
        self.state.send_if_modified(|current| {
            if *current == identity {
                false
            } else {
                *current = identity;
                true
            }
        });

        Ok(())
    }
}

async fn rejection(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<IdentityErrorBody>(&text) {
        Ok(body) => AuthError::Rejected(body.error.message),
        Err(_) => AuthError::Rejected(format!("{}: {}", status, text)),
    }
}

/// Write the identity under [`USER_KEY`] on sign-in and remove it on sign-out.
pub fn mirror_identity(storage: &LocalStorage, identity: Option<&AuthIdentity>) -> anyhow::Result<()> {
    match identity {
        Some(identity) => {
            tracing::info!(
                "User is signed in: {}",
                identity.email.as_deref().unwrap_or(&identity.uid)
            );
            storage.set_item(USER_KEY, &serde_json::to_string(identity)?)
        }
        None => {
            tracing::info!("User is signed out");
            storage.remove_item(USER_KEY)
        }
    }
}

/// Keep [`USER_KEY`] in step with every published auth state until the
/// sender goes away.
pub fn spawn_identity_mirror(
    mut rx: watch::Receiver<Option<AuthIdentity>>,
    storage: Arc<LocalStorage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let identity = rx.borrow_and_update().clone();
            if let Err(e) = mirror_identity(&storage, identity.as_ref()) {
                tracing::error!("Auth state change error: {:?}", e);
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
