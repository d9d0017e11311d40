//! Auth subsystem client: magic-link sign-in, session establishment and an
//! auth-state subscription.
//!
//! Sign-in is passwordless. `send_magic_link` only asks the identity
//! service to email a one-time URL; the session becomes authenticated
//! later, when the token from that URL comes back through
//! [`AuthClient::establish_session`]. No polling happens in between.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, Weak};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;

/// Authenticated identity as served by the auth endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Auth-state change delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

#[derive(Debug, Clone)]
struct Session {
    access_token: String,
    user: User,
}

type Listener = Box<dyn Fn(&AuthEvent) + Send + Sync>;

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: HashMap<u64, Listener>,
}

/// Handle returned by [`AuthClient::subscribe`]. Dropping it detaches the
/// listener, so holding the handle is what keeps the subscription alive.
pub struct AuthSubscription {
    id: u64,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl AuthSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().unwrap().listeners.remove(&self.id);
        }
    }
}

pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session: RwLock<Option<Session>>,
    registry: Arc<Mutex<ListenerRegistry>>,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            session: RwLock::new(None),
            registry: Arc::new(Mutex::new(ListenerRegistry::default())),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// Emails a one-time sign-in link to `email`.
    pub async fn send_magic_link(&self, email: &str) -> Result<(), StoreError> {
        let response = self
            .http
            .post(self.auth_url("otp"))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "create_user": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::from_response(response).await);
        }

        Ok(())
    }

    /// Completes the magic-link flow: validates the token the user brought
    /// back and switches the session to authenticated.
    pub async fn establish_session(&self, access_token: &str) -> Result<User, StoreError> {
        let response = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::from_response(response).await);
        }

        let user: User = response.json().await?;

        *self.session.write().unwrap() = Some(Session {
            access_token: access_token.to_string(),
            user: user.clone(),
        });
        self.emit(&AuthEvent::SignedIn(user.clone()));

        Ok(user)
    }

    /// Signs out locally and best-effort revokes the token upstream. The
    /// local session is already gone even when the revoke fails.
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        let Some(session) = self.session.write().unwrap().take() else {
            return Ok(());
        };
        self.emit(&AuthEvent::SignedOut);

        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => Ok(()),
            Ok(r) => {
                let err = StoreError::from_response(r).await;
                warn!("token revoke failed: {err}");
                Err(err)
            }
            Err(e) => {
                warn!("token revoke failed: {e}");
                Err(StoreError::Transport(e))
            }
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.read().unwrap().as_ref().map(|s| s.user.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Registers `listener` for auth-state changes. The returned handle
    /// unsubscribes on drop.
    pub fn subscribe(&self, listener: impl Fn(&AuthEvent) + Send + Sync + 'static) -> AuthSubscription {
        let mut registry = self.registry.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, Box::new(listener));

        AuthSubscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    fn emit(&self, event: &AuthEvent) {
        for listener in self.registry.lock().unwrap().listeners.values() {
            listener(event);
        }
    }
}
