//! Session state mirrored from auth events.

use std::sync::{Arc, RwLock};

use store::{AuthClient, AuthEvent, AuthSubscription, User};

use crate::error::AppError;

/// Holds the current identity snapshot, kept in sync by an auth-state
/// subscription for the controller's lifetime. Dropping the controller
/// releases the subscription.
pub struct SessionController {
    auth: Arc<AuthClient>,
    user: Arc<RwLock<Option<User>>>,
    _subscription: AuthSubscription,
}

impl SessionController {
    pub fn new(auth: Arc<AuthClient>) -> Self {
        let user = Arc::new(RwLock::new(auth.current_user()));
        let snapshot = user.clone();
        let subscription = auth.subscribe(move |event| {
            *snapshot.write().unwrap() = match event {
                AuthEvent::SignedIn(user) => Some(user.clone()),
                AuthEvent::SignedOut => None,
            };
        });

        Self {
            auth,
            user,
            _subscription: subscription,
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().unwrap().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.read().unwrap().is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.auth.access_token()
    }

    /// Magic-link sign-in. An empty address is a no-op: nothing is sent
    /// and no error is raised.
    pub async fn sign_in(&self, email: &str) -> Result<(), AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(());
        }

        self.auth.send_magic_link(email).await.map_err(AppError::Auth)
    }

    /// Called when the user returns with the access token from the emailed
    /// link; this is where the session actually becomes authenticated.
    pub async fn establish(&self, access_token: &str) -> Result<User, AppError> {
        self.auth
            .establish_session(access_token)
            .await
            .map_err(AppError::Auth)
    }

    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.auth.sign_out().await.map_err(AppError::Auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SessionController {
        let auth = Arc::new(AuthClient::new(
            reqwest::Client::new(),
            "http://localhost",
            "anon",
        ));
        SessionController::new(auth)
    }

    #[test]
    fn starts_without_a_session() {
        let session = controller();

        assert!(!session.is_signed_in());
        assert_eq!(session.current_user(), None);
    }

    #[tokio::test]
    async fn empty_email_sign_in_is_a_silent_no_op() {
        let session = controller();

        assert!(session.sign_in("").await.is_ok());
        assert!(session.sign_in("   ").await.is_ok());
    }
}
