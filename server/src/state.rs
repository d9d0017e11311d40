use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use store::{AuthClient, Place, PlacesClient};

use crate::{config::Config, error::AppError, form::SubmissionForm, session::SessionController};

pub struct AppState {
    pub config: Config,
    pub places_client: PlacesClient,
    pub places: RwLock<Vec<Place>>,
    pub session: SessionController,
    pub form: Mutex<SubmissionForm>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let http = reqwest::Client::new();
        let places_client = PlacesClient::new(http.clone(), &config.store_url, &config.store_anon_key);
        let auth = Arc::new(AuthClient::new(http, &config.store_url, &config.store_anon_key));
        let session = SessionController::new(auth);

        let places = match places_client.fetch_places().await {
            Ok(places) => places,
            Err(e) => {
                warn!("initial place fetch failed, starting empty: {e}");
                Vec::new()
            }
        };

        Arc::new(Self {
            config,
            places_client,
            places: RwLock::new(places),
            session,
            form: Mutex::new(SubmissionForm::default()),
        })
    }

    /// Re-pulls the place set from the store. On failure the previous set
    /// is kept untouched.
    pub async fn refresh_places(&self) -> Result<usize, AppError> {
        let fresh = self
            .places_client
            .fetch_places()
            .await
            .map_err(AppError::Repository)?;

        let total = fresh.len();
        *self.places.write().await = fresh;

        Ok(total)
    }
}
