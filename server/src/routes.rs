use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use store::{Place, User, places::STATUS_PENDING};

use crate::{
    error::AppError,
    filter::{self, ALL_CATEGORIES},
    form::{CATEGORY_OPTIONS, SubmissionFields},
    markers::{self, MAP_CENTER, MAP_ZOOM, Marker, TILE_ATTRIBUTION, TILE_URL},
    state::AppState,
};

#[derive(Deserialize)]
pub struct CategoryQuery {
    category: Option<String>,
}

#[derive(Serialize)]
pub struct PlacesResponse {
    total: usize,
    categories: Vec<String>,
    options: Vec<&'static str>,
    places: Vec<Place>,
}

/// Sidebar feed: the filtered list plus the menus derived from the full
/// set.
pub async fn places_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> Json<PlacesResponse> {
    let places = state.places.read().await;
    let selected = query.category.as_deref().unwrap_or(ALL_CATEGORIES);
    let filtered: Vec<Place> = filter::filter_by_category(&places, selected)
        .into_iter()
        .cloned()
        .collect();

    Json(PlacesResponse {
        total: places.len(),
        categories: filter::categories(&places),
        options: CATEGORY_OPTIONS.to_vec(),
        places: filtered,
    })
}

#[derive(Serialize)]
pub struct MapView {
    center: [f64; 2],
    zoom: u8,
    tile_url: &'static str,
    attribution: &'static str,
    markers: Vec<Marker>,
}

/// Map widget feed: one marker per filtered place plus the viewport
/// defaults.
pub async fn markers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> Json<MapView> {
    let places = state.places.read().await;
    let selected = query.category.as_deref().unwrap_or(ALL_CATEGORIES);
    let markers = markers::markers(filter::filter_by_category(&places, selected));

    Json(MapView {
        center: MAP_CENTER,
        zoom: MAP_ZOOM,
        tile_url: TILE_URL,
        attribution: TILE_ATTRIBUTION,
        markers,
    })
}

#[derive(Serialize)]
pub struct RefreshResponse {
    total: usize,
}

pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, AppError> {
    let total = state
        .refresh_places()
        .await
        .inspect_err(|e| error!("refresh failed: {e}"))?;

    Ok(Json(RefreshResponse { total }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    sent: bool,
}

/// Requests a magic link. `sent` is false when the email was empty and
/// nothing went out.
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    state.session.sign_in(&payload.email).await?;

    Ok(Json(LoginResponse {
        sent: !payload.email.trim().is_empty(),
    }))
}

#[derive(Deserialize)]
pub struct SessionRequest {
    access_token: String,
}

/// Completes the magic-link flow with the token the user brought back from
/// their inbox.
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<User>, AppError> {
    let user = state.session.establish(&payload.access_token).await?;
    info!("signed in as {}", user.id);

    Ok(Json(user))
}

pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    state.session.sign_out().await?;
    info!("signed out");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_handler(State(state): State<Arc<AppState>>) -> Json<Option<User>> {
    Json(state.session.current_user())
}

#[derive(Serialize)]
pub struct SubmitResponse {
    status: &'static str,
}

/// Runs the form through its submit transition: validate, insert with null
/// coordinates, then refetch. The new row will not render until the
/// geocoding job has resolved its address.
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<SubmissionFields>,
) -> Result<Json<SubmitResponse>, AppError> {
    let user = state.session.current_user();
    let token = state.session.access_token();

    let submission = {
        let mut form = state.form.lock().await;
        form.open();
        form.fill(fields);
        form.begin_submit(user.is_some())?
    };

    let (Some(user), Some(token)) = (user, token) else {
        return Err(AppError::Validation("sign in before submitting".to_string()));
    };

    let result = state
        .places_client
        .insert_place(&submission, &user.id, &token)
        .await;
    state.form.lock().await.complete(result.is_ok());
    result
        .inspect_err(|e| error!("submission failed: {e}"))
        .map_err(AppError::Repository)?;

    if let Err(e) = state.refresh_places().await {
        warn!("refetch after submission failed: {e}");
    }

    Ok(Json(SubmitResponse {
        status: STATUS_PENDING,
    }))
}
