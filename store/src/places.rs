//! Repository adapter over the `pet_places` relation.
//!
//! Rows arrive with whatever the external geocoding job has resolved so
//! far. Anything without usable coordinates is dropped at this boundary so
//! the rest of the app only ever sees renderable places.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::StoreError;

pub const PLACES_TABLE: &str = "pet_places";

/// Status written on freshly submitted rows; the geocoding job flips it
/// once coordinates are filled in.
pub const STATUS_PENDING: &str = "pending";

/// A venue with resolved coordinates, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub category: String,
    pub address: String,
}

/// Raw row shape as served by the store. Coordinates stay null until the
/// geocoding job has processed the row.
#[derive(Debug, Deserialize)]
pub struct PlaceRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub address: String,
}

impl PlaceRow {
    /// A row is renderable only with both coordinates present and non-zero.
    /// Zero counts as unresolved, which also rules out a literal (0, 0).
    pub fn into_place(self) -> Option<Place> {
        let lat = self.lat.filter(|v| *v != 0.0)?;
        let lng = self.lng.filter(|v| *v != 0.0)?;

        Some(Place {
            id: self.id,
            name: self.name,
            lat,
            lng,
            category: self.category,
            address: self.address,
        })
    }
}

/// The store serves numeric ids for serial columns and strings for uuid
/// ones; both normalize to an opaque string.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Num(i64),
        Str(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Num(n) => n.to_string(),
        Id::Str(s) => s,
    })
}

/// A validated submission, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlace {
    pub name: String,
    pub category: String,
    pub address: String,
}

#[derive(Serialize)]
struct InsertRow<'a> {
    name: &'a str,
    category: &'a str,
    address: &'a str,
    lat: Option<f64>,
    lng: Option<f64>,
    user_id: &'a str,
    status: &'a str,
}

impl<'a> InsertRow<'a> {
    fn new(submission: &'a NewPlace, user_id: &'a str) -> Self {
        Self {
            name: &submission.name,
            category: &submission.category,
            address: &submission.address,
            lat: None,
            lng: None,
            user_id,
            status: STATUS_PENDING,
        }
    }
}

pub struct PlacesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{PLACES_TABLE}", self.base_url)
    }

    /// Fetches every row and keeps the renderable ones.
    pub async fn fetch_places(&self) -> Result<Vec<Place>, StoreError> {
        let response = self
            .http
            .get(self.table_url())
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::from_response(response).await);
        }

        let rows: Vec<PlaceRow> = response.json().await?;
        let total = rows.len();
        let places: Vec<Place> = rows.into_iter().filter_map(PlaceRow::into_place).collect();

        debug!("fetched {total} rows, {} renderable", places.len());
        Ok(places)
    }

    /// Inserts a submission with coordinates left null for the geocoding
    /// job to resolve. Writes run as the signed-in user, not the anon key.
    pub async fn insert_place(
        &self,
        submission: &NewPlace,
        user_id: &str,
        access_token: &str,
    ) -> Result<(), StoreError> {
        let response = self
            .http
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .header("Prefer", "return=minimal")
            .json(&InsertRow::new(submission, user_id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::from_response(response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, lat: Option<f64>, lng: Option<f64>, category: &str) -> PlaceRow {
        PlaceRow {
            id: id.to_string(),
            name: format!("place {id}"),
            lat,
            lng,
            category: category.to_string(),
            address: "台北市".to_string(),
        }
    }

    #[test]
    fn keeps_rows_with_resolved_coordinates() {
        let place = row("1", Some(25.03), Some(121.56), "餐廳").into_place().unwrap();

        assert_eq!(place.lat, 25.03);
        assert_eq!(place.lng, 121.56);
        assert_eq!(place.category, "餐廳");
    }

    #[test]
    fn drops_rows_pending_geocoding() {
        assert!(row("1", None, None, "餐廳").into_place().is_none());
        assert!(row("2", Some(25.03), None, "餐廳").into_place().is_none());
        assert!(row("3", None, Some(121.56), "餐廳").into_place().is_none());
    }

    #[test]
    fn drops_zeroed_coordinates() {
        assert!(row("1", Some(0.0), Some(0.0), "cafe").into_place().is_none());
        assert!(row("2", Some(0.0), Some(121.56), "cafe").into_place().is_none());
        assert!(row("3", Some(25.03), Some(0.0), "cafe").into_place().is_none());
    }

    #[test]
    fn accepts_numeric_and_string_ids_and_extra_columns() {
        let rows: Vec<PlaceRow> = serde_json::from_str(
            r#"[
                {"id": 7, "name": "a", "lat": 1.0, "lng": 2.0, "category": "cafe",
                 "address": "", "created_at": "2025-11-14T00:00:00Z", "status": "done"},
                {"id": "b2f9", "name": "b", "lat": 1.0, "lng": 2.0, "category": "cafe",
                 "address": ""}
            ]"#,
        )
        .unwrap();

        assert_eq!(rows[0].id, "7");
        assert_eq!(rows[1].id, "b2f9");
    }

    #[test]
    fn renderable_set_keeps_only_resolved_rows() {
        let rows: Vec<PlaceRow> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "a", "lat": 25.03, "lng": 121.56, "category": "餐廳", "address": ""},
                {"id": 2, "name": "b", "lat": 0, "lng": 0, "category": "cafe", "address": ""}
            ]"#,
        )
        .unwrap();

        let places: Vec<Place> = rows.into_iter().filter_map(PlaceRow::into_place).collect();

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "1");
        assert_eq!(places[0].category, "餐廳");
    }

    #[test]
    fn insert_row_leaves_coordinates_for_the_geocoder() {
        let submission = NewPlace {
            name: "路易莎咖啡".to_string(),
            category: "咖啡廳".to_string(),
            address: "台北市".to_string(),
        };

        let value = serde_json::to_value(InsertRow::new(&submission, "user-1")).unwrap();

        assert_eq!(value["lat"], serde_json::Value::Null);
        assert_eq!(value["lng"], serde_json::Value::Null);
        assert_eq!(value["status"], "pending");
        assert_eq!(value["user_id"], "user-1");
        assert_eq!(value["name"], "路易莎咖啡");
    }
}
