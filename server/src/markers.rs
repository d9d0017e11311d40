//! Marker view-models for the map widget.
//!
//! One marker per renderable place, colored by category. The widget owns
//! panning and zooming; this side only supplies the defaults it starts
//! from. No deduplication or clustering happens here.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use store::Place;

pub const DEFAULT_COLOR: &str = "#888888";

/// Initial viewport, centered on Taipei.
pub const MAP_CENTER: [f64; 2] = [25.0330, 121.5654];
pub const MAP_ZOOM: u8 = 13;

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

static CATEGORY_COLORS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("餐廳", "#FF9800"),
        ("cafe", "#795548"),
        ("咖啡廳", "#795548"),
        ("寵物旅館", "#9C27B0"),
        ("寵物友善飯店", "#9C27B0"),
        ("寵物醫院", "#F44336"),
        ("寵物美容", "#E91E63"),
        ("狗狗公園", "#4CAF50"),
        ("室外空間", "#4CAF50"),
        ("文創園區", "#607D8B"),
    ])
});

pub fn category_color(category: &str) -> &'static str {
    CATEGORY_COLORS.get(category).copied().unwrap_or(DEFAULT_COLOR)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub name: String,
    pub category: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub category: String,
    pub color: &'static str,
    pub popup: Popup,
}

pub fn markers<'a>(places: impl IntoIterator<Item = &'a Place>) -> Vec<Marker> {
    places
        .into_iter()
        .map(|place| Marker {
            id: place.id.clone(),
            lat: place.lat,
            lng: place.lng,
            category: place.category.clone(),
            color: category_color(&place.category),
            popup: Popup {
                name: place.name.clone(),
                category: place.category.clone(),
                address: place.address.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use store::Place;

    use super::*;

    #[test]
    fn known_categories_get_their_color() {
        assert_eq!(category_color("餐廳"), "#FF9800");
        assert_eq!(category_color("cafe"), category_color("咖啡廳"));
    }

    #[test]
    fn unknown_categories_fall_back_to_gray() {
        assert_eq!(category_color("水族館"), DEFAULT_COLOR);
        assert_eq!(category_color(""), DEFAULT_COLOR);
    }

    #[test]
    fn one_marker_per_place_with_popup_content() {
        let place = Place {
            id: "1".to_string(),
            name: "路易莎咖啡".to_string(),
            lat: 25.03,
            lng: 121.56,
            category: "咖啡廳".to_string(),
            address: "台北市".to_string(),
        };

        let markers = markers([&place]);

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].color, "#795548");
        assert_eq!(markers[0].popup.name, "路易莎咖啡");
        assert_eq!(markers[0].popup.address, "台北市");
    }

    #[test]
    fn empty_input_renders_nothing() {
        let no_places: [&Place; 0] = [];

        assert!(markers(no_places).is_empty());
    }
}
