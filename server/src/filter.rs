//! In-memory category filtering over the fetched place set.

use store::Place;

/// Sentinel that selects every category.
pub const ALL_CATEGORIES: &str = "all";

pub fn filter_by_category<'a>(places: &'a [Place], selected: &str) -> Vec<&'a Place> {
    if selected == ALL_CATEGORIES {
        return places.iter().collect();
    }

    places.iter().filter(|p| p.category == selected).collect()
}

/// Distinct non-empty category labels, in first-occurrence order.
pub fn categories(places: &[Place]) -> Vec<String> {
    let mut seen = Vec::new();
    for place in places {
        if !place.category.is_empty() && !seen.contains(&place.category) {
            seen.push(place.category.clone());
        }
    }

    seen
}
