use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Position of a record inside the list it was fetched with.
///
/// Rows carry this back to the action handlers so a selection always
/// resolves to the record it was rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub usize);

pub trait Record {
    /// Text matched by the local search box.
    fn search_text(&self) -> &str;
    /// URL used by "open" and "copy".
    fn link(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Giveaway {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub platforms: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub worth: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub open_giveaway_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gamerpower_url: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub users: Option<String>,
}

impl Record for Giveaway {
    fn search_text(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    fn link(&self) -> Option<&str> {
        non_blank(self.open_giveaway_url.as_deref())
            .or_else(|| non_blank(self.gamerpower_url.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Deal {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, rename = "storeID", deserialize_with = "lenient_string")]
    pub store_id: Option<String>,
    #[serde(default, rename = "salePrice", deserialize_with = "lenient_string")]
    pub sale_price: Option<String>,
    #[serde(default, rename = "normalPrice", deserialize_with = "lenient_string")]
    pub normal_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub savings: Option<String>,
    #[serde(default, rename = "dealID", deserialize_with = "lenient_string")]
    pub deal_id: Option<String>,
    #[serde(default, rename = "dealRating", deserialize_with = "lenient_string")]
    pub deal_rating: Option<String>,
    #[serde(default, rename = "metacriticScore", deserialize_with = "lenient_string")]
    pub metacritic_score: Option<String>,
    #[serde(default, rename = "steamRatingText", deserialize_with = "lenient_string")]
    pub steam_rating_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thumb: Option<String>,
    /// Filled in by the CheapShark client from `deal_id`.
    #[serde(skip)]
    pub redirect_url: Option<String>,
}

impl Record for Deal {
    fn search_text(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    fn link(&self) -> Option<&str> {
        non_blank(self.redirect_url.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub title: Option<String>,
    pub source: String,
    pub link: Option<String>,
    pub summary: String,
}

impl Record for Article {
    fn search_text(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    fn link(&self) -> Option<&str> {
        non_blank(self.link.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreInfo {
    #[serde(default, rename = "storeID", deserialize_with = "lenient_string")]
    pub store_id: Option<String>,
    #[serde(rename = "storeName", default, deserialize_with = "lenient_string")]
    pub store_name: Option<String>,
}

/// CheapShark store id to display name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreMap {
    names: HashMap<String, String>,
}

impl StoreMap {
    pub fn from_stores(stores: Vec<StoreInfo>) -> Self {
        let names = stores
            .into_iter()
            .filter_map(|store| Some((store.store_id?, store.store_name?)))
            .collect();
        Self { names }
    }

    /// Display name for `id`, or the id itself when the map has no entry.
    pub fn name_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Accepts strings, numbers and booleans; anything else becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value))
}

/// Accepts a JSON array or a comma separated string.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
        Value::String(joined) => joined.split(',').map(|s| s.to_string()).collect(),
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn giveaway_platforms_accept_comma_string_and_array() {
        let from_string: Giveaway =
            serde_json::from_str(r#"{"title":"A","platforms":"PC, Steam,  "}"#).unwrap();
        assert_eq!(from_string.platforms, vec!["PC", "Steam"]);

        let from_array: Giveaway =
            serde_json::from_str(r#"{"title":"A","platforms":["PC","GOG"]}"#).unwrap();
        assert_eq!(from_array.platforms, vec!["PC", "GOG"]);
    }

    #[test]
    fn mistyped_fields_degrade_instead_of_failing() {
        let giveaway: Giveaway = serde_json::from_str(
            r#"{"id":123,"title":null,"worth":{"usd":1},"users":4500,"platforms":7}"#,
        )
        .unwrap();
        assert_eq!(giveaway.id.as_deref(), Some("123"));
        assert_eq!(giveaway.title, None);
        assert_eq!(giveaway.worth, None);
        assert_eq!(giveaway.users.as_deref(), Some("4500"));
        assert!(giveaway.platforms.is_empty());
    }

    #[test]
    fn giveaway_link_falls_back_to_gamerpower_page() {
        let giveaway = Giveaway {
            open_giveaway_url: Some("  ".into()),
            gamerpower_url: Some("https://www.gamerpower.com/x".into()),
            ..Giveaway::default()
        };
        assert_eq!(giveaway.link(), Some("https://www.gamerpower.com/x"));
    }

    #[test]
    fn deal_fields_use_cheapshark_names() {
        let deal: Deal = serde_json::from_str(
            r#"{"title":"Game","storeID":"1","salePrice":"4.99","normalPrice":"19.99",
                "savings":"75.037519","dealID":"abc","dealRating":"9.1","metacriticScore":"80"}"#,
        )
        .unwrap();
        assert_eq!(deal.store_id.as_deref(), Some("1"));
        assert_eq!(deal.sale_price.as_deref(), Some("4.99"));
        assert_eq!(deal.deal_id.as_deref(), Some("abc"));
        assert_eq!(deal.link(), None);
    }

    #[test]
    fn store_map_skips_entries_without_id() {
        let stores: Vec<StoreInfo> = serde_json::from_str(
            r#"[{"storeID":"1","storeName":"Steam"},{"storeID":"7"},{"storeName":"orphan","storeID":null},
                {"storeName":"Unlisted"}]"#,
        )
        .unwrap();
        let map = StoreMap::from_stores(stores);
        assert_eq!(map.len(), 1);
        assert_eq!(map.name_for("1"), "Steam");
        assert_eq!(map.name_for("7"), "7");
    }
}
