// src/steam/models.rs
//! Wire shapes of the two Steam endpoints and the records derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::CsvRecord;
use crate::table::RowRef;

/// One entry of the app list. Immutable once fetched.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppSummary {
    #[serde(rename = "appid")]
    pub app_id: u32,
    #[serde(default)]
    pub name: String,
    /// Unix seconds.
    #[serde(default)]
    pub last_modified: Option<i64>,
    #[serde(default)]
    pub price_change_number: Option<i64>,
}

impl CsvRecord for AppSummary {
    const HEADERS: &'static [&'static str] =
        &["appid", "name", "last_modified", "price_change_number"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.app_id.to_string(),
            self.name.clone(),
            opt_to_string(self.last_modified),
            opt_to_string(self.price_change_number),
        ]
    }

    fn from_row(row: RowRef<'_>) -> Result<Self, String> {
        Ok(Self {
            app_id: row.parse_int("appid")?.ok_or("missing appid")?,
            name: s!(row.get("name").unwrap_or_default()),
            last_modified: row.parse_int("last_modified")?,
            price_change_number: row.parse_int("price_change_number")?,
        })
    }
}

fn opt_to_string<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppListEnvelope {
    #[serde(default)]
    pub response: AppListBody,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AppListBody {
    #[serde(default)]
    pub apps: Vec<AppSummary>,
    #[serde(default)]
    pub have_more_results: bool,
    #[serde(default)]
    pub last_appid: Option<u32>,
}

/// One page of the app list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppListPage {
    pub apps: Vec<AppSummary>,
    pub have_more_results: bool,
    /// Continuation cursor for the next call.
    pub last_appid: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Described {
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseDate {
    #[serde(default)]
    pub date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub rating: Option<String>,
}

/// `data` object of the app details endpoint. Only the fields the pipeline
/// uses are typed; everything else is ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AppDetail {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steam_appid: Option<u32>,
    /// Number or string depending on the app.
    #[serde(default)]
    pub required_age: serde_json::Value,
    #[serde(default)]
    pub is_free: Option<bool>,
    #[serde(default)]
    pub controller_support: Option<String>,
    #[serde(default)]
    pub detailed_description: Option<String>,
    #[serde(default)]
    pub about_the_game: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub supported_languages: Option<String>,
    #[serde(default)]
    pub header_image: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Described>,
    #[serde(default)]
    pub genres: Vec<Described>,
    #[serde(default)]
    pub release_date: Option<ReleaseDate>,
    #[serde(default)]
    pub ratings: Option<BTreeMap<String, Rating>>,
}

impl AppDetail {
    pub fn is_game(&self) -> bool {
        self.kind.as_deref() == Some("game")
    }

    /// ESRB rating, lower-cased (`"m"`, `"e"`, `"t"`, ...).
    pub fn esrb_rating(&self) -> Option<String> {
        self.ratings
            .as_ref()?
            .get("esrb")?
            .rating
            .as_deref()
            .map(|r| r.trim().to_ascii_lowercase())
            .filter(|r| !r.is_empty())
    }

    pub fn required_age(&self) -> String {
        match &self.required_age {
            serde_json::Value::Null => s!(NOT_AVAILABLE),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Placeholder for fields the store did not send.
pub const NOT_AVAILABLE: &str = "N/A";

fn or_na(v: &Option<String>) -> String {
    v.clone().unwrap_or_else(|| s!(NOT_AVAILABLE))
}

fn join_descriptions(items: &[Described]) -> String {
    items.iter().map(|d| d.description.as_str()).collect::<Vec<_>>().join(", ")
}

/// Cleaned short description, keyed by app id and store title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptionRecord {
    pub app_id: u32,
    pub title: String,
    pub description: String,
}

impl CsvRecord for DescriptionRecord {
    const HEADERS: &'static [&'static str] = &["app_id", "title", "description"];

    fn to_row(&self) -> Vec<String> {
        vec![self.app_id.to_string(), self.title.clone(), self.description.clone()]
    }

    fn from_row(row: RowRef<'_>) -> Result<Self, String> {
        Ok(Self {
            app_id: row.parse_int("app_id")?.ok_or("missing app_id")?,
            title: s!(row.get("title").unwrap_or_default()),
            description: s!(row.get("description").unwrap_or_default()),
        })
    }
}

/// Flattened details row: the columns the training step reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub app_id: u32,
    pub name: String,
    pub required_age: String,
    pub is_free: String,
    pub controller_support: String,
    pub detailed_description: String,
    pub about_the_game: String,
    pub short_description: String,
    pub supported_languages: String,
    pub header_image: String,
    pub website: String,
    pub developers: String,
    pub publishers: String,
    pub categories: String,
    pub genres: String,
    pub release_date: String,
    pub esrb_rating: String,
}

impl GameRecord {
    pub fn from_detail(app_id: u32, d: &AppDetail) -> Self {
        Self {
            app_id,
            name: if d.name.is_empty() { s!(NOT_AVAILABLE) } else { d.name.clone() },
            required_age: d.required_age(),
            is_free: d.is_free.map(|b| b.to_string()).unwrap_or_else(|| s!(NOT_AVAILABLE)),
            controller_support: or_na(&d.controller_support),
            detailed_description: or_na(&d.detailed_description),
            about_the_game: or_na(&d.about_the_game),
            short_description: or_na(&d.short_description),
            supported_languages: or_na(&d.supported_languages),
            header_image: or_na(&d.header_image),
            website: or_na(&d.website),
            developers: d.developers.join(", "),
            publishers: d.publishers.join(", "),
            categories: join_descriptions(&d.categories),
            genres: join_descriptions(&d.genres),
            release_date: d
                .release_date
                .as_ref()
                .map(|r| r.date.clone())
                .unwrap_or_else(|| s!(NOT_AVAILABLE)),
            esrb_rating: d.esrb_rating().unwrap_or_else(|| s!(NOT_AVAILABLE)),
        }
    }
}

impl CsvRecord for GameRecord {
    const HEADERS: &'static [&'static str] = &[
        "app_id", "name", "required_age", "is_free", "controller_support",
        "detailed_description", "about_the_game", "short_description",
        "supported_languages", "header_image", "website", "developers",
        "publishers", "categories", "genres", "release_date", "esrb_rating",
    ];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.app_id.to_string(),
            self.name.clone(),
            self.required_age.clone(),
            self.is_free.clone(),
            self.controller_support.clone(),
            self.detailed_description.clone(),
            self.about_the_game.clone(),
            self.short_description.clone(),
            self.supported_languages.clone(),
            self.header_image.clone(),
            self.website.clone(),
            self.developers.clone(),
            self.publishers.clone(),
            self.categories.clone(),
            self.genres.clone(),
            self.release_date.clone(),
            self.esrb_rating.clone(),
        ]
    }

    fn from_row(row: RowRef<'_>) -> Result<Self, String> {
        let text = |name: &str| s!(row.get(name).unwrap_or_default());
        Ok(Self {
            app_id: row.parse_int("app_id")?.ok_or("missing app_id")?,
            name: text("name"),
            required_age: text("required_age"),
            is_free: text("is_free"),
            controller_support: text("controller_support"),
            detailed_description: text("detailed_description"),
            about_the_game: text("about_the_game"),
            short_description: text("short_description"),
            supported_languages: text("supported_languages"),
            header_image: text("header_image"),
            website: text("website"),
            developers: text("developers"),
            publishers: text("publishers"),
            categories: text("categories"),
            genres: text("genres"),
            release_date: text("release_date"),
            esrb_rating: text("esrb_rating"),
        })
    }
}

/// Row of the bulk catalog scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanRecord {
    pub steam_appid: u32,
    pub name: String,
    pub about_the_game: String,
    pub esrb_rating: String,
}

impl CsvRecord for ScanRecord {
    const HEADERS: &'static [&'static str] = &["steam_appid", "name", "about_the_game", "esrb_rating"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.steam_appid.to_string(),
            self.name.clone(),
            self.about_the_game.clone(),
            self.esrb_rating.clone(),
        ]
    }

    fn from_row(row: RowRef<'_>) -> Result<Self, String> {
        Ok(Self {
            steam_appid: row.parse_int("steam_appid")?.ok_or("missing steam_appid")?,
            name: s!(row.get("name").unwrap_or_default()),
            about_the_game: s!(row.get("about_the_game").unwrap_or_default()),
            esrb_rating: s!(row.get("esrb_rating").unwrap_or_default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL: &str = r#"{
        "type": "game",
        "name": "Space Raiders",
        "steam_appid": 10,
        "required_age": "17",
        "is_free": false,
        "short_description": "Shoot <b>things</b>.",
        "website": null,
        "developers": ["Studio A", "Studio B"],
        "genres": [{"id": "1", "description": "Action"}, {"id": "25", "description": "Adventure"}],
        "categories": [{"id": 2, "description": "Single-player"}],
        "release_date": {"coming_soon": false, "date": "1 Nov, 2000"},
        "ratings": {"esrb": {"rating": "M", "descriptors": "Blood"}, "pegi": {"rating": "16"}}
    }"#;

    #[test]
    fn detail_fields() {
        let d: AppDetail = serde_json::from_str(DETAIL).unwrap();
        assert!(d.is_game());
        assert_eq!(d.esrb_rating().as_deref(), Some("m"));
        assert_eq!(d.required_age(), "17");

        let g = GameRecord::from_detail(10, &d);
        assert_eq!(g.developers, "Studio A, Studio B");
        assert_eq!(g.genres, "Action, Adventure");
        assert_eq!(g.categories, "Single-player");
        assert_eq!(g.website, NOT_AVAILABLE);
        assert_eq!(g.release_date, "1 Nov, 2000");
        assert_eq!(g.is_free, "false");
    }

    #[test]
    fn detail_without_ratings() {
        let d: AppDetail = serde_json::from_str(r#"{"name": "X", "required_age": 0}"#).unwrap();
        assert_eq!(d.esrb_rating(), None);
        assert_eq!(d.required_age(), "0");
        assert_eq!(GameRecord::from_detail(1, &d).esrb_rating, NOT_AVAILABLE);
    }

    #[test]
    fn app_list_tolerates_missing_fields() {
        let env: AppListEnvelope = serde_json::from_str(r#"{"response": {}}"#).unwrap();
        assert!(env.response.apps.is_empty());
        assert!(!env.response.have_more_results);

        let env: AppListEnvelope = serde_json::from_str(
            r#"{"response": {"apps": [{"appid": 5, "name": "A", "last_modified": 1, "price_change_number": 2}],
                "have_more_results": true, "last_appid": 5}}"#,
        )
        .unwrap();
        assert_eq!(env.response.apps[0].app_id, 5);
        assert_eq!(env.response.last_appid, Some(5));
    }
}
