use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShowtimeEntry {
    #[serde(rename = "show_date")]
    pub date: NaiveDate,
    #[serde(rename = "show_time", with = "clock_time")]
    pub time: NaiveTime,
}

impl ShowtimeEntry {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Time of day as shown on a card, e.g. `19:30`.
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CinemaId(pub String);

impl CinemaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CinemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RatingsInfo {
    pub imdb: Option<String>,
    pub rotten_tomatoes: Option<String>,
    pub metacritic: Option<String>,
    pub imdb_rating: Option<String>,
    pub imdb_votes: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MovieInfo {
    pub title: String,
    pub url: String, // consolidation key
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub actors: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub ratings: Option<RatingsInfo>,
}

impl MovieInfo {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            image_url: None,
            country: None,
            year: None,
            duration: None,
            director: None,
            genre: None,
            actors: None,
            plot: None,
            rated: None,
            imdb_id: None,
            language: None,
            ratings: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SourceRecord {
    pub movie: MovieInfo,
    pub cinema_id: CinemaId,
    #[serde(default)]
    pub showtimes: Vec<ShowtimeEntry>,
    #[serde(default)]
    pub scraped_at: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CinemaShowtimes {
    pub cinema_id: CinemaId,
    pub showtimes: Vec<ShowtimeEntry>,
}

/// One movie with every cinema record that shares its `url`.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ConsolidatedMovie {
    pub movie: MovieInfo,
    pub cinemas: Vec<CinemaShowtimes>,
}

mod clock_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        for fmt in ["%H:%M", "%H:%M:%S"] {
            if let Ok(time) = NaiveTime::parse_from_str(trimmed, fmt) {
                return Ok(time);
            }
        }
        Err(de::Error::custom(format!("invalid show_time: {raw}")))
    }
}
