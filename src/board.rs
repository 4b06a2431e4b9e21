use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::beacon::{CardClick, ClickBeacon, PageContext};
use crate::cinemas::{self, City};
use crate::config::AppConfig;
use crate::format;
use crate::listing;
use crate::models::{CinemaId, ConsolidatedMovie, SourceRecord};

static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("valid zip regex"));

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Please enter a valid 5-digit US zip code")]
    InvalidZipCode(String),
    #[error("unable to open {url}: {reason}")]
    Open { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZipCode(String);

impl ZipCode {
    pub fn parse(input: &str) -> Result<Self, BoardError> {
        if ZIP_RE.is_match(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(BoardError::InvalidZipCode(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything the user has picked so far. The caller owns it and passes
/// it into `now_showing`; nothing here reads global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub selected_city: String,
    pub searched_zip: Option<ZipCode>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(City::Seattle.name())
    }
}

impl ViewState {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            selected_city: city.into(),
            searched_zip: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match config.default_city.as_deref() {
            Some(city) => Self::new(city),
            None => Self::default(),
        }
    }

    pub fn select_city(&mut self, city: impl Into<String>) {
        self.selected_city = city.into();
    }

    /// Stores a valid zip; an invalid one leaves the previous search alone.
    pub fn search_zip(&mut self, input: &str) -> Result<&ZipCode, BoardError> {
        let zip = ZipCode::parse(input)?;
        Ok(&*self.searched_zip.insert(zip))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueLine {
    pub cinema_id: CinemaId,
    pub name: String,
    pub showtimes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieCard {
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub details: Option<String>,
    pub genre: Option<String>,
    pub rated: Option<String>,
    pub ratings: Option<String>,
    pub venues: Vec<VenueLine>,
}

impl From<&ConsolidatedMovie> for MovieCard {
    fn from(consolidated: &ConsolidatedMovie) -> Self {
        let movie = &consolidated.movie;
        let venues = consolidated
            .cinemas
            .iter()
            .map(|cinema| VenueLine {
                cinema_id: cinema.cinema_id.clone(),
                name: cinemas::display_name(&cinema.cinema_id).to_string(),
                showtimes: format::format_showtimes(&cinema.showtimes),
            })
            .collect();

        Self {
            title: movie.title.clone(),
            url: movie.url.clone(),
            image_url: movie.image_url.clone(),
            details: format::movie_details(movie),
            genre: movie.genre.clone(),
            rated: movie.rated.clone(),
            ratings: movie.ratings.as_ref().and_then(format::ratings_summary),
            venues,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Listing {
    Movies { city: String, cards: Vec<MovieCard> },
    Empty { city: String },
}

impl Listing {
    pub fn city(&self) -> &str {
        match self {
            Listing::Movies { city, .. } | Listing::Empty { city } => city,
        }
    }

    pub fn cards(&self) -> &[MovieCard] {
        match self {
            Listing::Movies { cards, .. } => cards,
            Listing::Empty { .. } => &[],
        }
    }

    pub fn empty_message(&self) -> Option<String> {
        match self {
            Listing::Movies { .. } => None,
            Listing::Empty { city } => Some(format!("No movies showing in {city} right now")),
        }
    }
}

pub fn now_showing(records: &[SourceRecord], state: &ViewState) -> Listing {
    let city = state.selected_city.clone();
    let movies = listing::consolidate(listing::filter_by_city(records, &city));
    if movies.is_empty() {
        tracing::info!(city = %city, "no movies for city");
        return Listing::Empty { city };
    }
    let cards = movies.iter().map(MovieCard::from).collect();
    Listing::Movies { city, cards }
}

/// Header for a zip search, e.g. `Now Showing in 98101 (3 movies found in your area)`.
pub fn search_summary(state: &ViewState, listing: &Listing) -> Option<String> {
    let zip = state.searched_zip.as_ref()?;
    let count = listing.cards().len();
    let noun = if count == 1 { "movie" } else { "movies" };
    Some(format!(
        "Now Showing in {} ({count} {noun} found in your area)",
        zip.as_str()
    ))
}

pub fn render_listing(listing: &Listing) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Now showing · {}", listing.city());
    if let Some(message) = listing.empty_message() {
        let _ = writeln!(out, "{message}");
        return out;
    }
    for (idx, card) in listing.cards().iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}] {}", idx + 1, card.title);
        for line in [&card.details, &card.genre, &card.rated, &card.ratings]
            .into_iter()
            .flatten()
        {
            let _ = writeln!(out, "  {line}");
        }
        for venue in &card.venues {
            let _ = writeln!(out, "  {}: {}", venue.name, venue.showtimes);
        }
        let _ = writeln!(out, "  {}", card.url);
    }
    out
}

/// One line of input from the listing prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(usize),
    SelectCity(City),
    SearchZip(String),
    Quit,
    Unknown(String),
}

/// `1`..`n` opens a card, a city name switches city, `zip 98101` searches,
/// blank or `q` quits.
pub fn parse_command(input: &str, listing: &Listing) -> Command {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("q") {
        return Command::Quit;
    }
    if let Some(city) = City::from_name(input) {
        return Command::SelectCity(city);
    }
    if let Some(zip) = input.strip_prefix("zip ") {
        return Command::SearchZip(zip.trim().to_string());
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=listing.cards().len()).contains(&n) => Command::Open(n - 1),
        _ => Command::Unknown(input.to_string()),
    }
}

pub trait UrlOpener {
    fn open(&self, url: &str) -> Result<(), String>;
}

/// Hands the URL to the operating system's default handler, which opens it
/// in a separate process with no handle back to us.
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), String> {
        tauri_plugin_opener::open_url(url, None::<&str>).map_err(|err| err.to_string())
    }
}

/// Fires the click beacon, then opens the movie page whatever the beacon
/// does.
pub fn open_movie(
    beacon: &ClickBeacon,
    opener: &dyn UrlOpener,
    card: &MovieCard,
    page: &PageContext,
) -> Result<(), BoardError> {
    beacon.fire(CardClick::new(card.title.clone(), page));
    opener.open(&card.url).map_err(|reason| {
        tracing::error!(url = %card.url, "failed to open movie page: {reason}");
        BoardError::Open {
            url: card.url.clone(),
            reason,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::tests::{one_shot_server, page};
    use crate::models::{MovieInfo, RatingsInfo, ShowtimeEntry};
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
    }

    impl UrlOpener for RecordingOpener {
        fn open(&self, url: &str) -> Result<(), String> {
            self.opened.lock().expect("opener lock").push(url.to_string());
            Ok(())
        }
    }

    struct BrokenOpener;

    impl UrlOpener for BrokenOpener {
        fn open(&self, _url: &str) -> Result<(), String> {
            Err("no handler for https".to_string())
        }
    }

    fn show(day: u32, hour: u32) -> ShowtimeEntry {
        ShowtimeEntry::new(
            NaiveDate::from_ymd_opt(2025, 10, day).expect("date"),
            NaiveTime::from_hms_opt(hour, 0, 0).expect("time"),
        )
    }

    fn catalog() -> Vec<SourceRecord> {
        let mut lan_yu = MovieInfo::new("Lan Yu (蓝宇)", "https://x/lan-yu");
        lan_yu.year = Some(2001);
        lan_yu.director = Some("Stanley Kwan".to_string());
        lan_yu.rated = Some("4K Restoration".to_string());
        lan_yu.ratings = Some(RatingsInfo {
            imdb: Some("7.5/10".to_string()),
            ..RatingsInfo::default()
        });

        vec![
            SourceRecord {
                movie: lan_yu.clone(),
                cinema_id: CinemaId::new("SIFF_UPTOWN"),
                showtimes: vec![show(14, 12), show(14, 15), show(14, 18), show(14, 21), show(15, 13)],
                scraped_at: "2025-10-14".to_string(),
            },
            SourceRecord {
                movie: MovieInfo::new("Happy Together", "https://x/happy-together"),
                cinema_id: CinemaId::new("VIFF_RIO"),
                showtimes: vec![show(16, 12)],
                scraped_at: "2025-10-14".to_string(),
            },
            SourceRecord {
                movie: lan_yu,
                cinema_id: CinemaId::new("SIFF_EGYPTIAN"),
                showtimes: vec![],
                scraped_at: "2025-10-14".to_string(),
            },
        ]
    }

    #[test]
    fn default_state_is_seattle() {
        let state = ViewState::default();
        assert_eq!(state.selected_city, "Seattle");
        assert!(state.searched_zip.is_none());

        let config = AppConfig {
            default_city: Some("Vancouver BC".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(ViewState::from_config(&config).selected_city, "Vancouver BC");
    }

    #[test]
    fn builds_cards_for_selected_city() {
        let records = catalog();
        let listing = now_showing(&records, &ViewState::default());
        assert_eq!(listing.city(), "Seattle");
        assert!(listing.empty_message().is_none());

        let cards = listing.cards();
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.title, "Lan Yu (蓝宇)");
        assert_eq!(card.details.as_deref(), Some("2001 · Stanley Kwan"));
        assert_eq!(card.ratings.as_deref(), Some("IMDb 7.5/10"));
        assert_eq!(
            card.venues,
            vec![
                VenueLine {
                    cinema_id: CinemaId::new("SIFF_UPTOWN"),
                    name: "SIFF Cinema Uptown".to_string(),
                    showtimes: "12:00, 15:00, 18:00 +2 more".to_string(),
                },
                VenueLine {
                    cinema_id: CinemaId::new("SIFF_EGYPTIAN"),
                    name: "SIFF Cinema Egyptian".to_string(),
                    showtimes: "No showtimes available".to_string(),
                },
            ]
        );
    }

    #[test]
    fn switching_city_rebuilds_listing() {
        let records = catalog();
        let mut state = ViewState::default();
        state.select_city(City::VancouverBc.name());
        let listing = now_showing(&records, &state);
        let titles: Vec<&str> = listing.cards().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Happy Together"]);
        assert_eq!(listing.cards()[0].venues[0].name, "Rio Theatre");
    }

    #[test]
    fn city_without_cinemas_shows_empty_state() {
        let records = catalog();
        let listing = now_showing(&records, &ViewState::new("San Jose"));
        assert_eq!(
            listing,
            Listing::Empty {
                city: "San Jose".to_string()
            }
        );
        assert_eq!(
            listing.empty_message().as_deref(),
            Some("No movies showing in San Jose right now")
        );
        assert!(render_listing(&listing).contains("No movies showing in San Jose right now"));
    }

    #[test]
    fn zip_search_accepts_only_five_digits() {
        let mut state = ViewState::default();
        assert_eq!(state.search_zip("98101").expect("valid zip").as_str(), "98101");
        for bad in ["9810", "98101-1234", "abcde", " 98101", "٩٨١٠١"] {
            assert!(matches!(
                state.search_zip(bad),
                Err(BoardError::InvalidZipCode(_))
            ));
        }
        assert_eq!(state.searched_zip.as_ref().map(ZipCode::as_str), Some("98101"));
    }

    #[test]
    fn search_summary_counts_cards() {
        let records = catalog();
        let mut state = ViewState::default();
        let listing = now_showing(&records, &state);
        assert_eq!(search_summary(&state, &listing), None);

        state.search_zip("98101").expect("valid zip");
        assert_eq!(
            search_summary(&state, &listing).as_deref(),
            Some("Now Showing in 98101 (1 movie found in your area)")
        );
    }

    #[test]
    fn renders_text_listing() {
        let records = catalog();
        let text = render_listing(&now_showing(&records, &ViewState::default()));
        assert!(text.starts_with("Now showing · Seattle\n"));
        assert!(text.contains("\n[1] Lan Yu (蓝宇)\n"));
        assert!(text.contains("  4K Restoration\n"));
        assert!(text.contains("  SIFF Cinema Uptown: 12:00, 15:00, 18:00 +2 more\n"));
        assert!(text.contains("  https://x/lan-yu\n"));
    }

    #[test]
    fn parses_prompt_commands() {
        let records = catalog();
        let listing = now_showing(&records, &ViewState::default());
        assert_eq!(parse_command("1", &listing), Command::Open(0));
        assert_eq!(parse_command(" 1\n", &listing), Command::Open(0));
        assert_eq!(
            parse_command("Vancouver BC", &listing),
            Command::SelectCity(City::VancouverBc)
        );
        assert_eq!(
            parse_command("zip 98101", &listing),
            Command::SearchZip("98101".to_string())
        );
        assert_eq!(parse_command("", &listing), Command::Quit);
        assert_eq!(parse_command("Q", &listing), Command::Quit);
        assert_eq!(parse_command("0", &listing), Command::Unknown("0".to_string()));
        assert_eq!(parse_command("2", &listing), Command::Unknown("2".to_string()));
    }

    #[test]
    fn empty_listing_has_nothing_to_open() {
        let records = catalog();
        let listing = now_showing(&records, &ViewState::new("San Jose"));
        assert_eq!(parse_command("1", &listing), Command::Unknown("1".to_string()));
    }

    #[test]
    fn opens_movie_without_tracking_config() {
        let records = catalog();
        let listing = now_showing(&records, &ViewState::default());
        let opener = RecordingOpener::default();
        let beacon = ClickBeacon::new(None);

        open_movie(&beacon, &opener, &listing.cards()[0], &page()).expect("open movie");
        assert_eq!(
            *opener.opened.lock().expect("opener lock"),
            vec!["https://x/lan-yu".to_string()]
        );
    }

    #[tokio::test]
    async fn opens_movie_and_tracks_click() {
        let records = catalog();
        let listing = now_showing(&records, &ViewState::default());
        let (endpoint, request) = one_shot_server();
        let beacon = ClickBeacon::new(Some(endpoint));
        let opener = RecordingOpener::default();

        open_movie(&beacon, &opener, &listing.cards()[0], &page()).expect("open movie");
        // navigation happened before the beacon was delivered
        assert_eq!(opener.opened.lock().expect("opener lock").len(), 1);

        let request_line = tokio::time::timeout(Duration::from_secs(10), request)
            .await
            .expect("beacon delivered in time")
            .expect("request seen");
        assert!(request_line.contains("element_name=Lan+Yu"));
    }

    #[test]
    fn opener_failure_is_reported() {
        let card = MovieCard::from(&listing::consolidate(&catalog())[0]);
        let err = open_movie(&ClickBeacon::new(None), &BrokenOpener, &card, &page())
            .expect_err("broken opener");
        assert!(matches!(err, BoardError::Open { ref url, .. } if url == "https://x/lan-yu"));
    }
}
