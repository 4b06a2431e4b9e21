use crate::models::{MovieInfo, RatingsInfo, ShowtimeEntry};

pub const NO_SHOWTIMES: &str = "No showtimes available";

const MAX_VISIBLE_TIMES: usize = 3;

/// Card label for one cinema's showtimes.
///
/// Only the first date seen is listed, up to three times. The overflow
/// count is taken against every showtime in `showtimes`, not just the
/// listed date, so `[d1 x4, d2 x1]` renders as `"t1, t2, t3 +2 more"`.
pub fn format_showtimes(showtimes: &[ShowtimeEntry]) -> String {
    let first_date = match showtimes.first() {
        Some(entry) => entry.date,
        None => return NO_SHOWTIMES.to_string(),
    };

    let visible = showtimes
        .iter()
        .filter(|entry| entry.date == first_date)
        .take(MAX_VISIBLE_TIMES)
        .map(ShowtimeEntry::time_label)
        .collect::<Vec<_>>()
        .join(", ");

    let total = showtimes.len();
    if total > MAX_VISIBLE_TIMES {
        format!("{visible} +{} more", total - MAX_VISIBLE_TIMES)
    } else {
        visible
    }
}

pub fn movie_details(movie: &MovieInfo) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(year) = movie.year {
        parts.push(year.to_string());
    }
    if let Some(duration) = movie.duration {
        parts.push(format!("{duration} min"));
    }
    if let Some(director) = movie.director.as_deref().map(str::trim) {
        if !director.is_empty() {
            parts.push(director.to_string());
        }
    }
    join_parts(parts)
}

pub fn ratings_summary(ratings: &RatingsInfo) -> Option<String> {
    let imdb = ratings.imdb.as_deref().or(ratings.imdb_rating.as_deref());
    let parts = [
        ("IMDb", imdb),
        ("RT", ratings.rotten_tomatoes.as_deref()),
        ("MC", ratings.metacritic.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, score)| {
        score
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("{label} {s}"))
    })
    .collect::<Vec<_>>();
    join_parts(parts)
}

fn join_parts(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}
