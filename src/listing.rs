use std::collections::HashMap;

use crate::cinemas;
use crate::models::{CinemaShowtimes, ConsolidatedMovie, SourceRecord};

/// Records whose cinema belongs to `city_name`, in catalog order.
///
/// Cinemas missing from the lookup table never match, and a city name
/// outside the picker simply yields nothing.
pub fn filter_by_city<'a>(records: &'a [SourceRecord], city_name: &str) -> Vec<&'a SourceRecord> {
    records
        .iter()
        .filter(|record| {
            cinemas::city_of(&record.cinema_id)
                .map(|city| city.name() == city_name)
                .unwrap_or(false)
        })
        .collect()
}

/// Groups records by `movie.url`, keeping first-seen order of movies and
/// of cinemas within a movie.
///
/// Every record adds its own cinema entry; two records for the same
/// cinema and url stay separate.
pub fn consolidate<'a, I>(records: I) -> Vec<ConsolidatedMovie>
where
    I: IntoIterator<Item = &'a SourceRecord>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut movies: Vec<ConsolidatedMovie> = Vec::new();

    for record in records {
        let entry = CinemaShowtimes {
            cinema_id: record.cinema_id.clone(),
            showtimes: record.showtimes.clone(),
        };
        match positions.get(record.movie.url.as_str()) {
            Some(&idx) => movies[idx].cinemas.push(entry),
            None => {
                positions.insert(record.movie.url.as_str(), movies.len());
                movies.push(ConsolidatedMovie {
                    movie: record.movie.clone(),
                    cinemas: vec![entry],
                });
            }
        }
    }

    tracing::debug!(movies = movies.len(), "consolidated showtimes");
    movies
}
