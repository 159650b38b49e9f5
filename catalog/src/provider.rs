//! CatalogProvider
//!
//! Read side of the booking flow plus the few writes the catalog accepts.
//! Responsibilities:
//!   • Seed the demo catalog and default user into an empty store
//!   • List, look up and search movies and theaters
//!   • Resolve a (movie, showtime) pair into everything the seat page needs
//!   • Admin edits: add and delete movies
//!   • Flip `isBooked` on seats after a confirmed booking
//!
//! Every write is a whole-value read-modify-write of one store key, so writes
//! are serialised behind `write_lock` to avoid lost updates inside a process.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use corelib::{Movie, Screen, Showtime, Theater, User};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use store::{KvStore, StoreKey, load, save};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::CatalogError;
use crate::mock;

/// Everything a seat page needs about one showtime.
#[derive(Debug, Clone)]
pub struct Showing {
    pub movie: Movie,
    pub theater: Theater,
    pub screen: Screen,
    pub showtime: Showtime,
}

/// Admin form input for a new movie. Unset fields take the demo defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub genre: Vec<String>,
    pub description: String,
    pub poster: String,
    pub duration: Option<u32>,
    pub rating: Option<f32>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub movies: usize,
    pub theaters: usize,
    pub screens: usize,
    pub total_capacity: u64,
    pub booked_seats: usize,
}

pub struct CatalogProvider<S: ?Sized> {
    store: Arc<S>,
    write_lock: Mutex<()>,
}

impl<S: KvStore + ?Sized> CatalogProvider<S> {
    /// Wrap a store that is already populated (or intentionally empty).
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Wrap `store` and seed whichever of movies, theaters and the current
    /// user is missing. `seed` pins the generated seat layouts.
    pub async fn open(store: Arc<S>, seed: Option<u64>) -> Result<Self, CatalogError> {
        let provider = Self::new(store);
        provider.seed_defaults(seed).await?;
        Ok(provider)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[instrument(skip(self), target = "catalog")]
    async fn seed_defaults(&self, seed: Option<u64>) -> Result<(), CatalogError> {
        let _guard = self.write_lock.lock().await;

        if self.store.get(StoreKey::Movies).await?.is_none() {
            save(&*self.store, StoreKey::Movies, &mock::default_movies()).await?;
            info!("seeded default movies");
        }

        if self.store.get(StoreKey::Theaters).await?.is_none() {
            let theaters = {
                let mut rng = match seed {
                    Some(s) => StdRng::seed_from_u64(s),
                    None => StdRng::from_entropy(),
                };
                mock::default_theaters(&mut rng)
            };
            save(&*self.store, StoreKey::Theaters, &theaters).await?;
            info!(theaters = theaters.len(), "seeded default theaters");
        }

        if self.store.get(StoreKey::CurrentUser).await?.is_none() {
            save(&*self.store, StoreKey::CurrentUser, &User::default()).await?;
            info!("seeded default user");
        }

        Ok(())
    }

    pub async fn list_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        Ok(load(&*self.store, StoreKey::Movies).await?.unwrap_or_default())
    }

    pub async fn list_theaters(&self) -> Result<Vec<Theater>, CatalogError> {
        Ok(load(&*self.store, StoreKey::Theaters).await?.unwrap_or_default())
    }

    pub async fn find_movie(&self, movie_id: &str) -> Result<Movie, CatalogError> {
        self.list_movies()
            .await?
            .into_iter()
            .find(|m| m.id == movie_id)
            .ok_or_else(|| CatalogError::MovieNotFound(movie_id.to_string()))
    }

    pub async fn find_theater(&self, theater_id: &str) -> Result<Theater, CatalogError> {
        self.list_theaters()
            .await?
            .into_iter()
            .find(|t| t.id == theater_id)
            .ok_or_else(|| CatalogError::TheaterNotFound(theater_id.to_string()))
    }

    /// Showtimes of a movie at one theater on one date.
    ///
    /// Theater id and date are compared by exact string equality; no date
    /// parsing or time zone handling happens here.
    pub async fn showtimes_for(
        &self,
        movie_id: &str,
        theater_id: &str,
        date: &str,
    ) -> Result<Vec<Showtime>, CatalogError> {
        let movie = self.find_movie(movie_id).await?;

        Ok(movie
            .showtimes
            .into_iter()
            .filter(|st| st.theater_id == theater_id && st.date == date)
            .collect())
    }

    /// Theaters that run at least one showtime of `movie_id` on `date`.
    pub async fn theaters_showing(
        &self,
        movie_id: &str,
        date: &str,
    ) -> Result<Vec<Theater>, CatalogError> {
        let movie = self.find_movie(movie_id).await?;
        let ids: HashSet<&str> = movie
            .showtimes
            .iter()
            .filter(|st| st.date == date)
            .map(|st| st.theater_id.as_str())
            .collect();

        Ok(self
            .list_theaters()
            .await?
            .into_iter()
            .filter(|t| ids.contains(t.id.as_str()))
            .collect())
    }

    #[instrument(skip(self), target = "catalog")]
    pub async fn resolve_showing(
        &self,
        movie_id: &str,
        showtime_id: &str,
    ) -> Result<Showing, CatalogError> {
        let movie = self.find_movie(movie_id).await?;

        let showtime = movie
            .showtime(showtime_id)
            .cloned()
            .ok_or_else(|| CatalogError::ShowtimeNotFound {
                movie_id: movie_id.to_string(),
                showtime_id: showtime_id.to_string(),
            })?;

        let theater = self.find_theater(&showtime.theater_id).await?;

        let screen = theater
            .screen(&showtime.screen_id)
            .cloned()
            .ok_or_else(|| CatalogError::ScreenNotFound {
                theater_id: showtime.theater_id.clone(),
                screen_id: showtime.screen_id.clone(),
            })?;

        debug!(theater = %theater.id, screen = %screen.id, "showing resolved");

        Ok(Showing {
            movie,
            theater,
            screen,
            showtime,
        })
    }

    /// Home page filter: case-insensitive substring match on the title or
    /// any genre, then an optional exact genre filter.
    pub async fn search_movies(
        &self,
        term: &str,
        genre: Option<&str>,
    ) -> Result<Vec<Movie>, CatalogError> {
        let needle = term.to_lowercase();

        Ok(self
            .list_movies()
            .await?
            .into_iter()
            .filter(|m| {
                m.title.to_lowercase().contains(&needle)
                    || m.genre.iter().any(|g| g.to_lowercase().contains(&needle))
            })
            .filter(|m| genre.is_none_or(|g| m.genre.iter().any(|mg| mg == g)))
            .collect())
    }

    /// Distinct genres in first-seen order.
    pub async fn genres(&self) -> Result<Vec<String>, CatalogError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for g in self.list_movies().await?.into_iter().flat_map(|m| m.genre) {
            if seen.insert(g.clone()) {
                out.push(g);
            }
        }

        Ok(out)
    }

    #[instrument(skip(self, input), target = "catalog", fields(title = %input.title))]
    pub async fn add_movie(&self, input: NewMovie) -> Result<Movie, CatalogError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(CatalogError::InvalidMovie("title is required".into()));
        }

        let genre: Vec<String> = input
            .genre
            .iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
        if genre.is_empty() {
            return Err(CatalogError::InvalidMovie("at least one genre is required".into()));
        }

        let now = Utc::now();
        let movie = Movie {
            id: format!("movie_{}", now.timestamp_millis()),
            title: title.to_string(),
            poster: input.poster,
            genre,
            duration: input.duration.unwrap_or(120),
            rating: input.rating.unwrap_or(8.0),
            description: input.description,
            language: input.language.unwrap_or_else(|| "English".into()),
            release_date: now.format("%Y-%m-%d").to_string(),
            showtimes: Vec::new(),
        };

        let _guard = self.write_lock.lock().await;
        let mut movies = self.list_movies().await?;
        movies.push(movie.clone());
        save(&*self.store, StoreKey::Movies, &movies).await?;

        info!(movie_id = %movie.id, "movie added");
        Ok(movie)
    }

    #[instrument(skip(self), target = "catalog")]
    pub async fn delete_movie(&self, movie_id: &str) -> Result<Movie, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut movies = self.list_movies().await?;

        let idx = movies
            .iter()
            .position(|m| m.id == movie_id)
            .ok_or_else(|| CatalogError::MovieNotFound(movie_id.to_string()))?;

        let removed = movies.remove(idx);
        save(&*self.store, StoreKey::Movies, &movies).await?;

        info!("movie deleted");
        Ok(removed)
    }

    pub async fn dashboard(&self) -> Result<Dashboard, CatalogError> {
        let movies = self.list_movies().await?;
        let theaters = self.list_theaters().await?;
        let screens = theaters.iter().flat_map(|t| &t.screens);

        Ok(Dashboard {
            movies: movies.len(),
            theaters: theaters.len(),
            screens: screens.clone().count(),
            total_capacity: screens.clone().map(|s| u64::from(s.capacity)).sum(),
            booked_seats: screens
                .flat_map(|s| s.seat_layout.iter().flatten())
                .filter(|seat| seat.is_booked)
                .count(),
        })
    }

    /// The subset of `seat_ids` that is already booked on one screen, in
    /// request order. Unknown ids count as unavailable.
    pub async fn unavailable_seats(
        &self,
        theater_id: &str,
        screen_id: &str,
        seat_ids: &[String],
    ) -> Result<Vec<String>, CatalogError> {
        let theater = self.find_theater(theater_id).await?;
        let screen = theater
            .screen(screen_id)
            .ok_or_else(|| CatalogError::ScreenNotFound {
                theater_id: theater_id.to_string(),
                screen_id: screen_id.to_string(),
            })?;

        Ok(seat_ids
            .iter()
            .filter(|id| {
                !screen
                    .seat_layout
                    .iter()
                    .flatten()
                    .any(|seat| &seat.id == *id && !seat.is_booked)
            })
            .cloned()
            .collect())
    }

    /// Mark `seat_ids` as booked on one screen. Returns how many seats
    /// changed from available to booked; unknown ids are skipped.
    #[instrument(skip(self, seat_ids), target = "catalog", fields(seats = seat_ids.len()))]
    pub async fn mark_seats_booked(
        &self,
        theater_id: &str,
        screen_id: &str,
        seat_ids: &[String],
    ) -> Result<usize, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut theaters = self.list_theaters().await?;

        let theater = theaters
            .iter_mut()
            .find(|t| t.id == theater_id)
            .ok_or_else(|| CatalogError::TheaterNotFound(theater_id.to_string()))?;

        let screen = theater
            .screen_mut(screen_id)
            .ok_or_else(|| CatalogError::ScreenNotFound {
                theater_id: theater_id.to_string(),
                screen_id: screen_id.to_string(),
            })?;

        let wanted: HashSet<&str> = seat_ids.iter().map(String::as_str).collect();
        let mut flipped = 0;

        for seat in screen.seat_layout.iter_mut().flatten() {
            if wanted.contains(seat.id.as_str()) && !seat.is_booked {
                seat.is_booked = true;
                flipped += 1;
            }
        }

        if flipped < wanted.len() {
            warn!(
                requested = wanted.len(),
                flipped, "some seats were unknown or already booked"
            );
        }

        save(&*self.store, StoreKey::Theaters, &theaters).await?;
        Ok(flipped)
    }
}
