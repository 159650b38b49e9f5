use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("movie not found: {0}")]
    MovieNotFound(String),

    #[error("showtime {showtime_id} not found for movie {movie_id}")]
    ShowtimeNotFound {
        movie_id: String,
        showtime_id: String,
    },

    #[error("theater not found: {0}")]
    TheaterNotFound(String),

    #[error("screen {screen_id} not found in theater {theater_id}")]
    ScreenNotFound {
        theater_id: String,
        screen_id: String,
    },

    #[error("invalid movie: {0}")]
    InvalidMovie(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
