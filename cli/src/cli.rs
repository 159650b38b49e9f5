use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "boxoffice", version, about = "Browse showtimes, hold seats and book tickets")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List movies, optionally filtered
    Movies {
        /// Case-insensitive match on title or genre
        #[clap(long, default_value = "")]
        search: String,

        /// Exact genre filter, e.g. Drama
        #[clap(long)]
        genre: Option<String>,
    },

    /// Showtimes of a movie on a date, grouped by theater
    Showtimes {
        #[clap(long)]
        movie: String,

        /// YYYY-MM-DD
        #[clap(long, default_value = "2025-01-15")]
        date: String,
    },

    /// Print the seat map of a showtime
    Seats(ShowingArgs),

    /// Hold seats, pay and confirm in one go
    Book {
        #[clap(flatten)]
        showing: ShowingArgs,

        /// Seat labels (comma-separated), e.g. A1,A2
        #[clap(long, value_delimiter = ',', required = true)]
        seats: Vec<String>,
    },

    /// Booking history and totals of the current user
    Profile {
        /// Print the JSON ticket of this booking id instead
        #[clap(long)]
        ticket: Option<String>,
    },

    /// Catalog dashboard and edits
    Admin {
        #[clap(subcommand)]
        action: Option<AdminCommand>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ShowingArgs {
    #[clap(long)]
    pub movie: String,

    #[clap(long)]
    pub showtime: String,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Add a movie (no showtimes yet)
    AddMovie {
        #[clap(long)]
        title: String,

        /// Comma-separated genres
        #[clap(long, value_delimiter = ',', required = true)]
        genre: Vec<String>,

        #[clap(long, default_value = "")]
        description: String,

        #[clap(long, default_value = "")]
        poster: String,

        /// Minutes
        #[clap(long)]
        duration: Option<u32>,

        #[clap(long)]
        rating: Option<f32>,

        #[clap(long)]
        language: Option<String>,
    },

    /// Remove a movie by id
    DeleteMovie {
        #[clap(long)]
        id: String,
    },
}
