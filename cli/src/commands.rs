//! Command handlers. Each one maps a subcommand onto the library crates and
//! writes plain text to `out`.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use booking::{BookingFinalizer, FinalizerConfig, SimulatedGateway};
use catalog::{CatalogProvider, NewMovie};
use selection::{
    CountdownEvent, CountdownHandle, SeatColor, SeatSelector, SelectionConfig, SelectionSnapshot,
    SharedSelector, ToggleOutcome, spawn_countdown,
};
use store::KvStore;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::cli::{AdminCommand, Command, ShowingArgs};
use crate::config::AppConfig;

pub struct App<S: KvStore + ?Sized> {
    catalog: Arc<CatalogProvider<S>>,
    finalizer: BookingFinalizer<S, SimulatedGateway>,
    selection: SelectionConfig,
}

impl<S: KvStore + ?Sized> App<S> {
    /// Seed the store if needed and wire the components onto it.
    pub async fn open(store: Arc<S>, cfg: &AppConfig) -> anyhow::Result<Self> {
        let catalog = Arc::new(
            CatalogProvider::open(store.clone(), cfg.seed)
                .await
                .context("failed to open catalog")?,
        );

        let finalizer = BookingFinalizer::new(
            store,
            catalog.clone(),
            Arc::new(SimulatedGateway::new(cfg.payment_delay)),
            FinalizerConfig {
                fee_bps: cfg.fee_bps,
            },
        );

        Ok(Self {
            catalog,
            finalizer,
            selection: SelectionConfig {
                max_seats: cfg.max_seats,
                hold_seconds: cfg.hold_seconds,
            },
        })
    }

    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> anyhow::Result<()> {
        match command {
            Command::Movies { search, genre } => self.movies(&search, genre.as_deref(), out).await,
            Command::Showtimes { movie, date } => self.showtimes(&movie, &date, out).await,
            Command::Seats(showing) => self.seats(&showing, out).await,
            Command::Book { showing, seats } => self.book(&showing, &seats, out).await,
            Command::Profile { ticket: None } => self.profile(out).await,
            Command::Profile { ticket: Some(id) } => self.ticket(&id, out).await,
            Command::Admin { action } => self.admin(action, out).await,
        }
    }

    async fn movies<W: Write>(
        &self,
        search: &str,
        genre: Option<&str>,
        out: &mut W,
    ) -> anyhow::Result<()> {
        let movies = self.catalog.search_movies(search, genre).await?;

        if movies.is_empty() {
            writeln!(out, "No movies found")?;
            return Ok(());
        }

        for m in movies {
            writeln!(
                out,
                "{:<14} {}  [{}]  {} min  {:.1}/10  {}",
                m.id,
                m.title,
                m.genre.join(", "),
                m.duration,
                m.rating,
                m.language
            )?;
        }
        Ok(())
    }

    async fn showtimes<W: Write>(&self, movie_id: &str, date: &str, out: &mut W) -> anyhow::Result<()> {
        let movie = self.catalog.find_movie(movie_id).await?;
        writeln!(out, "{} on {}", movie.title, date)?;

        let theaters = self.catalog.theaters_showing(movie_id, date).await?;
        if theaters.is_empty() {
            writeln!(out, "  no showtimes")?;
        }

        for t in theaters {
            writeln!(out, "  {} ({})", t.name, t.location)?;
            for st in self.catalog.showtimes_for(movie_id, &t.id, date).await? {
                writeln!(out, "    {:<5} {:>8}  from {}", st.id, st.time, st.price)?;
            }
        }
        Ok(())
    }

    async fn seats<W: Write>(&self, args: &ShowingArgs, out: &mut W) -> anyhow::Result<()> {
        let showing = self.catalog.resolve_showing(&args.movie, &args.showtime).await?;
        let selector = SeatSelector::for_showing(&showing, self.selection);

        writeln!(
            out,
            "{} | {} - {} | {} {}",
            showing.movie.title,
            showing.theater.name,
            showing.screen.name,
            showing.showtime.date,
            showing.showtime.time
        )?;
        render_seat_map(&selector, out)?;
        Ok(())
    }

    async fn book<W: Write>(
        &self,
        args: &ShowingArgs,
        labels: &[String],
        out: &mut W,
    ) -> anyhow::Result<()> {
        let showing = self.catalog.resolve_showing(&args.movie, &args.showtime).await?;
        let selector = Arc::new(Mutex::new(SeatSelector::for_showing(&showing, self.selection)));

        {
            let mut sel = selector.lock().await;
            for label in labels {
                let Some(seat_id) = sel.seat_id_for_label(label) else {
                    bail!("seat {} does not exist on {}", label, showing.screen.name);
                };

                match sel.toggle_seat(&seat_id) {
                    ToggleOutcome::Selected => debug!(%seat_id, "held"),
                    ToggleOutcome::Deselected => debug!(%seat_id, "released"),
                    ToggleOutcome::Ignored(reason) => bail!("seat {}: {}", label, reason),
                }
            }
        }

        // Leaving the seat step drops the timer; the draft is only written
        // for a hold that was still alive at that point.
        let (tx, mut rx) = mpsc::channel(8);
        let timer = spawn_countdown(selector.clone(), Duration::from_secs(1), tx);

        let snapshot = end_hold(&selector, timer, &mut rx).await?;
        let draft = self.finalizer.proceed_to_payment(&showing, &snapshot).await?;

        let price = self.finalizer.price(&draft);
        writeln!(out, "{} | {} | {} {}", draft.movie, draft.theater, draft.date, draft.showtime)?;
        writeln!(out, "Seats:            {}", snapshot_labels(&snapshot.selected))?;
        writeln!(out, "Subtotal:         {}", price.subtotal)?;
        writeln!(out, "Convenience fee:  {}", price.convenience_fee)?;
        writeln!(out, "Total:            {}", price.total)?;
        writeln!(out, "Processing payment...")?;
        out.flush()?;

        let booking = self.finalizer.confirm_payment(&draft.token).await?;

        info!(booking_id = %booking.id, total = booking.total_amount, "booked");
        writeln!(out, "Booking confirmed: {} ({} paid)", booking.id, booking.total_amount)?;
        Ok(())
    }

    async fn profile<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let user = self.finalizer.current_user().await?;
        let summary = self.finalizer.profile_summary().await?;

        writeln!(out, "{} <{}> {}", user.name, user.email, user.phone)?;
        writeln!(
            out,
            "Bookings: {}  Spent: {}  Confirmed: {}",
            summary.total_bookings, summary.total_spent, summary.confirmed
        )?;

        for b in self.finalizer.booking_history().await? {
            writeln!(
                out,
                "  {}  {}  movie {} show {}  seats {}  {}  {}",
                b.id,
                b.booking_date.format("%Y-%m-%d %H:%M"),
                b.movie_id,
                b.showtime_id,
                b.seats.join(","),
                b.total_amount,
                b.status
            )?;
        }
        Ok(())
    }

    async fn ticket<W: Write>(&self, booking_id: &str, out: &mut W) -> anyhow::Result<()> {
        let Some(ticket) = self.finalizer.ticket(booking_id).await? else {
            bail!("no booking {} in this profile", booking_id);
        };

        writeln!(out, "{}", serde_json::to_string_pretty(&ticket)?)?;
        Ok(())
    }

    async fn admin<W: Write>(&self, action: Option<AdminCommand>, out: &mut W) -> anyhow::Result<()> {
        match action {
            None => {
                let d = self.catalog.dashboard().await?;
                writeln!(out, "Movies:    {}", d.movies)?;
                writeln!(out, "Theaters:  {}", d.theaters)?;
                writeln!(out, "Screens:   {}", d.screens)?;
                writeln!(out, "Capacity:  {} seats ({} booked)", d.total_capacity, d.booked_seats)?;
            }
            Some(AdminCommand::AddMovie {
                title,
                genre,
                description,
                poster,
                duration,
                rating,
                language,
            }) => {
                let movie = self
                    .catalog
                    .add_movie(NewMovie {
                        title,
                        genre,
                        description,
                        poster,
                        duration,
                        rating,
                        language,
                    })
                    .await?;
                writeln!(out, "Added {} ({})", movie.title, movie.id)?;
            }
            Some(AdminCommand::DeleteMovie { id }) => {
                let movie = self.catalog.delete_movie(&id).await?;
                writeln!(out, "Deleted {} ({})", movie.title, movie.id)?;
            }
        }
        Ok(())
    }
}

/// Stop the hold timer and take the final selection. Fails if the hold
/// expired before the timer was stopped.
async fn end_hold(
    selector: &SharedSelector,
    timer: CountdownHandle,
    events: &mut mpsc::Receiver<CountdownEvent>,
) -> anyhow::Result<SelectionSnapshot> {
    timer.cancel();

    while let Ok(event) = events.try_recv() {
        if let CountdownEvent::Expired { released } = event {
            bail!("seat hold expired, {} seats released", released.len());
        }
    }

    Ok(selector.lock().await.snapshot())
}

fn snapshot_labels(seats: &[corelib::Seat]) -> String {
    seats.iter().map(|s| s.label()).collect::<Vec<_>>().join(", ")
}

fn render_seat_map<W: Write>(selector: &SeatSelector, out: &mut W) -> anyhow::Result<()> {
    let rows = selector.grid().rows();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);

    writeln!(out, "    {:^w$}", "SCREEN", w = width * 2)?;
    for row in rows {
        let label = row.first().map(|s| s.row.as_str()).unwrap_or("?");
        let cells: Vec<String> = row
            .iter()
            .map(|seat| selector.color_class_for(seat).symbol().to_string())
            .collect();
        writeln!(out, "{:>3} {}", label, cells.join(" "))?;
    }

    let legend: Vec<String> = [
        SeatColor::Regular,
        SeatColor::Premium,
        SeatColor::Vip,
        SeatColor::Selected,
        SeatColor::Booked,
        SeatColor::LockedByOther,
    ]
    .iter()
    .map(|c| format!("{} {}", c.symbol(), c.legend()))
    .collect();
    writeln!(out, "    {}", legend.join("  "))?;
    Ok(())
}
