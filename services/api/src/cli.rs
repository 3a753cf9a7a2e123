use crate::demo::{
    run_court_availability, run_demo, run_history, run_room_availability,
    CourtAvailabilityArgs, DemoArgs, HistoryArgs, RoomAvailabilityArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use reservas::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Reservas Comunidad",
    about = "Run and inspect the padel court and community room booking service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect the padel court calendar
    Court {
        #[command(subcommand)]
        command: CourtCommand,
    },
    /// Inspect the community room calendar
    Room {
        #[command(subcommand)]
        command: RoomCommand,
    },
    /// Print (or export as CSV) one month of reservations
    History(HistoryArgs),
    /// Walk through booking, rejection, cancellation and history with sample residents
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CourtCommand {
    /// Show free and occupied slots for a run of dates
    Availability(CourtAvailabilityArgs),
}

#[derive(Subcommand, Debug)]
enum RoomCommand {
    /// Show free and occupied dates in the booking window
    Availability(RoomAvailabilityArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the in-memory store from a JSON array of reservation records
    #[arg(long)]
    pub(crate) records: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Court {
            command: CourtCommand::Availability(args),
        } => run_court_availability(args).await,
        Command::Room {
            command: RoomCommand::Availability(args),
        } => run_room_availability(args).await,
        Command::History(args) => run_history(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
