use crate::infra::{parse_month_start, InMemoryReservationStore, TracingMailer};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use reservas::booking::calendar::{
    add_days, court_booking_dates, long_date, parse_date, same_month, short_date,
};
use reservas::booking::{
    AvailabilitySnapshot, BookingReceipt, BookingService, BookingServiceError,
    BookingSubmission, CourtDay, MonthlyHistory, ResourceKind, RoomDay,
};
use reservas::config::AppConfig;
use reservas::error::AppError;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type LocalService = BookingService<InMemoryReservationStore, TracingMailer>;

#[derive(Args, Debug)]
pub(crate) struct CourtAvailabilityArgs {
    /// First date to show (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Number of consecutive dates to show
    #[arg(long, default_value_t = 7)]
    pub(crate) days: u32,
    /// JSON array of reservation records to load
    #[arg(long)]
    pub(crate) records: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RoomAvailabilityArgs {
    /// Reference date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// JSON array of reservation records to load
    #[arg(long)]
    pub(crate) records: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ResourceArg {
    Court,
    Room,
}

impl From<ResourceArg> for ResourceKind {
    fn from(value: ResourceArg) -> Self {
        match value {
            ResourceArg::Court => ResourceKind::Court,
            ResourceArg::Room => ResourceKind::CommunityRoom,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct HistoryArgs {
    /// Which facility to list
    #[arg(long, value_enum, default_value = "court")]
    pub(crate) resource: ResourceArg,
    /// Month to list (YYYY-MM). Defaults to the current month.
    #[arg(long, value_parser = parse_month_start)]
    pub(crate) month: Option<NaiveDate>,
    /// JSON array of reservation records to load
    #[arg(long)]
    pub(crate) records: Option<PathBuf>,
    /// Write the month as CSV to this path (`-` for stdout) instead of printing it
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reference date (defaults to today).
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Export the court history of the reference month as CSV.
    #[arg(long)]
    pub(crate) history_csv: Option<PathBuf>,
}

fn local_service(records: Option<&Path>) -> Result<(LocalService, Arc<TracingMailer>), AppError> {
    let config = AppConfig::load()?;
    let store = match records {
        Some(path) => InMemoryReservationStore::from_json_file(path)?,
        None => InMemoryReservationStore::default(),
    };
    let mailer = Arc::new(TracingMailer::default());
    let service = BookingService::new(Arc::new(store), mailer.clone(), config.booking);
    Ok((service, mailer))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) async fn run_court_availability(args: CourtAvailabilityArgs) -> Result<(), AppError> {
    let (service, _) = local_service(args.records.as_deref())?;
    let start = args.start.unwrap_or_else(today);
    let snapshot = service.court_availability(start, args.days.max(1)).await;
    render_court_calendar(&snapshot);
    Ok(())
}

pub(crate) async fn run_room_availability(args: RoomAvailabilityArgs) -> Result<(), AppError> {
    let (service, _) = local_service(args.records.as_deref())?;
    let snapshot = service
        .room_availability(args.today.unwrap_or_else(today))
        .await;
    render_room_calendar(&snapshot);
    Ok(())
}

pub(crate) async fn run_history(args: HistoryArgs) -> Result<(), AppError> {
    let (service, _) = local_service(args.records.as_deref())?;
    let today = today();
    let history = match service
        .history(args.resource.into(), args.month.unwrap_or(today), today)
        .await
    {
        Ok(history) => history,
        Err(err) => {
            println!("Historial no disponible: {err}");
            return Ok(());
        }
    };

    match args.csv {
        Some(path) => export_history(&history, &path),
        None => {
            render_history(&history);
            Ok(())
        }
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, history_csv } = args;
    let today = today.unwrap_or_else(self::today);
    let (service, mailer) = local_service(None)?;

    println!("Reservas demo (hoy: {} {})", long_date(today), short_date(today));

    println!("\nPista de Pádel");
    let court_day = add_days(today, 1);
    let own = court_form(court_day, "11:30", 4, "2", "B", "Lucía", "Martín");
    let receipt = report_booking(&service, ResourceKind::Court, own, today).await;

    let adjacent = court_form(add_days(today, 2), "10:00", 4, "2", "B", "Lucía", "Martín");
    report_booking(&service, ResourceKind::Court, adjacent, today).await;

    let stranger = court_form(court_day, "11:30", 7, "Ático", "F", "Javier", "Ortega");
    report_booking(&service, ResourceKind::Court, stranger, today).await;

    let later = court_form(court_day, "17:00", 7, "Ático", "F", "Javier", "Ortega");
    report_booking(&service, ResourceKind::Court, later, today).await;

    let last_bookable = court_booking_dates(today, 7).pop().unwrap_or(today);
    let too_far = court_form(add_days(last_bookable, 1), "20:00", 6, "Bajo", "A", "Ana", "Gil");
    report_booking(&service, ResourceKind::Court, too_far, today).await;

    render_court_calendar(&service.court_availability(today, 3).await);

    println!("\nLocal Comunitario");
    let room_day = add_days(today, 15);
    let quota_day = if same_month(add_days(room_day, 1), room_day) {
        add_days(room_day, 1)
    } else {
        add_days(room_day, -1)
    };
    report_booking(
        &service,
        ResourceKind::CommunityRoom,
        room_form(room_day, 5, "3", "A"),
        today,
    )
    .await;
    report_booking(
        &service,
        ResourceKind::CommunityRoom,
        room_form(quota_day, 5, "3", "A"),
        today,
    )
    .await;
    report_booking(
        &service,
        ResourceKind::CommunityRoom,
        room_form(room_day, 8, "1", "C"),
        today,
    )
    .await;
    report_booking(
        &service,
        ResourceKind::CommunityRoom,
        room_form(today, 8, "1", "C"),
        today,
    )
    .await;

    let room = service.room_availability(today).await;
    println!(
        "- {} de {} días libres en la ventana de reserva",
        room.available_count(),
        room.days.len()
    );

    println!("\nCancelación");
    if let Some(receipt) = receipt {
        let code = receipt.record.cancellation_code.as_str();
        for attempt in 1..=2 {
            match service.cancel(code).await {
                Ok(record) => println!(
                    "- intento {attempt}: reserva del {} cancelada ({})",
                    short_date(record.date),
                    record.time_range()
                ),
                Err(err) => println!("- intento {attempt}: {err}"),
            }
        }
    }
    match service.resolve_cancellation("codigo-inexistente").await {
        Ok(record) => println!("- código inesperadamente válido: {}", record.id.0),
        Err(err) => println!("- código desconocido: {err}"),
    }

    println!("\nHistorial");
    match service.history(ResourceKind::Court, court_day, today).await {
        Ok(history) => {
            render_history(&history);
            if let Some(path) = history_csv {
                export_history(&history, &path)?;
                println!("- CSV exportado a {}", path.display());
            }
        }
        Err(err) => println!("- historial no disponible: {err}"),
    }

    println!("\nEmails de confirmación enviados: {}", mailer.delivered());
    Ok(())
}

async fn report_booking(
    service: &LocalService,
    kind: ResourceKind,
    form: BookingSubmission,
    today: NaiveDate,
) -> Option<BookingReceipt> {
    let who = format!(
        "Portal {} - {}{}",
        form.building.unwrap_or_default(),
        form.floor,
        form.unit
    );
    let when = match (form.date, form.slot.as_deref()) {
        (Some(date), Some(slot)) => format!("{} {}", short_date(date), slot),
        (Some(date), None) => short_date(date),
        (None, _) => "sin fecha".to_string(),
    };

    match service.book(kind, form, today).await {
        Ok(receipt) => {
            println!("- {who} reserva {when}: {}", receipt.acknowledgement());
            Some(receipt)
        }
        Err(BookingServiceError::Rejected(rejection)) => {
            println!("- {who} reserva {when}: rechazada [{}] {rejection}", rejection.code());
            None
        }
        Err(err) => {
            println!("- {who} reserva {when}: error {err}");
            None
        }
    }
}

fn court_form(
    date: NaiveDate,
    slot: &str,
    building: u8,
    floor: &str,
    unit: &str,
    first_name: &str,
    last_name: &str,
) -> BookingSubmission {
    BookingSubmission {
        date: Some(date),
        slot: Some(slot.to_string()),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        building: Some(building),
        floor: floor.to_string(),
        unit: unit.to_string(),
        phone: "600000000".to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        reason: None,
    }
}

fn room_form(date: NaiveDate, building: u8, floor: &str, unit: &str) -> BookingSubmission {
    BookingSubmission {
        slot: None,
        reason: Some("Cumpleaños".to_string()),
        ..court_form(date, "", building, floor, unit, "Marta", "Ruiz")
    }
}

fn render_court_calendar(snapshot: &AvailabilitySnapshot<CourtDay>) {
    if let Some(error) = &snapshot.error {
        println!("{error}");
        return;
    }
    for day in &snapshot.days {
        println!("{} {}", day.weekday, short_date(day.date));
        for entry in &day.slots {
            let status = match &entry.occupied_by {
                Some(who) => format!("{} ({})", who.name, who.dwelling),
                None => "libre".to_string(),
            };
            println!("  {} - {}  {}", entry.slot, entry.end, status);
        }
    }
    println!("Huecos libres: {}", snapshot.free_slot_count());
}

fn render_room_calendar(snapshot: &AvailabilitySnapshot<RoomDay>) {
    if let Some(error) = &snapshot.error {
        println!("{error}");
        return;
    }
    for day in &snapshot.days {
        let status = match &day.occupied_by {
            Some(who) => format!("{} ({})", who.name, who.dwelling),
            None => "libre".to_string(),
        };
        println!("{} {}  {}", day.weekday, short_date(day.date), status);
    }
    println!("Días libres: {}", snapshot.available_count());
}

fn render_history(history: &MonthlyHistory) {
    println!("{} - {}", history.kind.label(), history.heading);
    if history.is_empty() {
        println!("  No hay reservas este mes");
    }
    for (title, views) in [("Activas", &history.active), ("Canceladas", &history.cancelled)] {
        if views.is_empty() {
            continue;
        }
        println!("  {title}");
        for view in views {
            println!(
                "  - {} {} {} | {} ({})",
                view.weekday,
                short_date(view.date),
                view.time_range,
                view.occupant_name,
                view.dwelling
            );
        }
    }
}

fn export_history(history: &MonthlyHistory, path: &Path) -> Result<(), AppError> {
    if path == Path::new("-") {
        history.write_csv(std::io::stdout())?;
    } else {
        history.write_csv(File::create(path)?)?;
    }
    Ok(())
}
