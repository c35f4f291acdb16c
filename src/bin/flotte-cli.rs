#![forbid(unsafe_code)]
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use flotte::{
    identity, io,
    model::{BookingId, CarId, Fleet, NotificationId},
    notification,
    planner::{lifecycle, BookingRequest, Planner, PlannerOptions},
    storage::{JsonStorage, Storage},
    views, Clock, FixedClock, SystemClock,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de réservation des voitures de service
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de la flotte
    #[arg(long, global = true, default_value = "fleet.json")]
    fleet: String,

    /// Fige "maintenant" (RFC3339), sinon horloge système
    #[arg(long, global = true)]
    now: Option<String>,

    /// Décalage horaire local pour "aujourd'hui"
    #[arg(long, global = true, default_value_t = 0, allow_hyphen_values = true)]
    utc_offset_hours: i32,

    /// Fenêtre du rappel "départ imminent" (minutes)
    #[arg(long, global = true, default_value_t = 50)]
    soon_min: i64,
    #[arg(long, global = true, default_value_t = 70)]
    soon_max: i64,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des voitures depuis un CSV
    ImportCars {
        #[arg(long)]
        csv: String,
    },

    /// Importer des chauffeurs depuis un CSV
    ImportDrivers {
        #[arg(long)]
        csv: String,
    },

    /// Importer des employés depuis un CSV
    ImportEmployees {
        #[arg(long)]
        csv: String,
    },

    /// Confier une voiture à un chauffeur
    AssignDriver {
        #[arg(long)]
        plate: String,
        #[arg(long)]
        license: String,
    },

    /// Réserver une voiture
    Book {
        #[arg(long)]
        plate: String,
        /// Email de la personne qui voyage
        #[arg(long)]
        email: String,
        /// RFC3339
        #[arg(long)]
        start: String,
        /// RFC3339
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "")]
        purpose: String,
        /// Email de l'administrateur qui réserve pour le compte d'autrui
        #[arg(long)]
        by: Option<String>,
    },

    /// Démarrer un trajet
    StartTrip {
        #[arg(long)]
        booking: String,
        #[arg(long, allow_hyphen_values = true)]
        odometer: String,
    },

    /// Terminer un trajet
    EndTrip {
        #[arg(long)]
        booking: String,
        #[arg(long, allow_hyphen_values = true)]
        odometer: String,
    },

    /// Annuler une réservation
    Cancel {
        #[arg(long)]
        booking: String,
    },

    /// Marquer une voiture disponible / indisponible aujourd'hui
    SetAvailable {
        #[arg(long)]
        plate: String,
        #[arg(long, action = ArgAction::Set)]
        available: bool,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier les chevauchements
    Check,

    /// Une passe de rappels "départ imminent"
    Sweep,

    /// Boîte de notifications d'un chauffeur
    Notifications {
        #[arg(long)]
        license: String,
        #[arg(long)]
        mark_read: bool,
    },
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse()
        .with_context(|| format!("invalid RFC3339 instant: {raw}"))
}

fn car_id(fleet: &Fleet, plate: &str) -> Result<CarId> {
    fleet
        .find_car_by_plate(plate)
        .map(|c| c.id.clone())
        .ok_or_else(|| anyhow!("unknown car plate: {plate}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let clock: Box<dyn Clock> = match &cli.now {
        Some(raw) => Box::new(FixedClock(parse_instant(raw)?)),
        None => Box::new(SystemClock),
    };
    let opts = PlannerOptions {
        soon_min_minutes: cli.soon_min,
        soon_max_minutes: cli.soon_max,
        ..PlannerOptions::with_utc_offset_hours(cli.utc_offset_hours)?
    };
    opts.validate()?;

    let storage = JsonStorage::open(&cli.fleet)?;
    let mut planner = Planner::with_fleet(storage.load_or_default()?, opts);
    planner.reset_stale_availability(clock.as_ref());

    let code = match cli.cmd {
        Commands::ImportCars { csv } => {
            let cars = io::import_cars_csv(csv)?;
            println!("imported {} car(s)", cars.len());
            planner.add_cars(cars);
            storage.save(planner.fleet())?;
            0
        }
        Commands::ImportDrivers { csv } => {
            let drivers = io::import_drivers_csv(csv, &planner.fleet().cars)?;
            println!("imported {} driver(s)", drivers.len());
            let links: Vec<_> = drivers
                .iter()
                .filter_map(|d| d.car.clone().map(|c| (c, d.id.clone())))
                .collect();
            planner.add_drivers(drivers);
            for (car, driver) in links {
                planner.assign_driver(&car, &driver)?;
            }
            storage.save(planner.fleet())?;
            0
        }
        Commands::ImportEmployees { csv } => {
            let employees = io::import_employees_csv(csv)?;
            println!("imported {} employee(s)", employees.len());
            planner.add_employees(employees);
            storage.save(planner.fleet())?;
            0
        }
        Commands::AssignDriver { plate, license } => {
            let car = car_id(planner.fleet(), &plate)?;
            let driver = planner
                .fleet()
                .drivers
                .iter()
                .find(|d| d.license == license)
                .map(|d| d.id.clone())
                .ok_or_else(|| anyhow!("unknown driver license: {license}"))?;
            planner.assign_driver(&car, &driver)?;
            storage.save(planner.fleet())?;
            0
        }
        Commands::Book {
            plate,
            email,
            start,
            end,
            purpose,
            by,
        } => {
            let car = car_id(planner.fleet(), &plate)?;
            let requester = identity::resolve_profile(&email, &planner.fleet().employees);
            let booked_by = match by {
                Some(admin) => {
                    let profile = identity::resolve_profile(&admin, &planner.fleet().employees);
                    if !profile.is_admin() {
                        bail!("{admin} is not an administrator");
                    }
                    Some(profile.identity())
                }
                None => None,
            };
            let request = BookingRequest {
                car,
                requester: requester.identity(),
                booked_by,
                start: parse_instant(&start)?,
                end: parse_instant(&end)?,
                purpose,
            };
            match planner.create_booking(request, clock.as_ref()) {
                Ok(id) => {
                    storage.save(planner.fleet())?;
                    println!("{id}");
                    0
                }
                Err(err) => {
                    eprintln!("rejected ({:?}): {err}", err.kind());
                    1
                }
            }
        }
        Commands::StartTrip { booking, odometer } => {
            let reading = lifecycle::parse_odometer(&odometer)?;
            planner.start_trip(&BookingId::new(booking), reading, clock.as_ref())?;
            storage.save(planner.fleet())?;
            println!("Trip started! Drive safely.");
            0
        }
        Commands::EndTrip { booking, odometer } => {
            let reading = lifecycle::parse_odometer(&odometer)?;
            let km = planner.end_trip(&BookingId::new(booking), reading, clock.as_ref())?;
            storage.save(planner.fleet())?;
            println!("Trip completed. Total distance: {km:.2} km");
            0
        }
        Commands::Cancel { booking } => {
            planner.cancel_booking(&BookingId::new(booking))?;
            storage.save(planner.fleet())?;
            println!("Booking cancelled.");
            0
        }
        Commands::SetAvailable { plate, available } => {
            let car = car_id(planner.fleet(), &plate)?;
            planner.set_availability(&car, available, clock.as_ref())?;
            storage.save(planner.fleet())?;
            0
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_fleet_json(path, planner.fleet())?;
            }
            if let Some(path) = out_csv {
                io::export_bookings_csv(path, planner.fleet())?;
            }
            let fleet = planner.fleet();
            let now = clock.now();
            for b in &fleet.bookings {
                let plate = fleet
                    .find_car(&b.car)
                    .map(|c| c.plate.as_str())
                    .unwrap_or("?");
                let badge = if b.is_active() {
                    views::trip_badge(b, now).label()
                } else {
                    "-"
                };
                println!(
                    "{} | {} | {} → {} | {} | {} | {}",
                    b.id,
                    plate,
                    b.start.to_rfc3339(),
                    b.end.to_rfc3339(),
                    identity::resolve_display_name(&b.requester, &fleet.employees),
                    b.state(),
                    badge
                );
            }
            let stats = views::dashboard_stats(fleet, now);
            println!(
                "cars: {} ({} available, {} in use) | active bookings: {} | drivers: {}",
                stats.total_cars,
                stats.available_cars,
                stats.cars_in_use,
                stats.active_bookings,
                stats.total_drivers
            );
            0
        }
        Commands::Check => {
            let conflicts = planner.detect_conflicts();
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    eprintln!(
                        "{} | {} ↔ {} | {} min",
                        c.car, c.booking_a, c.booking_b, c.overlap_minutes
                    );
                }
                // Code 2 = WARNING
                2
            }
        }
        Commands::Sweep => {
            let emitted = planner.sweep(clock.as_ref());
            storage.save(planner.fleet())?;
            println!("{} reminder(s) emitted", emitted.len());
            0
        }
        Commands::Notifications { license, mark_read } => {
            let driver = planner
                .fleet()
                .drivers
                .iter()
                .find(|d| d.license == license)
                .map(|d| d.id.clone())
                .ok_or_else(|| anyhow!("unknown driver license: {license}"))?;
            let fleet = planner.fleet_mut();
            let listed: Vec<NotificationId> = notification::inbox(fleet, &driver)
                .into_iter()
                .map(|n| {
                    let mark = if n.read { ' ' } else { '*' };
                    println!("{mark} {} | {} | {}", n.created_at.to_rfc3339(), n.title, n.message);
                    n.id.clone()
                })
                .collect();
            for id in &listed {
                notification::mark_delivered(fleet, id);
            }
            if mark_read {
                notification::mark_all_read(fleet, &driver);
            }
            storage.save(planner.fleet())?;
            0
        }
    };

    std::process::exit(code);
}
