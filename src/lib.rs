#![forbid(unsafe_code)]
//! Flotte — réservation des voitures de service.
//!
//! - Détection de conflits sur intervalles semi-ouverts [start, end).
//! - Blocage "indisponible aujourd'hui" limité au jour courant.
//! - Cycle de vie réservé → en cours → terminé / annulé, avec compteur.
//! - Rappels chauffeurs idempotents.
//! - Instants en UTC ; "aujourd'hui" calculé dans le fuseau configuré.

pub mod clock;
pub mod identity;
pub mod io;
pub mod model;
pub mod notification;
pub mod planner;
pub mod storage;
pub mod views;

pub use clock::{Clock, FixedClock, SystemClock};
pub use identity::{resolve_display_name, resolve_profile, Profile};
pub use model::{
    Booking, BookingId, BookingStatus, Car, CarId, Driver, DriverId, Employee, EmployeeId, Fleet,
    Identity, Notification, NotificationId, NotificationKind, Role, Snapshot, TripState,
};
pub use notification::{sweep_starting_soon, NotificationRenderer, TextRenderer, TripContext};
pub use planner::{BookingError, BookingRequest, Conflict, ErrorKind, Planner, PlannerOptions};
pub use storage::{JsonStorage, Storage};
