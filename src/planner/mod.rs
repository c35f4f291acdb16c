pub mod availability;
pub mod conflicts;
pub mod lifecycle;
mod mutate;
mod reserve;
pub mod timerange;
mod types;

pub use types::{BookingError, BookingRequest, Conflict, ErrorKind, PlannerOptions};

use crate::clock::Clock;
use crate::model::{BookingId, Car, CarId, Driver, DriverId, Employee, Fleet, Notification};
use crate::notification::{self, NotificationRenderer, TextRenderer};
use chrono::NaiveDate;
use tracing::info;

/// Planificateur : encapsule l'instantané de la flotte et applique les règles
/// de réservation. Un seul écrivain à la fois.
#[derive(Debug, Default)]
pub struct Planner<R = TextRenderer> {
    fleet: Fleet,
    opts: PlannerOptions,
    renderer: R,
}

impl Planner<TextRenderer> {
    pub fn new(opts: PlannerOptions) -> Self {
        Self::with_fleet(Fleet::default(), opts)
    }

    pub fn with_fleet(fleet: Fleet, opts: PlannerOptions) -> Self {
        Self {
            fleet,
            opts,
            renderer: TextRenderer,
        }
    }
}

impl<R: NotificationRenderer> Planner<R> {
    pub fn with_renderer(fleet: Fleet, opts: PlannerOptions, renderer: R) -> Self {
        Self {
            fleet,
            opts,
            renderer,
        }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }
    pub fn fleet_mut(&mut self) -> &mut Fleet {
        &mut self.fleet
    }
    pub fn into_fleet(self) -> Fleet {
        self.fleet
    }
    pub fn options(&self) -> &PlannerOptions {
        &self.opts
    }

    pub fn add_cars(&mut self, cars: Vec<Car>) {
        self.fleet.cars.extend(cars);
    }
    pub fn add_drivers(&mut self, drivers: Vec<Driver>) {
        self.fleet.drivers.extend(drivers);
    }
    pub fn add_employees(&mut self, employees: Vec<Employee>) {
        self.fleet.employees.extend(employees);
    }

    /// Date locale de "maintenant".
    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        timerange::local_date(clock.now(), &self.opts.offset)
    }

    /// Valide puis enregistre une réservation `reserved`.
    pub fn create_booking(
        &mut self,
        request: BookingRequest,
        clock: &dyn Clock,
    ) -> Result<BookingId, BookingError> {
        reserve::create_booking(self, request, clock)
    }

    pub fn start_trip(
        &mut self,
        booking: &BookingId,
        odometer: f64,
        clock: &dyn Clock,
    ) -> Result<(), BookingError> {
        mutate::start_trip(self, booking, odometer, clock)
    }

    /// Renvoie la distance parcourue.
    pub fn end_trip(
        &mut self,
        booking: &BookingId,
        odometer: f64,
        clock: &dyn Clock,
    ) -> Result<f64, BookingError> {
        mutate::end_trip(self, booking, odometer, clock)
    }

    pub fn cancel_booking(&mut self, booking: &BookingId) -> Result<(), BookingError> {
        mutate::cancel_booking(self, booking)
    }

    pub fn set_availability(
        &mut self,
        car: &CarId,
        available: bool,
        clock: &dyn Clock,
    ) -> Result<(), BookingError> {
        mutate::set_availability(self, car, available, clock)
    }

    /// Remet "disponible" les voitures bloquées un jour précédent.
    pub fn reset_stale_availability(&mut self, clock: &dyn Clock) -> usize {
        mutate::reset_stale_availability(self, clock)
    }

    pub fn assign_driver(&mut self, car: &CarId, driver: &DriverId) -> Result<(), BookingError> {
        mutate::assign_driver(self, car, driver)
    }

    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        conflicts::detect_conflicts(&self.fleet)
    }

    /// Une passe de rappels "départ imminent". Renvoie les notifications émises.
    pub fn sweep(&mut self, clock: &dyn Clock) -> Vec<Notification> {
        let emitted =
            notification::sweep_starting_soon(&self.fleet, clock.now(), &self.opts, &self.renderer);
        if !emitted.is_empty() {
            info!(count = emitted.len(), "sweep emitted reminders");
        }
        self.fleet.notifications.extend(emitted.iter().cloned());
        emitted
    }
}
