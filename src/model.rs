use crate::planner::timerange::round2;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Car
    CarId
);
string_id!(
    /// Identifiant fort pour Driver
    DriverId
);
string_id!(
    /// Identifiant fort pour Employee (uid du fournisseur d'identité)
    EmployeeId
);
string_id!(
    /// Identifiant fort pour Booking
    BookingId
);
string_id!(NotificationId);

/// Voiture de service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub model: String,
    pub plate: String,
    pub seats: u8,
    #[serde(default)]
    pub driver: Option<DriverId>,
    #[serde(default = "default_true")]
    pub available_today: bool,
    /// Jour où la voiture a été marquée indisponible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable_since: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}

impl Car {
    pub fn new<M: Into<String>, P: Into<String>>(model: M, plate: P, seats: u8) -> Self {
        Self {
            id: CarId::random(),
            model: model.into(),
            plate: plate.into(),
            seats,
            driver: None,
            available_today: true,
            unavailable_since: None,
        }
    }

    /// Le drapeau ne bloque que le jour courant ; un marqueur daté d'un
    /// jour passé est périmé et ne bloque plus rien.
    pub fn blocks_date(&self, today: NaiveDate) -> bool {
        !self.available_today && self.unavailable_since.map_or(true, |since| since == today)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub phone: String,
    pub license: String,
    #[serde(default)]
    pub car: Option<CarId>,
}

impl Driver {
    pub fn new<N: Into<String>, P: Into<String>, L: Into<String>>(
        name: N,
        phone: P,
        license: L,
    ) -> Self {
        Self {
            id: DriverId::random(),
            name: name.into(),
            phone: phone.into(),
            license: license.into(),
            car: None,
        }
    }
}

/// Rôle applicatif. `Manager` est toléré mais traité comme un employé.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Employee,
    Manager,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl Employee {
    pub fn new<N: Into<String>, E: Into<String>>(name: N, email: E, role: Role) -> Self {
        Self {
            id: EmployeeId::random(),
            name: name.into(),
            email: email.into(),
            role,
        }
    }
}

/// Personne qui réserve (ou qui réserve pour le compte d'un autre).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: EmployeeId,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

impl From<&Employee> for Identity {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id.clone(),
            name: Some(e.name.clone()),
            email: e.email.clone(),
        }
    }
}

/// Statut persisté d'une réservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

/// État du cycle de vie, dérivé de `status` + `trip_started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripState {
    Reserved,
    InTrip,
    Completed,
    Cancelled,
}

impl TripState {
    pub fn is_active(self) -> bool {
        matches!(self, TripState::Reserved | TripState::InTrip)
    }
}

impl fmt::Display for TripState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TripState::Reserved => "reserved",
            TripState::InTrip => "in_trip",
            TripState::Completed => "completed",
            TripState::Cancelled => "cancelled",
        })
    }
}

/// Réservation d'une voiture sur l'intervalle UTC [start, end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub car: CarId,
    pub requester: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booked_by: Option<Identity>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub purpose: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub trip_started: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_odometer: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_odometer: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Crée une réservation `reserved` en validant que `end > start`.
    pub fn new(
        car: CarId,
        requester: Identity,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        purpose: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, String> {
        if end <= start {
            return Err("end must be strictly after start".to_string());
        }
        Ok(Self {
            id: BookingId::random(),
            car,
            requester,
            booked_by: None,
            start,
            end,
            purpose,
            status: BookingStatus::Active,
            trip_started: false,
            start_odometer: None,
            end_odometer: None,
            distance: None,
            trip_started_at: None,
            trip_ended_at: None,
            created_at,
        })
    }

    pub fn state(&self) -> TripState {
        match (self.status, self.trip_started) {
            (BookingStatus::Active, false) => TripState::Reserved,
            (BookingStatus::Active, true) => TripState::InTrip,
            (BookingStatus::Completed, _) => TripState::Completed,
            (BookingStatus::Cancelled, _) => TripState::Cancelled,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Durée en minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Contrôle des données reçues du stockage.
    pub fn validate(&self) -> Result<(), String> {
        if self.end <= self.start {
            return Err(format!("booking {}: end must be after start", self.id));
        }
        for (label, reading) in [
            ("start_odometer", self.start_odometer),
            ("end_odometer", self.end_odometer),
            ("distance", self.distance),
        ] {
            if let Some(value) = reading {
                if !value.is_finite() || value < 0.0 {
                    return Err(format!("booking {}: invalid {label}: {value}", self.id));
                }
            }
        }
        match self.state() {
            TripState::InTrip if self.start_odometer.is_none() => {
                Err(format!("booking {}: trip started without odometer", self.id))
            }
            TripState::Completed => match (self.start_odometer, self.end_odometer) {
                (Some(s), Some(e)) if e >= s => {
                    let expected = round2(e - s);
                    match self.distance {
                        Some(d) if (d - expected).abs() < 1e-9 => Ok(()),
                        _ => Err(format!(
                            "booking {}: distance does not match odometer readings (expected {expected:.2})",
                            self.id
                        )),
                    }
                }
                _ => Err(format!("booking {}: inconsistent odometer readings", self.id)),
            },
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewTrip,
    StartingSoon,
    TripStarted,
    TripEnded,
}

/// Notification destinée à un chauffeur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub driver: DriverId,
    #[serde(default)]
    pub booking: Option<BookingId>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    /// Déjà affichée sur l'appareil du chauffeur.
    #[serde(default)]
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
}

/// Remplacement complet d'une collection, tel que livré par un abonnement.
#[derive(Debug, Clone)]
pub enum Snapshot {
    Cars(Vec<Car>),
    Drivers(Vec<Driver>),
    Employees(Vec<Employee>),
    Bookings(Vec<Booking>),
    Notifications(Vec<Notification>),
}

/// État complet de la flotte
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fleet {
    #[serde(default)]
    pub cars: Vec<Car>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl Fleet {
    pub fn find_car(&self, id: &CarId) -> Option<&Car> {
        self.cars.iter().find(|c| &c.id == id)
    }
    pub fn find_car_mut(&mut self, id: &CarId) -> Option<&mut Car> {
        self.cars.iter_mut().find(|c| &c.id == id)
    }
    pub fn find_car_by_plate<'a>(&'a self, plate: &str) -> Option<&'a Car> {
        self.cars.iter().find(|c| c.plate.eq_ignore_ascii_case(plate))
    }
    pub fn find_driver(&self, id: &DriverId) -> Option<&Driver> {
        self.drivers.iter().find(|d| &d.id == id)
    }
    pub fn find_employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }
    pub fn find_employee_by_email<'a>(&'a self, email: &str) -> Option<&'a Employee> {
        self.employees
            .iter()
            .find(|e| e.email.eq_ignore_ascii_case(email))
    }
    pub fn find_booking(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| &b.id == id)
    }
    pub fn find_booking_mut(&mut self, id: &BookingId) -> Option<&mut Booking> {
        self.bookings.iter_mut().find(|b| &b.id == id)
    }

    /// Chauffeur d'une voiture : référence portée par la voiture, sinon
    /// chauffeur qui déclare la voiture.
    pub fn driver_for_car<'a>(&'a self, car: &Car) -> Option<&'a Driver> {
        match &car.driver {
            Some(id) => self.find_driver(id),
            None => self
                .drivers
                .iter()
                .find(|d| d.car.as_ref() == Some(&car.id)),
        }
    }

    /// Réservations actives (réservées ou en cours) d'une voiture.
    pub fn active_bookings_for_car<'a>(
        &'a self,
        car: &'a CarId,
    ) -> impl Iterator<Item = &'a Booking> + 'a {
        self.bookings
            .iter()
            .filter(move |b| &b.car == car && b.is_active())
    }

    pub fn bookings_for_user<'a>(
        &'a self,
        user: &'a EmployeeId,
    ) -> impl Iterator<Item = &'a Booking> + 'a {
        self.bookings.iter().filter(move |b| &b.requester.id == user)
    }

    /// Applique un instantané : la collection visée est remplacée en bloc.
    pub fn apply(&mut self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Cars(cars) => self.cars = cars,
            Snapshot::Drivers(drivers) => self.drivers = drivers,
            Snapshot::Employees(employees) => self.employees = employees,
            Snapshot::Bookings(bookings) => self.bookings = bookings,
            Snapshot::Notifications(notifications) => self.notifications = notifications,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for booking in &self.bookings {
            booking.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn identity() -> Identity {
        Identity {
            id: EmployeeId::new("u1"),
            name: Some("Alice".into()),
            email: "alice@corp.test".into(),
        }
    }

    #[test]
    fn booking_rejects_empty_range() {
        let t = Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap();
        assert!(Booking::new(CarId::new("c"), identity(), t, t, String::new(), t).is_err());
    }

    #[test]
    fn state_follows_status_and_trip_flag() {
        let t0 = Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap();
        let mut b = Booking::new(CarId::new("c"), identity(), t0, t1, String::new(), t0).unwrap();
        assert_eq!(b.state(), TripState::Reserved);
        b.trip_started = true;
        assert_eq!(b.state(), TripState::InTrip);
        b.status = BookingStatus::Cancelled;
        assert_eq!(b.state(), TripState::Cancelled);
        assert!(!b.is_active());
    }

    #[test]
    fn stale_unavailability_marker_does_not_block() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
        let mut car = Car::new("Toyota Camry", "ABC-1234", 5);
        car.available_today = false;
        assert!(car.blocks_date(today));
        car.unavailable_since = today.pred_opt();
        assert!(!car.blocks_date(today));
        car.unavailable_since = Some(today);
        assert!(car.blocks_date(today));
    }

    #[test]
    fn snapshot_replaces_whole_collection() {
        let mut fleet = Fleet::default();
        fleet.cars.push(Car::new("A", "AAA", 4));
        fleet.apply(Snapshot::Cars(vec![Car::new("B", "BBB", 5), Car::new("C", "CCC", 7)]));
        assert_eq!(fleet.cars.len(), 2);
        assert!(fleet.find_car_by_plate("aaa").is_none());
        assert!(fleet.find_car_by_plate("bbb").is_some());
    }
}
