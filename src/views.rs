//! Vues dérivées, recalculées à partir de l'instantané courant.

use crate::model::{Booking, Car, CarId, Driver, Fleet};
use chrono::{DateTime, Duration, Utc};

/// Badge d'un trajet sur le tableau de bord chauffeur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripBadge {
    InProgress,
    /// Démarré, heure de fin dépassée, pas encore clôturé.
    Completing,
    Overdue,
    StartingSoon,
    Today,
    Upcoming,
}

impl TripBadge {
    pub fn label(self) -> &'static str {
        match self {
            TripBadge::InProgress => "In Progress",
            TripBadge::Completing => "Completing",
            TripBadge::Overdue => "Overdue",
            TripBadge::StartingSoon => "Starting Soon!",
            TripBadge::Today => "Today",
            TripBadge::Upcoming => "Upcoming",
        }
    }
}

pub fn trip_badge(booking: &Booking, now: DateTime<Utc>) -> TripBadge {
    if booking.trip_started {
        return if now < booking.end {
            TripBadge::InProgress
        } else {
            TripBadge::Completing
        };
    }
    if booking.start < now {
        return TripBadge::Overdue;
    }
    let until = booking.start - now;
    if until < Duration::hours(1) {
        TripBadge::StartingSoon
    } else if until < Duration::hours(24) {
        TripBadge::Today
    } else {
        TripBadge::Upcoming
    }
}

/// Réservations actives d'une voiture, par date de départ.
pub fn upcoming_for_car<'a>(fleet: &'a Fleet, car: &CarId) -> Vec<&'a Booking> {
    let mut list: Vec<&Booking> = fleet
        .bookings
        .iter()
        .filter(|b| &b.car == car && b.is_active())
        .collect();
    list.sort_by_key(|b| b.start);
    list
}

/// Trajets du chauffeur : réservations actives de la voiture qui lui est confiée.
pub fn driver_trips<'a>(fleet: &'a Fleet, driver: &Driver) -> Vec<&'a Booking> {
    match &driver.car {
        Some(car) => upcoming_for_car(fleet, car),
        None => Vec::new(),
    }
}

pub fn is_in_use(fleet: &Fleet, car: &Car, now: DateTime<Utc>) -> bool {
    fleet
        .active_bookings_for_car(&car.id)
        .any(|b| b.trip_started && b.start <= now && now <= b.end)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_cars: usize,
    pub available_cars: usize,
    /// Voitures dont un trajet démarré couvre l'instant courant.
    pub cars_in_use: usize,
    pub active_bookings: usize,
    pub total_drivers: usize,
}

pub fn dashboard_stats(fleet: &Fleet, now: DateTime<Utc>) -> DashboardStats {
    let in_use = fleet
        .cars
        .iter()
        .filter(|c| is_in_use(fleet, c, now))
        .count();
    DashboardStats {
        total_cars: fleet.cars.len(),
        available_cars: fleet.cars.len() - in_use,
        cars_in_use: in_use,
        active_bookings: fleet.bookings.iter().filter(|b| b.is_active()).count(),
        total_drivers: fleet.drivers.len(),
    }
}
