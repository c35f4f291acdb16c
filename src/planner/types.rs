use crate::model::{BookingId, CarId, Identity, TripState};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use thiserror::Error;

/// Options du planificateur
#[derive(Debug, Clone, Copy)]
pub struct PlannerOptions {
    /// Fuseau utilisé pour décider de "aujourd'hui".
    pub offset: FixedOffset,
    /// Fenêtre du rappel "départ imminent", en minutes avant le départ.
    pub soon_min_minutes: i64,
    pub soon_max_minutes: i64,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            soon_min_minutes: 50,
            soon_max_minutes: 70,
        }
    }
}

impl PlannerOptions {
    pub fn with_utc_offset_hours(hours: i32) -> Result<Self, BookingError> {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| BookingError::Validation(format!("invalid UTC offset: {hours}h")))?;
        Ok(Self {
            offset,
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), BookingError> {
        if self.soon_min_minutes > self.soon_max_minutes {
            return Err(BookingError::Validation(
                "starting-soon window: min must not exceed max".to_string(),
            ));
        }
        Ok(())
    }
}

/// Demande de réservation telle qu'elle arrive de l'UI ou de l'API.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub car: CarId,
    pub requester: Identity,
    /// Administrateur qui réserve pour le compte de `requester`.
    pub booked_by: Option<Identity>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub purpose: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Availability,
    IllegalTransition,
    Storage,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("time slot conflicts with existing booking {booking} ({start} → {end})")]
    Conflict {
        booking: BookingId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("car {car} is not available on {date}")]
    Availability { car: CarId, date: NaiveDate },
    #[error("cannot {action} a booking that is {from}")]
    IllegalTransition { from: TripState, action: &'static str },
    #[error("unknown car: {0}")]
    UnknownCar(String),
    #[error("unknown booking: {0}")]
    UnknownBooking(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::Validation(_)
            | BookingError::UnknownCar(_)
            | BookingError::UnknownBooking(_) => ErrorKind::Validation,
            BookingError::Conflict { .. } => ErrorKind::Conflict,
            BookingError::Availability { .. } => ErrorKind::Availability,
            BookingError::IllegalTransition { .. } => ErrorKind::IllegalTransition,
            BookingError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Deux réservations actives d'une même voiture qui se chevauchent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub car: CarId,
    pub booking_a: BookingId,
    pub booking_b: BookingId,
    pub overlap_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_offset_out_of_range_is_rejected() {
        let paris = PlannerOptions::with_utc_offset_hours(2).unwrap();
        assert_eq!(paris.offset.local_minus_utc(), 7200);
        assert_eq!(
            PlannerOptions::with_utc_offset_hours(-5).unwrap().offset.local_minus_utc(),
            -5 * 3600
        );
        for hours in [24, -24, 1_000_000, i32::MIN] {
            let err = PlannerOptions::with_utc_offset_hours(hours).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }
}
