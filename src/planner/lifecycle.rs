//! Cycle de vie d'une réservation :
//!
//! ```text
//! reserved --start_trip--> in_trip --end_trip--> completed
//!     \--cancel--> cancelled
//! ```
//!
//! Une transition refusée ne modifie jamais la réservation.

use super::{timerange, BookingError};
use crate::model::{Booking, BookingStatus, TripState};
use chrono::{DateTime, Utc};

/// Lit un relevé de compteur saisi à la main.
pub fn parse_odometer(raw: &str) -> Result<f64, BookingError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| BookingError::Validation(format!("odometer reading is not a number: {raw:?}")))?;
    check_reading(value)
}

fn check_reading(value: f64) -> Result<f64, BookingError> {
    if !value.is_finite() || value < 0.0 {
        return Err(BookingError::Validation(format!(
            "odometer reading must be a non-negative number, got {value}"
        )));
    }
    Ok(value)
}

/// Distance parcourue, arrondie au centième.
pub fn distance(start: f64, end: f64) -> Result<f64, BookingError> {
    if end < start {
        return Err(BookingError::Validation(format!(
            "end reading ({end} km) cannot be less than start reading ({start} km)"
        )));
    }
    Ok(timerange::round2(end - start))
}

pub fn start_trip(
    booking: &mut Booking,
    odometer: f64,
    at: DateTime<Utc>,
) -> Result<(), BookingError> {
    let from = booking.state();
    if from != TripState::Reserved {
        return Err(BookingError::IllegalTransition {
            from,
            action: "start",
        });
    }
    let odometer = check_reading(odometer)?;

    booking.trip_started = true;
    booking.start_odometer = Some(odometer);
    booking.trip_started_at = Some(at);
    Ok(())
}

/// Termine le trajet et renvoie la distance.
pub fn end_trip(
    booking: &mut Booking,
    odometer: f64,
    at: DateTime<Utc>,
) -> Result<f64, BookingError> {
    let from = booking.state();
    if from != TripState::InTrip {
        return Err(BookingError::IllegalTransition { from, action: "end" });
    }
    let odometer = check_reading(odometer)?;
    let start = booking.start_odometer.ok_or_else(|| {
        BookingError::Validation(format!("booking {} has no start reading", booking.id))
    })?;
    let km = distance(start, odometer)?;

    booking.status = BookingStatus::Completed;
    booking.end_odometer = Some(odometer);
    booking.distance = Some(km);
    booking.trip_ended_at = Some(at);
    Ok(km)
}

/// Seule une réservation pas encore démarrée peut être annulée.
pub fn cancel(booking: &mut Booking) -> Result<(), BookingError> {
    let from = booking.state();
    if from != TripState::Reserved {
        return Err(BookingError::IllegalTransition {
            from,
            action: "cancel",
        });
    }
    booking.status = BookingStatus::Cancelled;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CarId, EmployeeId, Identity};
    use chrono::TimeZone;

    fn reserved() -> Booking {
        let t0 = Utc.with_ymd_and_hms(2025, 10, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
        let who = Identity {
            id: EmployeeId::new("u1"),
            name: None,
            email: "bob@corp.test".into(),
        };
        Booking::new(CarId::new("c1"), who, t0, t1, "client visit".into(), t0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 10, 5, 0).unwrap()
    }

    #[test]
    fn full_trip_computes_distance() {
        let mut b = reserved();
        start_trip(&mut b, 1000.0, now()).unwrap();
        assert_eq!(b.state(), TripState::InTrip);
        let km = end_trip(&mut b, 1120.0, now()).unwrap();
        assert_eq!(km, 120.0);
        assert_eq!(b.state(), TripState::Completed);
        assert_eq!(b.distance, Some(120.0));
    }

    #[test]
    fn lower_end_reading_leaves_booking_untouched() {
        let mut b = reserved();
        start_trip(&mut b, 1000.0, now()).unwrap();
        let before = b.clone();
        let err = end_trip(&mut b, 999.5, now()).unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert_eq!(b, before);
    }

    #[test]
    fn negative_start_reading_is_rejected() {
        let mut b = reserved();
        assert!(start_trip(&mut b, -1.0, now()).is_err());
        assert_eq!(b.state(), TripState::Reserved);
        assert!(b.start_odometer.is_none());
    }

    #[test]
    fn cannot_cancel_a_started_trip() {
        let mut b = reserved();
        start_trip(&mut b, 10.0, now()).unwrap();
        let err = cancel(&mut b).unwrap_err();
        assert!(matches!(
            err,
            BookingError::IllegalTransition { from: TripState::InTrip, .. }
        ));
        assert_eq!(b.state(), TripState::InTrip);
    }

    #[test]
    fn terminal_states_refuse_everything() {
        let mut b = reserved();
        cancel(&mut b).unwrap();
        assert!(start_trip(&mut b, 1.0, now()).is_err());
        assert!(end_trip(&mut b, 1.0, now()).is_err());
        assert!(cancel(&mut b).is_err());
    }

    #[test]
    fn odometer_text_is_validated() {
        assert_eq!(parse_odometer(" 1234.5 ").unwrap(), 1234.5);
        assert!(parse_odometer("abc").is_err());
        assert!(parse_odometer("-3").is_err());
        assert!(parse_odometer("NaN").is_err());
        assert!(parse_odometer("inf").is_err());
    }

    #[test]
    fn distance_is_rounded() {
        assert_eq!(distance(1000.0, 1010.456).unwrap(), 10.46);
        assert!(distance(10.0, 9.0).is_err());
    }
}
