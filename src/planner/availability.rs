use super::{timerange, BookingError};
use crate::model::Car;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Porte "disponible aujourd'hui" : une voiture bloquée ne peut pas être
/// réservée sur un créneau qui commence ou finit aujourd'hui. Les jours
/// suivants restent ouverts.
pub fn is_bookable(
    car: &Car,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    today: NaiveDate,
    offset: &FixedOffset,
) -> Result<(), BookingError> {
    if !car.blocks_date(today) {
        return Ok(());
    }
    if timerange::is_on_date(start, today, offset) || timerange::is_on_date(end, today, offset) {
        return Err(BookingError::Availability {
            car: car.id.clone(),
            date: today,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, TimeZone};

    fn blocked_car() -> Car {
        let mut car = Car::new("Honda CR-V", "XYZ-5678", 7);
        car.available_today = false;
        car
    }

    #[test]
    fn late_booking_touching_today_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 10, 1, 23, 50, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 10, 2, 0, 10, 0).unwrap();
        let err = is_bookable(&blocked_car(), start, end, today, &Utc.fix()).unwrap_err();
        assert!(matches!(err, BookingError::Availability { .. }));
    }

    #[test]
    fn tomorrow_is_open() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 10, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 10, 2, 1, 0, 0).unwrap();
        assert!(is_bookable(&blocked_car(), start, end, today, &Utc.fix()).is_ok());
    }

    #[test]
    fn available_car_is_never_gated() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let car = Car::new("Toyota Camry", "ABC-1234", 5);
        let start = Utc.with_ymd_and_hms(2025, 10, 1, 14, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 10, 1, 16, 0, 0).unwrap();
        assert!(is_bookable(&car, start, end, today, &Utc.fix()).is_ok());
    }
}
