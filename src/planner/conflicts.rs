use super::{timerange, BookingError, Conflict};
use crate::model::{Booking, Fleet};
use chrono::{DateTime, Utc};

/// Refuse `[start, end)` s'il chevauche une réservation active de la liste.
///
/// Les réservations terminées ou annulées sont ignorées, même si l'appelant
/// les a laissées dans la liste.
pub fn check_conflict<'a, I>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    existing: I,
) -> Result<(), BookingError>
where
    I: IntoIterator<Item = &'a Booking>,
{
    let hit = existing
        .into_iter()
        .filter(|b| b.is_active())
        .find(|b| timerange::overlaps(start, end, b.start, b.end));

    match hit {
        Some(b) => Err(BookingError::Conflict {
            booking: b.id.clone(),
            start: b.start,
            end: b.end,
        }),
        None => Ok(()),
    }
}

/// Audit complet : toutes les paires de réservations actives qui se
/// chevauchent sur une même voiture.
pub fn detect_conflicts(fleet: &Fleet) -> Vec<Conflict> {
    let mut out = Vec::new();

    for car in fleet.cars.iter() {
        let mut bookings: Vec<&Booking> = fleet.active_bookings_for_car(&car.id).collect();
        bookings.sort_by_key(|b| b.start);

        for (idx, a) in bookings.iter().enumerate() {
            for b in bookings.iter().skip(idx + 1) {
                if b.start >= a.end {
                    break;
                }
                if timerange::overlaps(a.start, a.end, b.start, b.end) {
                    let overlap = a.end.min(b.end) - a.start.max(b.start);
                    out.push(Conflict {
                        car: car.id.clone(),
                        booking_a: a.id.clone(),
                        booking_b: b.id.clone(),
                        overlap_minutes: overlap.num_minutes(),
                    });
                }
            }
        }
    }

    out
}
