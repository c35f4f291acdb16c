use super::{availability, conflicts, timerange, BookingError, BookingRequest, Planner};
use crate::clock::Clock;
use crate::model::{Booking, BookingId, NotificationKind};
use crate::notification::{self, NotificationRenderer};
use tracing::{debug, info};

pub(super) fn create_booking<R: NotificationRenderer>(
    planner: &mut Planner<R>,
    request: BookingRequest,
    clock: &dyn Clock,
) -> Result<BookingId, BookingError> {
    let now = clock.now();
    let BookingRequest {
        car,
        requester,
        booked_by,
        start,
        end,
        purpose,
    } = request;

    if start < now {
        return Err(BookingError::Validation(
            "Start date cannot be in the past".to_string(),
        ));
    }
    if end <= start {
        return Err(BookingError::Validation(
            "End date must be after start date".to_string(),
        ));
    }

    let target = planner
        .fleet
        .find_car(&car)
        .ok_or_else(|| BookingError::UnknownCar(car.as_str().to_string()))?;

    let today = timerange::local_date(now, &planner.opts.offset);
    if let Err(err) = availability::is_bookable(target, start, end, today, &planner.opts.offset) {
        debug!(car = %car, %start, %end, "booking rejected: car unavailable today");
        return Err(err);
    }
    if let Err(err) = conflicts::check_conflict(start, end, planner.fleet.active_bookings_for_car(&car)) {
        debug!(car = %car, %start, %end, "booking rejected: time conflict");
        return Err(err);
    }

    let mut booking =
        Booking::new(car, requester, start, end, purpose, now).map_err(BookingError::Validation)?;
    booking.booked_by = booked_by;
    let id = booking.id.clone();

    let new_trip = notification::notify_trip(
        &planner.fleet,
        &booking,
        NotificationKind::NewTrip,
        now,
        &planner.opts,
        &planner.renderer,
    );
    info!(booking = %id, car = %booking.car, %start, %end, "booking reserved");
    planner.fleet.bookings.push(booking);
    planner.fleet.notifications.extend(new_trip);

    Ok(id)
}
