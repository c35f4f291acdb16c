use super::{lifecycle, timerange, BookingError, Planner};
use crate::clock::Clock;
use crate::model::{BookingId, CarId, DriverId, NotificationKind};
use crate::notification::{self, NotificationRenderer};
use tracing::info;

fn find_booking_index<R>(planner: &Planner<R>, id: &BookingId) -> Result<usize, BookingError> {
    planner
        .fleet
        .bookings
        .iter()
        .position(|b| &b.id == id)
        .ok_or_else(|| BookingError::UnknownBooking(id.as_str().to_string()))
}

fn emit<R: NotificationRenderer>(
    planner: &mut Planner<R>,
    pos: usize,
    kind: NotificationKind,
    clock: &dyn Clock,
) {
    let n = notification::notify_trip(
        &planner.fleet,
        &planner.fleet.bookings[pos],
        kind,
        clock.now(),
        &planner.opts,
        &planner.renderer,
    );
    planner.fleet.notifications.extend(n);
}

pub(super) fn start_trip<R: NotificationRenderer>(
    planner: &mut Planner<R>,
    id: &BookingId,
    odometer: f64,
    clock: &dyn Clock,
) -> Result<(), BookingError> {
    let pos = find_booking_index(planner, id)?;
    lifecycle::start_trip(&mut planner.fleet.bookings[pos], odometer, clock.now())?;
    info!(booking = %id, odometer, "trip started");
    emit(planner, pos, NotificationKind::TripStarted, clock);
    Ok(())
}

pub(super) fn end_trip<R: NotificationRenderer>(
    planner: &mut Planner<R>,
    id: &BookingId,
    odometer: f64,
    clock: &dyn Clock,
) -> Result<f64, BookingError> {
    let pos = find_booking_index(planner, id)?;
    let km = lifecycle::end_trip(&mut planner.fleet.bookings[pos], odometer, clock.now())?;
    info!(booking = %id, odometer, distance = km, "trip completed");
    emit(planner, pos, NotificationKind::TripEnded, clock);
    Ok(km)
}

pub(super) fn cancel_booking<R>(planner: &mut Planner<R>, id: &BookingId) -> Result<(), BookingError> {
    let pos = find_booking_index(planner, id)?;
    lifecycle::cancel(&mut planner.fleet.bookings[pos])?;
    info!(booking = %id, "booking cancelled");
    Ok(())
}

pub(super) fn set_availability<R>(
    planner: &mut Planner<R>,
    car: &CarId,
    available: bool,
    clock: &dyn Clock,
) -> Result<(), BookingError> {
    let today = timerange::local_date(clock.now(), &planner.opts.offset);
    let target = planner
        .fleet
        .find_car_mut(car)
        .ok_or_else(|| BookingError::UnknownCar(car.as_str().to_string()))?;
    target.available_today = available;
    target.unavailable_since = if available { None } else { Some(today) };
    info!(car = %car, available, %today, "availability changed");
    Ok(())
}

pub(super) fn reset_stale_availability<R>(planner: &mut Planner<R>, clock: &dyn Clock) -> usize {
    let today = timerange::local_date(clock.now(), &planner.opts.offset);
    let mut reset = 0;
    for car in planner.fleet.cars.iter_mut() {
        let stale = !car.available_today && car.unavailable_since.is_some_and(|d| d < today);
        if stale {
            car.available_today = true;
            car.unavailable_since = None;
            reset += 1;
        }
    }
    if reset > 0 {
        info!(count = reset, %today, "stale availability flags reset");
    }
    reset
}

/// Lie une voiture et un chauffeur dans les deux sens ; l'ancien chauffeur
/// de la voiture est détaché.
pub(super) fn assign_driver<R>(
    planner: &mut Planner<R>,
    car: &CarId,
    driver: &DriverId,
) -> Result<(), BookingError> {
    if planner.fleet.find_driver(driver).is_none() {
        return Err(BookingError::Validation(format!("unknown driver: {driver}")));
    }
    let target = planner
        .fleet
        .find_car_mut(car)
        .ok_or_else(|| BookingError::UnknownCar(car.as_str().to_string()))?;
    let previous = target.driver.replace(driver.clone());

    for other in planner.fleet.cars.iter_mut() {
        if &other.id != car && other.driver.as_ref() == Some(driver) {
            other.driver = None;
        }
    }
    for d in planner.fleet.drivers.iter_mut() {
        if &d.id == driver {
            d.car = Some(car.clone());
        } else if previous.as_ref() == Some(&d.id) && d.car.as_ref() == Some(car) {
            d.car = None;
        }
    }
    info!(car = %car, driver = %driver, "driver assigned");
    Ok(())
}
