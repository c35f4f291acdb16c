#![forbid(unsafe_code)]
use chrono::{TimeZone, Utc};
use flotte::{
    io,
    model::{Car, Snapshot},
    BookingRequest, FixedClock, JsonStorage, Planner, PlannerOptions, Storage, TripState,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn save_and_load_fleet_roundtrip() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("fleet.json")).unwrap();
    assert!(storage.load_or_default().unwrap().cars.is_empty());

    let mut p = Planner::new(PlannerOptions::default());
    let car = Car::new("Toyota Camry", "ABC-1234", 5);
    let car_id = car.id.clone();
    p.add_cars(vec![car]);
    let clock = FixedClock(Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap());
    let profile = flotte::resolve_profile("ghost@corp.test", &[]);
    let id = p
        .create_booking(
            BookingRequest {
                car: car_id,
                requester: profile.identity(),
                booked_by: None,
                start: Utc.with_ymd_and_hms(2025, 10, 1, 10, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap(),
                purpose: "meeting".into(),
            },
            &clock,
        )
        .unwrap();
    p.start_trip(&id, 42.5, &clock).unwrap();
    storage.save(p.fleet()).unwrap();

    let loaded = storage.load().unwrap();
    let booking = loaded.find_booking(&id).unwrap();
    assert_eq!(booking.state(), TripState::InTrip);
    assert_eq!(booking.start_odometer, Some(42.5));
}

fn load_single_booking(dir: &std::path::Path, extra: &str) -> anyhow::Result<flotte::Fleet> {
    let path = dir.join("fleet.json");
    fs::write(
        &path,
        format!(
            r#"{{
          "bookings": [{{
            "id": "b1", "car": "c1",
            "requester": {{"id": "u1", "email": "a@corp.test"}},
            "created_at": "2025-10-01T08:00:00Z",
            {extra}
          }}]
        }}"#
        ),
    )
    .unwrap();
    JsonStorage::open(&path)?.load()
}

#[test]
fn load_rejects_inconsistent_booking() {
    let dir = tempdir().unwrap();
    let window = r#""start": "2025-10-01T10:00:00Z", "end": "2025-10-01T12:00:00Z""#;
    let rejected = [
        r#""start": "2025-10-01T12:00:00Z", "end": "2025-10-01T10:00:00Z", "status": "active""#
            .to_string(),
        format!(
            r#"{window}, "status": "completed", "trip_started": true,
               "start_odometer": 100.0, "end_odometer": 97.0, "distance": -3.0"#
        ),
        format!(
            r#"{window}, "status": "completed", "trip_started": true,
               "start_odometer": 100.0, "end_odometer": 150.0, "distance": 42.0"#
        ),
        format!(
            r#"{window}, "status": "completed", "trip_started": true,
               "start_odometer": 100.0, "end_odometer": 150.0"#
        ),
        format!(
            r#"{window}, "status": "active", "trip_started": true, "start_odometer": -50.0"#
        ),
        format!(r#"{window}, "status": "active", "trip_started": true"#),
    ];
    for extra in &rejected {
        assert!(
            load_single_booking(dir.path(), extra).is_err(),
            "accepted: {extra}"
        );
    }

    let completed = load_single_booking(
        dir.path(),
        &format!(
            r#"{window}, "status": "completed", "trip_started": true,
               "start_odometer": 1000.0, "end_odometer": 1010.456, "distance": 10.46"#
        ),
    )
    .unwrap();
    assert_eq!(completed.bookings[0].state(), TripState::Completed);
}

#[test]
fn csv_imports_link_drivers_to_cars() {
    let dir = tempdir().unwrap();
    let cars_csv = dir.path().join("cars.csv");
    let drivers_csv = dir.path().join("drivers.csv");
    let employees_csv = dir.path().join("employees.csv");
    fs::write(&cars_csv, "model,plate,seats,available_today\nToyota Camry,ABC-1234,5,\nHonda CR-V,XYZ-5678,7,non\n").unwrap();
    fs::write(&drivers_csv, "name,phone,license,car_plate\nMichael,555-0101,DL1,abc-1234\nSara,555-0102,DL2,\n").unwrap();
    fs::write(&employees_csv, "name,email,role\nAlice,alice@corp.test,admin\nBob,bob@corp.test,\n").unwrap();

    let cars = io::import_cars_csv(&cars_csv).unwrap();
    assert_eq!(cars.len(), 2);
    assert!(cars[0].available_today);
    assert!(!cars[1].available_today);

    let drivers = io::import_drivers_csv(&drivers_csv, &cars).unwrap();
    assert_eq!(drivers[0].car.as_ref(), Some(&cars[0].id));
    assert!(drivers[1].car.is_none());

    let employees = io::import_employees_csv(&employees_csv).unwrap();
    assert!(employees[0].role.is_admin());
    assert!(!employees[1].role.is_admin());

    let mut p = Planner::new(PlannerOptions::default());
    p.fleet_mut().apply(Snapshot::Cars(cars));
    p.fleet_mut().apply(Snapshot::Drivers(drivers));
    assert_eq!(p.fleet().cars.len(), 2);
    assert_eq!(p.fleet().drivers.len(), 2);
}
