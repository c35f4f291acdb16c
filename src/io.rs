use crate::identity;
use crate::model::{Car, Driver, Employee, Fleet, Role};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de voitures depuis CSV: header `model,plate,seats[,available_today]`
pub fn import_cars_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Car>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let model = rec.get(0).context("missing model")?.trim();
        let plate = rec.get(1).context("missing plate")?.trim();
        if model.is_empty() || plate.is_empty() {
            bail!("invalid car row (empty)");
        }
        let seats: u8 = rec
            .get(2)
            .context("missing seats")?
            .trim()
            .parse()
            .with_context(|| format!("invalid seats value for plate {plate}"))?;
        let mut car = Car::new(model, plate, seats);
        if let Some(flag) = rec.get(3) {
            let flag = flag.trim();
            if !flag.is_empty() {
                car.available_today = parse_bool(flag)
                    .with_context(|| format!("invalid available_today value for plate {plate}"))?;
            }
        }
        out.push(car);
    }
    Ok(out)
}

/// Import de chauffeurs: header `name,phone,license[,car_plate]`.
/// La plaque est résolue parmi `cars`.
pub fn import_drivers_csv<P: AsRef<Path>>(path: P, cars: &[Car]) -> anyhow::Result<Vec<Driver>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let phone = rec.get(1).context("missing phone")?.trim();
        let license = rec.get(2).context("missing license")?.trim();
        if name.is_empty() || license.is_empty() {
            bail!("invalid driver row (empty)");
        }
        let mut driver = Driver::new(name, phone, license);
        if let Some(plate) = rec.get(3) {
            let plate = plate.trim();
            if !plate.is_empty() {
                let car = cars
                    .iter()
                    .find(|c| c.plate.eq_ignore_ascii_case(plate))
                    .with_context(|| format!("unknown car plate {plate} for driver {name}"))?;
                driver.car = Some(car.id.clone());
            }
        }
        out.push(driver);
    }
    Ok(out)
}

/// Import d'employés: header `name,email[,role]`
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let email = rec.get(1).context("missing email")?.trim();
        if name.is_empty() || !email.contains('@') {
            bail!("invalid employee row: {name:?} <{email}>");
        }
        let role = match rec.get(2).map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                parse_role(raw).with_context(|| format!("invalid role for {email}"))?
            }
            _ => Role::Employee,
        };
        out.push(Employee::new(name, email, role));
    }
    Ok(out)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn parse_role(s: &str) -> anyhow::Result<Role> {
    match s.to_ascii_lowercase().as_str() {
        "admin" => Ok(Role::Admin),
        "employee" => Ok(Role::Employee),
        "manager" => Ok(Role::Manager),
        other => bail!("unknown role {other}"),
    }
}

/// Export JSON de la flotte (jolie mise en forme)
pub fn export_fleet_json<P: AsRef<Path>>(path: P, fleet: &Fleet) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(fleet)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des réservations:
/// header `id,car_plate,user,start,end,state,distance_km`
pub fn export_bookings_csv<P: AsRef<Path>>(path: P, fleet: &Fleet) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "car_plate", "user", "start", "end", "state", "distance_km"])?;
    for b in &fleet.bookings {
        let plate = fleet.find_car(&b.car).map(|c| c.plate.as_str()).unwrap_or("");
        let user = identity::resolve_display_name(&b.requester, &fleet.employees);
        let start = b.start.to_rfc3339();
        let end = b.end.to_rfc3339();
        let state = b.state().to_string();
        let distance = b.distance.map(|km| format!("{km:.2}")).unwrap_or_default();
        w.write_record([
            b.id.as_str(),
            plate,
            user.as_str(),
            start.as_str(),
            end.as_str(),
            state.as_str(),
            distance.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
