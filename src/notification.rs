use crate::identity;
use crate::model::{
    Booking, BookingId, Car, DriverId, Fleet, Notification, NotificationId, NotificationKind,
    TripState,
};
use crate::planner::PlannerOptions;
use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info, warn};

/// Nombre de notifications affichées dans la boîte d'un chauffeur.
pub const INBOX_LIMIT: usize = 20;

/// Ce qu'un rendu a besoin de connaître d'un trajet.
#[derive(Debug, Clone, Copy)]
pub struct TripContext<'a> {
    pub booking: &'a Booking,
    pub car: &'a Car,
    pub user_name: &'a str,
    pub offset: FixedOffset,
}

/// Permet de customiser le texte des notifications (push, SMS, etc.).
pub trait NotificationRenderer {
    fn title(&self, kind: NotificationKind) -> String;
    fn message(&self, kind: NotificationKind, ctx: &TripContext<'_>) -> String;
}

/// Gabarit texte par défaut.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl NotificationRenderer for TextRenderer {
    fn title(&self, kind: NotificationKind) -> String {
        match kind {
            NotificationKind::NewTrip => "New Trip Assigned!",
            NotificationKind::StartingSoon => "Trip Starting Soon!",
            NotificationKind::TripStarted => "Trip Started!",
            NotificationKind::TripEnded => "Trip Completed!",
        }
        .to_string()
    }

    fn message(&self, kind: NotificationKind, ctx: &TripContext<'_>) -> String {
        let start = ctx.booking.start.with_timezone(&ctx.offset);
        match kind {
            NotificationKind::NewTrip => format!(
                "{user} booked {model} for {when}",
                user = ctx.user_name,
                model = ctx.car.model,
                when = start.format("%a, %b %-d, %H:%M"),
            ),
            NotificationKind::StartingSoon => format!(
                "Trip with {user} starts at {at}. Be ready!",
                user = ctx.user_name,
                at = start.format("%H:%M"),
            ),
            NotificationKind::TripStarted => format!(
                "{user} has started the trip. Drive safely!",
                user = ctx.user_name
            ),
            NotificationKind::TripEnded => {
                let distance = ctx
                    .booking
                    .distance
                    .map_or_else(|| "N/A".to_string(), |km| format!("{km:.2}"));
                format!(
                    "Trip with {user} ended. Distance: {distance} km",
                    user = ctx.user_name
                )
            }
        }
    }
}

/// Construit la notification `kind` pour le chauffeur de la voiture.
///
/// `None` si la voiture est inconnue, n'a pas de chauffeur, ou si ce
/// chauffeur n'existe plus dans la flotte.
pub fn notify_trip(
    fleet: &Fleet,
    booking: &Booking,
    kind: NotificationKind,
    now: DateTime<Utc>,
    opts: &PlannerOptions,
    renderer: &dyn NotificationRenderer,
) -> Option<Notification> {
    let Some(car) = fleet.find_car(&booking.car) else {
        warn!(booking = %booking.id, car = %booking.car, "notification skipped: unknown car");
        return None;
    };
    let Some(driver) = car.driver.clone() else {
        debug!(car = %car.id, ?kind, "no driver assigned to this car");
        return None;
    };
    if fleet.find_driver(&driver).is_none() {
        warn!(car = %car.id, driver = %driver, ?kind, "notification skipped: unknown driver");
        return None;
    }

    let user_name = identity::resolve_display_name(&booking.requester, &fleet.employees);
    let ctx = TripContext {
        booking,
        car,
        user_name: &user_name,
        offset: opts.offset,
    };
    Some(Notification {
        id: NotificationId::random(),
        driver,
        booking: Some(booking.id.clone()),
        kind,
        title: renderer.title(kind),
        message: renderer.message(kind, &ctx),
        read: false,
        delivered: false,
        created_at: now,
    })
}

fn already_notified(notifications: &[Notification], booking: &BookingId) -> bool {
    notifications
        .iter()
        .any(|n| n.kind == NotificationKind::StartingSoon && n.booking.as_ref() == Some(booking))
}

/// Passe périodique : un rappel "départ imminent" par réservation encore
/// non démarrée dont le départ tombe dans la fenêtre configurée.
///
/// Idempotente : une réservation déjà rappelée (dans `fleet` ou plus tôt dans
/// cette même passe) n'est jamais rappelée une seconde fois.
pub fn sweep_starting_soon(
    fleet: &Fleet,
    now: DateTime<Utc>,
    opts: &PlannerOptions,
    renderer: &dyn NotificationRenderer,
) -> Vec<Notification> {
    let mut out: Vec<Notification> = Vec::new();

    for booking in fleet
        .bookings
        .iter()
        .filter(|b| b.state() == TripState::Reserved)
    {
        let minutes = (booking.start - now).num_milliseconds() as f64 / 60_000.0;
        if minutes < opts.soon_min_minutes as f64 || minutes > opts.soon_max_minutes as f64 {
            continue;
        }
        if already_notified(&fleet.notifications, &booking.id)
            || already_notified(&out, &booking.id)
        {
            continue;
        }
        if let Some(n) = notify_trip(
            fleet,
            booking,
            NotificationKind::StartingSoon,
            now,
            opts,
            renderer,
        ) {
            info!(booking = %booking.id, driver = %n.driver, "starting-soon reminder emitted");
            out.push(n);
        }
    }

    out
}

/// Boîte d'un chauffeur, plus récentes d'abord.
pub fn inbox<'a>(fleet: &'a Fleet, driver: &DriverId) -> Vec<&'a Notification> {
    let mut list: Vec<&'a Notification> = fleet
        .notifications
        .iter()
        .filter(|n| &n.driver == driver)
        .collect();
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    list.truncate(INBOX_LIMIT);
    list
}

pub fn unread_count(fleet: &Fleet, driver: &DriverId) -> usize {
    inbox(fleet, driver).iter().filter(|n| !n.read).count()
}

/// Marque une notification comme lue. `false` si elle n'existe pas.
pub fn mark_read(fleet: &mut Fleet, id: &NotificationId) -> bool {
    match fleet.notifications.iter_mut().find(|n| &n.id == id) {
        Some(n) => {
            n.read = true;
            true
        }
        None => false,
    }
}

pub fn mark_all_read(fleet: &mut Fleet, driver: &DriverId) -> usize {
    let mut count = 0;
    for n in fleet
        .notifications
        .iter_mut()
        .filter(|n| &n.driver == driver && !n.read)
    {
        n.read = true;
        count += 1;
    }
    count
}

/// Non lues et pas encore affichées sur l'appareil.
pub fn pending_delivery<'a>(fleet: &'a Fleet, driver: &DriverId) -> Vec<&'a Notification> {
    inbox(fleet, driver)
        .into_iter()
        .filter(|n| !n.read && !n.delivered)
        .collect()
}

pub fn mark_delivered(fleet: &mut Fleet, id: &NotificationId) -> bool {
    match fleet.notifications.iter_mut().find(|n| &n.id == id) {
        Some(n) => {
            n.delivered = true;
            true
        }
        None => false,
    }
}
