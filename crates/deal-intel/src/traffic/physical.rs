use super::domain::{PhysicalComponent, PropertyProfile};

pub const PEDESTRIANS_PER_VEHICLE: f64 = 0.015;
pub const BASE_CAPTURE_RATE: f64 = 0.05;
pub const MAX_CAPTURE_RATE: f64 = 0.25;
pub const REFERENCE_FRONTAGE_FT: f64 = 100.0;
pub const CORNER_CAPTURE_BONUS: f64 = 1.3;
pub const RESIDENTIAL_WEEKLY_VISITS_PER_UNIT: f64 = 0.35;
pub const WORKER_WEEKLY_VISITS: f64 = 0.25;
pub const TRANSIT_CAPTURE_RATE: f64 = 0.04;
pub const TRANSIT_NEAR_FT: f64 = 500.0;
pub const TRANSIT_WALKABLE_FT: f64 = 1320.0;

/// Weekly walk-ins explained by the site itself.
pub fn physical_component(profile: &PropertyProfile) -> PhysicalComponent {
    let daily_pedestrians = match profile.average_daily_traffic {
        Some(adt) => adt as f64 * PEDESTRIANS_PER_VEHICLE,
        None => profile.road_class.baseline_daily_pedestrians(),
    };
    let sidewalk_factor = 0.5 + unit(profile.sidewalk_score);
    let street_pedestrians = daily_pedestrians * sidewalk_factor * 7.0;

    let capture_rate = capture_rate(profile);
    let street_walkins = street_pedestrians * capture_rate;
    let residential_walkins =
        profile.residential_units_nearby as f64 * RESIDENTIAL_WEEKLY_VISITS_PER_UNIT;
    let worker_walkins = profile.workers_nearby as f64 * WORKER_WEEKLY_VISITS;
    let transit_walkins = transit_walkins(profile);

    PhysicalComponent {
        street_pedestrians,
        capture_rate,
        street_walkins,
        residential_walkins,
        worker_walkins,
        transit_walkins,
        total: street_walkins + residential_walkins + worker_walkins + transit_walkins,
    }
}

pub fn capture_rate(profile: &PropertyProfile) -> f64 {
    let frontage_factor = (profile.frontage_ft.max(0.0) / REFERENCE_FRONTAGE_FT).clamp(0.5, 2.5);
    let corner_factor = if profile.corner_lot {
        CORNER_CAPTURE_BONUS
    } else {
        1.0
    };
    let signage_factor = 0.5 + unit(profile.signage_score);
    let entrance_factor = 0.5 + unit(profile.entrance_score);

    (BASE_CAPTURE_RATE * frontage_factor * corner_factor * signage_factor * entrance_factor)
        .min(MAX_CAPTURE_RATE)
}

fn transit_walkins(profile: &PropertyProfile) -> f64 {
    let (Some(distance), Some(ridership)) =
        (profile.transit_distance_ft, profile.transit_daily_ridership)
    else {
        return 0.0;
    };

    let decay = if distance <= TRANSIT_NEAR_FT {
        1.0
    } else if distance <= TRANSIT_WALKABLE_FT {
        0.6
    } else {
        return 0.0;
    };

    ridership as f64 * 7.0 * TRANSIT_CAPTURE_RATE * decay
}

fn unit(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
