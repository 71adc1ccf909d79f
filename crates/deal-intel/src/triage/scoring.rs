use super::domain::{PropertySignals, TradeArea, TriageScores, TriageStatus};

pub const MAX_LOCATION_SCORE: u8 = 15;
pub const MAX_MARKET_SCORE: u8 = 15;
pub const MAX_PROPERTY_SCORE: u8 = 20;
/// Neutral sub-score used when no trade area could be resolved.
pub const NEUTRAL_SCORE: u8 = 5;

pub const HOT_THRESHOLD: u8 = 35;
pub const WARM_THRESHOLD: u8 = 25;
pub const WATCH_THRESHOLD: u8 = 15;

pub fn location_score(trade_area: Option<&TradeArea>) -> u8 {
    let Some(area) = trade_area else {
        return NEUTRAL_SCORE;
    };
    let blended = (unit(area.location_quality) + unit(area.market_strength)) / 2.0;
    ((blended * MAX_LOCATION_SCORE as f64).round() as u8).min(MAX_LOCATION_SCORE)
}

pub fn market_score(trade_area: Option<&TradeArea>) -> (u8, &'static str) {
    let Some(area) = trade_area else {
        return (NEUTRAL_SCORE, "Unknown");
    };
    let growth = area.avg_growth_pct();
    if !growth.is_finite() {
        return (NEUTRAL_SCORE, "Unknown");
    }
    if growth > 6.0 {
        (15, "Strong Growth")
    } else if growth > 4.0 {
        (12, "Solid Growth")
    } else if growth > 2.0 {
        (8, "Moderate Growth")
    } else if growth > 0.0 {
        (5, "Slow Growth")
    } else {
        (2, "Declining")
    }
}

pub fn property_score(signals: Option<&PropertySignals>) -> u8 {
    let Some(signals) = signals else {
        return 0;
    };

    let count_points = match signals.property_count {
        count if count >= 50 => 5,
        count if count >= 25 => 4,
        count if count >= 10 => 3,
        count if count >= 5 => 2,
        count if count > 0 => 1,
        _ => 0,
    };

    let rent = finite_or_zero(signals.avg_rent);
    let rent_points = if rent >= 2500.0 {
        8
    } else if rent >= 2000.0 {
        6
    } else if rent >= 1500.0 {
        4
    } else if rent >= 1000.0 {
        2
    } else if rent > 0.0 {
        1
    } else {
        0
    };

    let occupancy_points = (unit(signals.avg_occupancy) * 4.0).round() as u8;
    let quality_points = (unit(signals.quality_score) * 3.0).round() as u8;

    (count_points + rent_points + occupancy_points + quality_points).min(MAX_PROPERTY_SCORE)
}

pub fn score(trade_area: Option<&TradeArea>) -> TriageScores {
    let location = location_score(trade_area);
    let (market, market_label) = market_score(trade_area);
    let property = property_score(trade_area.map(|area| &area.properties));
    TriageScores {
        location,
        market,
        market_label: market_label.to_string(),
        property,
        total: location + market + property,
    }
}

pub fn classify(total: u8) -> TriageStatus {
    if total >= HOT_THRESHOLD {
        TriageStatus::Hot
    } else if total >= WARM_THRESHOLD {
        TriageStatus::Warm
    } else if total >= WATCH_THRESHOLD {
        TriageStatus::Watch
    } else {
        TriageStatus::Pass
    }
}

pub fn strategies(trade_area: Option<&TradeArea>) -> Vec<String> {
    let Some(area) = trade_area else {
        return vec!["Gather Market Data".to_string()];
    };
    let props = &area.properties;
    let mut strategies = Vec::new();

    if props.avg_rent > 1800.0 {
        strategies.push("Premium Positioning");
    } else if props.avg_rent > 0.0 && props.avg_rent < 1200.0 {
        strategies.push("Value-Add Renovation");
    }
    if props.avg_occupancy >= 0.95 {
        strategies.push("Rent Growth Capture");
    } else if props.avg_occupancy > 0.0 && props.avg_occupancy < 0.90 {
        strategies.push("Lease-Up Repositioning");
    }
    if area.population_growth_pct > 2.0 || area.job_growth_pct > 2.0 {
        strategies.push("Growth Market Entry");
    }
    if props.property_count >= 50 {
        strategies.push("Portfolio Aggregation");
    }
    if strategies.is_empty() {
        strategies.push("Core Hold");
    }

    strategies.into_iter().map(str::to_string).collect()
}

pub fn risks(trade_area: Option<&TradeArea>) -> Vec<String> {
    let Some(area) = trade_area else {
        return vec!["Unresolved Trade Area".to_string()];
    };
    let props = &area.properties;
    let mut risks = Vec::new();

    if area.rent_growth_pct < 2.0 {
        risks.push("Weak Rent Growth");
    }
    if area.job_growth_pct < 1.0 {
        risks.push("Limited Job Growth");
    }
    if area.population_growth_pct < 0.0 {
        risks.push("Population Decline");
    }
    if props.avg_occupancy > 0.0 && props.avg_occupancy < 0.90 {
        risks.push("Occupancy Softness");
    }
    if area.market_strength < 0.4 {
        risks.push("Weak Market Fundamentals");
    }
    if props.property_count < 10 {
        risks.push("Thin Comparable Set");
    }

    risks.into_iter().map(str::to_string).collect()
}

pub fn recommendations(status: TriageStatus, trade_area: Option<&TradeArea>) -> Vec<String> {
    let mut recommendations = match status {
        TriageStatus::Hot => vec![
            "Fast-track underwriting and request seller financials",
            "Schedule a site visit within 7 days",
        ],
        TriageStatus::Warm => vec!["Complete standard underwriting before next pipeline review"],
        TriageStatus::Watch => vec!["Monitor market signals and revisit next quarter"],
        TriageStatus::Pass => vec!["Archive unless pricing or thesis changes"],
    };

    match trade_area {
        None => recommendations.push("Verify the site address so trade-area analysis can run"),
        Some(area) if area.properties.property_count < 10 => {
            recommendations.push("Expand the comparable radius before relying on property scores")
        }
        Some(_) => {}
    }

    recommendations.into_iter().map(str::to_string).collect()
}

fn unit(value: f64) -> f64 {
    finite_or_zero(value).clamp(0.0, 1.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
