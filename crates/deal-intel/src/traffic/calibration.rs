use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::domain::{CalibrationAdjustment, PropertyType};
use crate::repository::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationScope {
    Global,
    PropertyType,
    Submarket,
}

/// Stored bias correction. Written by the validation workflow; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationFactor {
    pub scope: CalibrationScope,
    /// Ignored for the global scope.
    pub scope_key: String,
    pub multiplier: f64,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
}

impl CalibrationFactor {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_until.map_or(true, |until| date <= until)
    }
}

pub trait CalibrationStore: Send + Sync {
    fn factors(&self) -> Result<Vec<CalibrationFactor>, RepositoryError>;

    fn active_factors(&self, on: NaiveDate) -> Result<Vec<CalibrationFactor>, RepositoryError> {
        Ok(self
            .factors()?
            .into_iter()
            .filter(|factor| factor.is_active_on(on))
            .collect())
    }
}

/// Read-only lookup keyed by `(scope, key)`. Several active factors on the
/// same key compose multiplicatively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationTable {
    multipliers: BTreeMap<(CalibrationScope, String), f64>,
}

impl CalibrationTable {
    pub fn from_factors<'a, I>(factors: I) -> Self
    where
        I: IntoIterator<Item = &'a CalibrationFactor>,
    {
        let mut multipliers = BTreeMap::new();
        for factor in factors {
            if !(factor.multiplier.is_finite() && factor.multiplier > 0.0) {
                continue;
            }
            let key = match factor.scope {
                CalibrationScope::Global => String::new(),
                _ => normalize_key(&factor.scope_key),
            };
            *multipliers.entry((factor.scope, key)).or_insert(1.0) *= factor.multiplier;
        }
        Self { multipliers }
    }

    fn lookup(&self, scope: CalibrationScope, key: &str) -> f64 {
        self.multipliers
            .get(&(scope, key.to_string()))
            .copied()
            .unwrap_or(1.0)
    }

    /// Applies global, then property type, then submarket.
    pub fn adjustment_for(
        &self,
        property_type: PropertyType,
        submarket: &str,
    ) -> CalibrationAdjustment {
        let global = self.lookup(CalibrationScope::Global, "");
        let property_type = self.lookup(CalibrationScope::PropertyType, property_type.key());
        let submarket = self.lookup(CalibrationScope::Submarket, &normalize_key(submarket));

        CalibrationAdjustment {
            global,
            property_type,
            submarket,
            combined: global * property_type * submarket,
        }
    }
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
