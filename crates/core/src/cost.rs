//! Depreciation and total-cost-of-ownership for one vehicle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vehicle::{FlexNumber, VehicleDetailRecord};

/// Ownership horizon.
pub const MONTHS_TO_OWN: u32 = 48;
/// Value kept each depreciation step (10% loss).
pub const DEPRECIATION_FACTOR: f64 = 0.9;

const YEARS_TO_OWN: u32 = MONTHS_TO_OWN / 12;

#[derive(Debug, Error, PartialEq)]
pub enum CostComputationError {
    #[error("Field {field} is missing")]
    Missing { field: &'static str },

    #[error("Field {field} is not a number: {value}")]
    NotANumber { field: &'static str, value: String },

    #[error("Field {field} is negative: {value}")]
    Negative { field: &'static str, value: i64 },

    #[error("Arithmetic overflow while summing maintenance costs")]
    Overflow,

    #[error("Result is not a finite number")]
    NotFinite,
}

/// Cost of owning a vehicle over [`MONTHS_TO_OWN`] months.
///
/// All figures are truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(rename = "purchase price")]
    pub purchase_price: i64,
    /// Projected resale value at the end of the horizon.
    #[serde(rename = "price_of_vehicle_sold")]
    pub resale_value: i64,
    #[serde(rename = "total_cost_of_maintenance")]
    pub total_maintenance: i64,
    #[serde(rename = "actual_cost_per_month")]
    pub monthly_cost: i64,
}

/// Compute the breakdown for a purchase price and four yearly maintenance costs.
///
/// The vehicle loses 10% when it leaves the lot, then a further 10% per
/// year of the horizon, compounding.
pub fn calculate_vehicle_cost(
    purchase_price: i64,
    maintenance: [i64; 4],
) -> Result<CostBreakdown, CostComputationError> {
    if purchase_price < 0 {
        return Err(CostComputationError::Negative {
            field: "price",
            value: purchase_price,
        });
    }
    for (field, value) in MAINTENANCE_FIELDS.into_iter().zip(maintenance) {
        if value < 0 {
            return Err(CostComputationError::Negative { field, value });
        }
    }

    let mut vehicle_value = purchase_price as f64 * DEPRECIATION_FACTOR;
    for _ in 0..YEARS_TO_OWN {
        vehicle_value *= DEPRECIATION_FACTOR;
    }

    let total_maintenance = maintenance
        .iter()
        .try_fold(0i64, |acc, m| acc.checked_add(*m))
        .ok_or(CostComputationError::Overflow)?;

    let total_cost = purchase_price as f64 - vehicle_value + total_maintenance as f64;
    let monthly_cost = total_cost / f64::from(MONTHS_TO_OWN);

    Ok(CostBreakdown {
        purchase_price,
        resale_value: truncate(vehicle_value)?,
        total_maintenance,
        monthly_cost: truncate(monthly_cost)?,
    })
}

const MAINTENANCE_FIELDS: [&str; 4] = [
    "maintenance_year1",
    "maintenance_year2",
    "maintenance_year3",
    "maintenance_year4",
];

fn truncate(value: f64) -> Result<i64, CostComputationError> {
    // `as` saturates; reject anything that would.
    if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return Err(CostComputationError::NotFinite);
    }
    Ok(value.trunc() as i64)
}

fn number_field(
    field: &'static str,
    value: Option<&FlexNumber>,
) -> Result<i64, CostComputationError> {
    let value = value.ok_or(CostComputationError::Missing { field })?;
    value
        .as_i64()
        .ok_or_else(|| CostComputationError::NotANumber {
            field,
            value: value.to_string(),
        })
}

impl CostBreakdown {
    /// Compute from the record's own price and maintenance fields.
    pub fn try_for_record(record: &VehicleDetailRecord) -> Result<Self, CostComputationError> {
        let price = number_field("price", record.price.as_ref())?;
        let maintenance = [
            number_field(MAINTENANCE_FIELDS[0], record.maintenance_year1.as_ref())?,
            number_field(MAINTENANCE_FIELDS[1], record.maintenance_year2.as_ref())?,
            number_field(MAINTENANCE_FIELDS[2], record.maintenance_year3.as_ref())?,
            number_field(MAINTENANCE_FIELDS[3], record.maintenance_year4.as_ref())?,
        ];
        calculate_vehicle_cost(price, maintenance)
    }

    /// Like [`try_for_record`](Self::try_for_record), but a failure means
    /// "cost unavailable" and is only logged.
    pub fn for_record(record: &VehicleDetailRecord) -> Option<Self> {
        match Self::try_for_record(record) {
            Ok(breakdown) => Some(breakdown),
            Err(e) => {
                tracing::warn!("Cost unavailable for {}: {}", record.label(), e);
                crate::metrics::COST_FAILURES.inc();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_vehicle() {
        let cost = calculate_vehicle_cost(20000, [500, 500, 500, 500]).unwrap();
        assert_eq!(cost.purchase_price, 20000);
        // 20000 * 0.9 = 18000, then 18000 * 0.9^4 = 11809.8
        assert_eq!(cost.resale_value, 11809);
        assert_eq!(cost.total_maintenance, 2000);
        // (20000 - 11809.8 + 2000) / 48 = 212.29
        assert_eq!(cost.monthly_cost, 212);
    }

    #[test]
    fn test_is_deterministic() {
        let first = calculate_vehicle_cost(48_995, [120, 640, 900, 1450]).unwrap();
        let second = calculate_vehicle_cost(48_995, [120, 640, 900, 1450]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_free_vehicle() {
        let cost = calculate_vehicle_cost(0, [0, 0, 0, 0]).unwrap();
        assert_eq!(cost.resale_value, 0);
        assert_eq!(cost.monthly_cost, 0);
    }

    #[test]
    fn test_negative_price_fails() {
        let result = calculate_vehicle_cost(-1, [0, 0, 0, 0]);
        assert_eq!(
            result,
            Err(CostComputationError::Negative {
                field: "price",
                value: -1
            })
        );
    }

    #[test]
    fn test_negative_maintenance_fails() {
        let result = calculate_vehicle_cost(1000, [0, 0, -5, 0]);
        assert!(matches!(
            result,
            Err(CostComputationError::Negative {
                field: "maintenance_year3",
                ..
            })
        ));
    }

    #[test]
    fn test_maintenance_overflow_fails() {
        let result = calculate_vehicle_cost(1000, [i64::MAX, 1, 0, 0]);
        assert_eq!(result, Err(CostComputationError::Overflow));
    }

    #[test]
    fn test_serialized_keys() {
        let cost = calculate_vehicle_cost(20000, [500, 500, 500, 500]).unwrap();
        let value = serde_json::to_value(cost).unwrap();
        assert_eq!(
            value,
            json!({
                "purchase price": 20000,
                "price_of_vehicle_sold": 11809,
                "total_cost_of_maintenance": 2000,
                "actual_cost_per_month": 212
            })
        );
    }

    fn record(value: serde_json::Value) -> VehicleDetailRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_for_record_with_string_numbers() {
        let record = record(json!({
            "year": "2025", "make": "Kia", "model": "EV9", "badge": "Light",
            "price": "54900",
            "maintenance_year1": "300", "maintenance_year2": "450",
            "maintenance_year3": 600, "maintenance_year4": "800"
        }));
        let cost = CostBreakdown::for_record(&record).unwrap();
        assert_eq!(cost.purchase_price, 54900);
        assert_eq!(cost.total_maintenance, 2150);
    }

    #[test]
    fn test_for_record_non_numeric_is_unavailable() {
        let record = record(json!({
            "year": "2025", "make": "Kia", "model": "EV9",
            "price": "call dealer",
            "maintenance_year1": "300", "maintenance_year2": "450",
            "maintenance_year3": "600", "maintenance_year4": "800"
        }));
        assert!(matches!(
            CostBreakdown::try_for_record(&record),
            Err(CostComputationError::NotANumber { field: "price", .. })
        ));
        assert!(CostBreakdown::for_record(&record).is_none());
    }

    #[test]
    fn test_for_record_missing_maintenance_is_unavailable() {
        let record = record(json!({"year": 2025, "make": "Kia", "model": "EV9", "price": 54900}));
        assert_eq!(
            CostBreakdown::try_for_record(&record),
            Err(CostComputationError::Missing {
                field: "maintenance_year1"
            })
        );
        assert!(CostBreakdown::for_record(&record).is_none());
    }
}
