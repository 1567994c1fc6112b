use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::CacheKey;
use crate::cost::CostBreakdown;

/// A model year as the model emitted it: `2025`, `"2025"`, `2025.0`, or
/// anything else, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelYear {
    Number(i64),
    Float(f64),
    Text(String),
    Other(Value),
}

impl Default for ModelYear {
    fn default() -> Self {
        ModelYear::Other(Value::Null)
    }
}

impl fmt::Display for ModelYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelYear::Number(n) => write!(f, "{}", n),
            ModelYear::Float(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
                write!(f, "{}", *x as i64)
            }
            ModelYear::Float(x) => write!(f, "{}", x),
            ModelYear::Text(s) => f.write_str(s.trim()),
            ModelYear::Other(value) => write_raw(f, value),
        }
    }
}

/// A descriptive fact, normally a string. Anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexText {
    Text(String),
    Other(Value),
}

impl FlexText {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlexText::Text(s) => Some(s),
            FlexText::Other(_) => None,
        }
    }
}

impl From<&str> for FlexText {
    fn from(s: &str) -> Self {
        FlexText::Text(s.to_string())
    }
}

impl fmt::Display for FlexText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexText::Text(s) => f.write_str(s),
            FlexText::Other(value) => write_raw(f, value),
        }
    }
}

/// Null renders empty; other JSON renders as its compact text.
fn write_raw(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => Ok(()),
        Value::String(s) => f.write_str(s),
        other => write!(f, "{}", other),
    }
}

/// Display text of an optional fact, empty when absent.
pub(crate) fn display_or_empty<T: fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// A numeric fact, emitted either as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexNumber {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Not a number at all; kept so the record still persists.
    Other(Value),
}

impl FlexNumber {
    /// Integer value; floats are truncated, strings must hold an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FlexNumber::Integer(n) => Some(*n),
            FlexNumber::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => {
                Some(f.trunc() as i64)
            }
            FlexNumber::Float(_) => None,
            FlexNumber::Text(s) => s.trim().parse().ok(),
            FlexNumber::Other(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            FlexNumber::Integer(n) => Some(*n as f64),
            FlexNumber::Float(f) => Some(*f),
            FlexNumber::Text(s) => s.trim().parse::<f64>().ok(),
            FlexNumber::Other(_) => None,
        };
        value.filter(|f| f.is_finite())
    }
}

impl fmt::Display for FlexNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexNumber::Integer(n) => write!(f, "{}", n),
            FlexNumber::Float(x) => write!(f, "{}", x),
            FlexNumber::Text(s) => f.write_str(s),
            FlexNumber::Other(value) => write_raw(f, value),
        }
    }
}

/// One (year, make, model) produced by a manufacturer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub year: ModelYear,
    #[serde(default)]
    pub make: Option<FlexText>,
    #[serde(default)]
    pub model: Option<FlexText>,
    /// Anything else the model added, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    /// Missing make or model count as empty strings.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.year.to_string(), &self.make_name(), &self.model_name())
    }

    pub fn make_name(&self) -> String {
        display_or_empty(&self.make)
    }

    pub fn model_name(&self) -> String {
        display_or_empty(&self.model)
    }
}

/// One badge (trim) of a model-year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDetailRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<ModelYear>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<FlexText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<FlexText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<FlexText>,
    /// Purchase price in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<FlexNumber>,
    /// e.g. "electric", "gasoline", "hybrid".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energytype: Option<FlexText>,
    /// Range in km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxrange: Option<FlexNumber>,
    #[serde(rename = "MPG", default, skip_serializing_if = "Option::is_none")]
    pub mpg: Option<FlexNumber>,
    #[serde(rename = "MPGe", default, skip_serializing_if = "Option::is_none")]
    pub mpge: Option<FlexNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_of_tires: Option<FlexNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_year1: Option<FlexNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_year2: Option<FlexNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_year3: Option<FlexNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_year4: Option<FlexNumber>,
    /// Probability (0.0-1.0) of a major failure within the horizon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_issue_probability: Option<FlexNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_issue_cost: Option<FlexNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_issue_description: Option<FlexText>,
    /// Buyer demographics: activities, interests, relationships, opinions.
    /// Normally a list of strings; kept verbatim whatever its shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Value>,
    /// Written as `{}` when the cost could not be computed.
    #[serde(default, with = "cost_report")]
    pub calculate_vehicle_cost: Option<CostBreakdown>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VehicleDetailRecord {
    pub fn year_display(&self) -> String {
        display_or_empty(&self.year)
    }

    /// "year make model badge", for logs.
    pub fn label(&self) -> String {
        [
            self.year_display(),
            display_or_empty(&self.make),
            display_or_empty(&self.model),
            display_or_empty(&self.badge),
        ]
        .join(" ")
    }

    /// Recompute and attach the cost breakdown from the record's own fields.
    pub fn attach_cost(&mut self) {
        self.calculate_vehicle_cost = CostBreakdown::for_record(self);
    }
}

/// Contents of one detail cache file: every badge of a model-year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleDetailFile {
    pub vehicles: Vec<VehicleDetailRecord>,
}

mod cost_report {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    use crate::cost::CostBreakdown;

    pub fn serialize<S: Serializer>(
        value: &Option<CostBreakdown>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(breakdown) => breakdown.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<CostBreakdown>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Value::Object(map)) if map.is_empty() => Ok(None),
            // Recomputed on collection, so an unreadable report is dropped.
            Some(value) => Ok(serde_json::from_value(value).ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_year_display() {
        assert_eq!(ModelYear::Number(2025).to_string(), "2025");
        assert_eq!(ModelYear::Text(" 2025 ".to_string()).to_string(), "2025");
    }

    #[test]
    fn test_flex_number_parsing() {
        assert_eq!(FlexNumber::Integer(42).as_i64(), Some(42));
        assert_eq!(FlexNumber::Float(42.9).as_i64(), Some(42));
        assert_eq!(FlexNumber::Text(" 42 ".to_string()).as_i64(), Some(42));
        assert_eq!(FlexNumber::Text("42,000".to_string()).as_i64(), None);
        assert_eq!(FlexNumber::Float(f64::NAN).as_i64(), None);
        assert_eq!(FlexNumber::Text("0.15".to_string()).as_f64(), Some(0.15));
    }

    #[test]
    fn test_catalog_entry_with_missing_make() {
        let entry: CatalogEntry =
            serde_json::from_value(json!({"year": "2025", "make": null, "model": "Model Y"}))
                .unwrap();
        assert_eq!(entry.cache_key().as_str(), "2025--model%20y");
    }

    #[test]
    fn test_catalog_entry_numeric_year() {
        let entry: CatalogEntry =
            serde_json::from_value(json!({"year": 2026, "make": "Rivian", "model": "R2"})).unwrap();
        assert_eq!(entry.cache_key().as_str(), "2026-rivian-r2");
    }

    #[test]
    fn test_detail_record_keeps_unknown_fields() {
        let record: VehicleDetailRecord = serde_json::from_value(json!({
            "year": "2025", "make": "Kia", "model": "EV9", "badge": "Land",
            "MPGe": "80", "seats": 7, "keywords": ["family", "camping"]
        }))
        .unwrap();
        assert_eq!(record.mpge, Some(FlexNumber::Text("80".to_string())));
        assert_eq!(record.extra["seats"], 7);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["seats"], 7);
        assert_eq!(value["MPGe"], "80");
        assert_eq!(value["calculate_vehicle_cost"], json!({}));
    }

    #[test]
    fn test_empty_cost_object_reads_back_as_none() {
        let record: VehicleDetailRecord =
            serde_json::from_value(json!({"make": "Kia", "calculate_vehicle_cost": {}})).unwrap();
        assert!(record.calculate_vehicle_cost.is_none());
    }

    #[test]
    fn test_attach_cost() {
        let mut record: VehicleDetailRecord = serde_json::from_value(json!({
            "year": "2025", "make": "Honda", "model": "Civic", "badge": "LX",
            "price": "20000",
            "maintenance_year1": "500", "maintenance_year2": "500",
            "maintenance_year3": "500", "maintenance_year4": "500"
        }))
        .unwrap();
        record.attach_cost();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["calculate_vehicle_cost"]["actual_cost_per_month"], 212);
        assert_eq!(value["calculate_vehicle_cost"]["purchase price"], 20000);
    }

    #[test]
    fn test_model_year_float_and_null() {
        let entry: CatalogEntry =
            serde_json::from_value(json!({"year": 2025.0, "make": "Kia", "model": "EV9"})).unwrap();
        assert_eq!(entry.year, ModelYear::Float(2025.0));
        assert_eq!(entry.cache_key().as_str(), "2025-kia-ev9");

        let entry: CatalogEntry =
            serde_json::from_value(json!({"year": null, "make": "Kia", "model": "EV9"})).unwrap();
        assert_eq!(entry.cache_key().as_str(), "-kia-ev9");

        let entry: CatalogEntry = serde_json::from_value(json!({"make": "Kia"})).unwrap();
        assert_eq!(entry.cache_key().as_str(), "-kia-");
    }

    #[test]
    fn test_catalog_entry_numeric_model() {
        let entry: CatalogEntry =
            serde_json::from_value(json!({"year": "2025", "make": "Mazda", "model": 3})).unwrap();
        assert_eq!(entry.model, Some(FlexText::Other(json!(3))));
        assert_eq!(entry.model_name(), "3");
        assert_eq!(entry.cache_key().as_str(), "2025-mazda-3");
    }

    #[test]
    fn test_detail_record_accepts_odd_shapes() {
        let record: VehicleDetailRecord = serde_json::from_value(json!({
            "year": 2025.0, "make": "Kia", "model": "EV9", "badge": 2,
            "price": true, "keywords": null
        }))
        .unwrap();
        assert_eq!(record.badge, Some(FlexText::Other(json!(2))));
        assert_eq!(record.price, Some(FlexNumber::Other(json!(true))));
        assert_eq!(record.label(), "2025 Kia EV9 2");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["badge"], 2);
        assert_eq!(value["price"], true);
    }

    #[test]
    fn test_detail_record_keeps_keyword_string() {
        let record: VehicleDetailRecord =
            serde_json::from_value(json!({"make": "Kia", "keywords": "family, camping"})).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["keywords"], "family, camping");
    }

    #[test]
    fn test_unreadable_cost_report_is_dropped() {
        let record: VehicleDetailRecord =
            serde_json::from_value(json!({"make": "Kia", "calculate_vehicle_cost": "n/a"})).unwrap();
        assert!(record.calculate_vehicle_cost.is_none());
    }
}
