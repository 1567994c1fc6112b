//! Testing utilities: a scriptable model client and canned completions.
//!
//! # Example
//!
//! ```rust,ignore
//! use carscout_core::testing::{fixtures, MockLlmClient};
//!
//! let client = MockLlmClient::with_handler(|prompt| {
//!     if prompt.contains("manufacturers") {
//!         Ok(fixtures::directory_response(&["Kia"]))
//!     } else {
//!         Ok(fixtures::catalog_response(&[("2025", "Kia", "EV9")]))
//!     }
//! });
//! ```

mod mock_llm;

pub use mock_llm::MockLlmClient;

/// Canned completions shaped like real model answers.
pub mod fixtures {
    use serde_json::json;

    /// Directory answer with some chatter around the JSON.
    pub fn directory_response(manufacturers: &[&str]) -> String {
        format!(
            "Here is the list you asked for:\n```json\n{}\n```",
            json!({ "manufacturers": manufacturers })
        )
    }

    /// Catalog answer listing `(year, make, model)` tuples.
    pub fn catalog_response(vehicles: &[(&str, &str, &str)]) -> String {
        let vehicles: Vec<_> = vehicles
            .iter()
            .map(|(year, make, model)| json!({"year": year, "make": make, "model": model}))
            .collect();
        json!({ "vehicles": vehicles }).to_string()
    }

    /// Detail answer with one record per badge, priced at `price` with
    /// 500/year maintenance.
    pub fn detail_response(year: &str, make: &str, model: &str, badges: &[(&str, &str)]) -> String {
        let vehicles: Vec<_> = badges
            .iter()
            .map(|(badge, price)| {
                json!({
                    "year": year,
                    "make": make,
                    "model": model,
                    "badge": badge,
                    "price": price,
                    "energytype": "electric",
                    "maxrange": "480",
                    "MPG": "0",
                    "MPGe": "105",
                    "cost_of_tires": "1200",
                    "maintenance_year1": "500",
                    "maintenance_year2": "500",
                    "maintenance_year3": "500",
                    "maintenance_year4": "500",
                    "major_issue_probability": "0.05",
                    "major_issue_cost": "4000",
                    "major_issue_description": "Charging port replacement",
                    "keywords": ["commuting", "tech", "family"]
                })
            })
            .collect();
        format!("{}\nPrices are estimates.", json!({ "vehicles": vehicles }))
    }
}
