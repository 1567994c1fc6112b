//! Prompt builders for the three collection stages.

use crate::vehicle::CatalogEntry;

pub(crate) const SYSTEM_PROMPT: &str = "You are a vehicle market research assistant. \
Use public information. Respond with JSON only, no other text.";

pub(crate) fn directory_prompt(market: &str, base_year: i32) -> String {
    format!(
        r#"List all car and truck manufacturers producing for the {market} market in {base_year} and {next_year}.
Output the list of manufacturers as a JSON object with no other text. The format will be as follows:
{{
    "manufacturers": ["manufacturer1", "manufacturer2", ...]
}}"#,
        market = market,
        base_year = base_year,
        next_year = base_year + 1,
    )
}

pub(crate) fn catalog_prompt(manufacturer: &str, base_year: i32) -> String {
    format!(
        r#"Create a list of the make and model of each vehicle produced by '{manufacturer}' in {base_year}, and in {next_year} if available.
Output the list as a JSON object with no other text. The format will be as follows:
{{
    "vehicles": [
        {{
            "year": "year",
            "make": "make1",
            "model": "model1"
        }}
    ]
}}"#,
        manufacturer = manufacturer,
        base_year = base_year,
        next_year = base_year + 1,
    )
}

pub(crate) fn detail_prompt(manufacturer: &str, entry: &CatalogEntry) -> String {
    let make = entry.make_name();
    let model = entry.model_name();
    format!(
        r#"Collect information about the vehicle '{make} {model}' produced by '{manufacturer}' in the year {year}.
Distance is always in km. Price is always in USD.
Include an entry for each badge of the vehicle.
Numbers must not include commas.
Include one collection of keywords that describe the vehicle's buyer demographic for activities, interests, relationships, and opinions.
Output the list as a JSON object with no other text. The format will be as follows:
{{
    "vehicles": [
        {{
            "year": "year",
            "make": "make1",
            "model": "model1",
            "badge": "badge1",
            "price": "0",
            "energytype": "electric",
            "maxrange": "0",
            "MPG": "0",
            "MPGe": "0",
            "cost_of_tires": "0",
            "maintenance_year1": "0",
            "maintenance_year2": "0",
            "maintenance_year3": "0",
            "maintenance_year4": "0",
            "major_issue_probability": "0.0",
            "major_issue_cost": "0",
            "major_issue_description": "description",
            "keywords": ["keyword1", "keyword2", ...]
        }}
    ]
}}"#,
        make = make,
        model = model,
        manufacturer = manufacturer,
        year = entry.year,
    )
}
