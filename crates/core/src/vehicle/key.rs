use std::fmt;

/// Identity of one model-year on disk: `<year>-<make>-<model>`.
///
/// Components are lower-cased and percent-escaped, with `-` escaped as
/// `%2D`, so the two separators are the only hyphens in a key. Distinct
/// (year, make, model) triples therefore never share a key, up to case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(year: &str, make: &str, model: &str) -> Self {
        Self(format!(
            "{}-{}-{}",
            escape(year),
            escape(make),
            escape(model)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache slot name under `details_dir`.
    pub fn slot(&self, details_dir: &str) -> String {
        format!("{}/{}", details_dir, self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape(component: &str) -> String {
    urlencoding::encode(component.trim().to_lowercase().as_str()).replace('-', "%2D")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_key() {
        let key = CacheKey::new("2025", "Toyota", "Camry");
        assert_eq!(key.as_str(), "2025-toyota-camry");
    }

    #[test]
    fn test_key_is_stable() {
        assert_eq!(
            CacheKey::new("2024", "Ford", "Mustang Mach-E"),
            CacheKey::new("2024", "Ford", "Mustang Mach-E")
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            CacheKey::new("2024", "BMW", "X5"),
            CacheKey::new("2024", "bmw", "x5")
        );
    }

    #[test]
    fn test_hyphens_do_not_collide() {
        let a = CacheKey::new("2025", "mercedes-benz", "eqs");
        let b = CacheKey::new("2025", "mercedes", "benz-eqs");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "2025-mercedes%2Dbenz-eqs");
    }

    #[test]
    fn test_empty_components() {
        let key = CacheKey::new("2025", "", "");
        assert_eq!(key.as_str(), "2025--");
        assert_ne!(key, CacheKey::new("2025", "", "x"));
        assert_ne!(CacheKey::new("2025", "x", ""), CacheKey::new("2025", "", "x"));
    }

    #[test]
    fn test_path_separators_are_escaped() {
        let key = CacheKey::new("2025", "Ram", "2500/3500");
        assert!(!key.as_str().contains('/'));
        assert_eq!(key.slot("data"), format!("data/{}", key));
    }
}
