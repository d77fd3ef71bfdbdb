//! Attraction catalogue: loading, lookup, search, and category filtering.

use std::path::Path;

use crate::types::{Attraction, OosaError, OosaResult};

/// Catalogue compiled into the binary, used when no data file is configured.
const BUILTIN_ATTRACTIONS: &str = include_str!("../data/attractions.json");

/// Immutable, in-memory attraction catalogue.
#[derive(Debug, Clone, Default)]
pub struct AttractionCatalog {
    attractions: Vec<Attraction>,
}

impl AttractionCatalog {
    pub fn new(attractions: Vec<Attraction>) -> Self {
        Self { attractions }
    }

    /// The built-in catalogue.
    pub fn builtin() -> OosaResult<Self> {
        Self::from_json(BUILTIN_ATTRACTIONS)
    }

    /// Parse a catalogue from a JSON array of attractions.
    pub fn from_json(json: &str) -> OosaResult<Self> {
        let attractions: Vec<Attraction> = serde_json::from_str(json)
            .map_err(|e| OosaError::InvalidData(format!("Failed to parse attractions: {e}")))?;
        Ok(Self::new(attractions))
    }

    /// Load a catalogue from a JSON file.
    pub fn load(path: &Path) -> OosaResult<Self> {
        tracing::info!("Loading attractions from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn all(&self) -> &[Attraction] {
        &self.attractions
    }

    pub fn len(&self) -> usize {
        self.attractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attractions.is_empty()
    }

    /// Look up one attraction by its id.
    pub fn get(&self, id: &str) -> OosaResult<&Attraction> {
        self.attractions
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| OosaError::AttractionNotFound(id.to_string()))
    }

    /// Case-insensitive substring search over name, description, category and location.
    pub fn search(&self, query: &str) -> OosaResult<Vec<&Attraction>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(OosaError::InvalidInput("query must not be empty".to_string()));
        }

        Ok(self
            .attractions
            .iter()
            .filter(|a| {
                [&a.name, &a.description, &a.category, &a.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
            })
            .collect())
    }

    /// Case-insensitive exact match on category.
    pub fn filter_by_category(&self, category: &str) -> OosaResult<Vec<&Attraction>> {
        let category = category.trim().to_lowercase();
        if category.is_empty() {
            return Err(OosaError::InvalidInput(
                "category must not be empty".to_string(),
            ));
        }

        Ok(self
            .attractions
            .iter()
            .filter(|a| a.category.to_lowercase() == category)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = AttractionCatalog::builtin().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.get("taipei101").is_ok());
    }

    #[test]
    fn test_get_unknown_id() {
        let catalog = AttractionCatalog::builtin().unwrap();
        let err = catalog.get("nope").unwrap_err();
        assert!(matches!(err, OosaError::AttractionNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_search_matches_any_field() {
        let catalog = AttractionCatalog::builtin().unwrap();

        let by_location = catalog.search("北投").unwrap();
        assert!(by_location.iter().any(|a| a.id == "yangmingshan"));
        assert!(by_location.iter().any(|a| a.id == "beitou-hot-spring-museum"));

        let by_description = catalog.search("翠玉白菜").unwrap();
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "national-palace-museum");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let json = r#"[{
            "id": "a", "name": "Night Market", "location": "Taipei",
            "description": "Snacks", "category": "Food", "rating": 4.0,
            "visitHours": "", "tickets": {"adult": 0, "child": 0, "senior": 0},
            "coordinates": {"latitude": 0, "longitude": 0}
        }]"#;
        let catalog = AttractionCatalog::from_json(json).unwrap();
        assert_eq!(catalog.search("NIGHT").unwrap().len(), 1);
        assert_eq!(catalog.filter_by_category("food").unwrap().len(), 1);
        assert!(catalog.search("museum").unwrap().is_empty());
    }

    #[test]
    fn test_empty_query_rejected() {
        let catalog = AttractionCatalog::builtin().unwrap();
        assert!(matches!(
            catalog.search("   "),
            Err(OosaError::InvalidInput(_))
        ));
        assert!(matches!(
            catalog.filter_by_category(""),
            Err(OosaError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_filter_by_category_exact() {
        let catalog = AttractionCatalog::builtin().unwrap();
        let museums = catalog.filter_by_category("博物館").unwrap();
        assert_eq!(museums.len(), 2);
        assert!(catalog.filter_by_category("博物").unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        let catalog = AttractionCatalog::load(file.path()).unwrap();
        assert!(catalog.is_empty());

        write!(file, "garbage").unwrap();
        assert!(matches!(
            AttractionCatalog::load(file.path()),
            Err(OosaError::InvalidData(_))
        ));
    }
}
