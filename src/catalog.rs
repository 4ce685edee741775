//! Game list shown by the menu strategies
//!
//! The list file is TOML with one `[[game]]` table per entry:
//!
//! ```toml
//! [[game]]
//! name = "Sonic Adventure"
//! product = "MK-51000"
//! disc = "1/1"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEntry {
    pub name: String,
    #[serde(default)]
    pub product: String,
    #[serde(default = "default_disc")]
    pub disc: String,
}

fn default_disc() -> String {
    "1/1".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, rename = "game")]
    games: Vec<GameEntry>,
}

// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read list file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse list file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Catalog {
    pub fn new(games: Vec<GameEntry>) -> Self {
        Self { games }
    }

    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(content)?;
        debug!("Parsed catalog with {} entries", catalog.len());
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::parse(&content)?;
        info!("Loaded {} games from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GameEntry> {
        self.games.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEntry> {
        self.games.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let catalog = Catalog::parse(
            r#"
            [[game]]
            name = "Sonic Adventure"
            product = "MK-51000"

            [[game]]
            name = "Shenmue"
            product = "MK-51059"
            disc = "2/4"
            "#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().disc, "1/1");
        assert_eq!(catalog.get(1).unwrap().disc, "2/4");
    }

    #[test]
    fn test_empty_list_is_valid() {
        let catalog = Catalog::parse("").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_entry_needs_a_name() {
        assert!(Catalog::parse("[[game]]\nproduct = \"X\"\n").is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Catalog::load(Path::new("/nonexistent/discmenu/list.toml")).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }
}
