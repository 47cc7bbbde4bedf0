use onsen_game::{CardCatalog, CatalogError, DataLoader, RulesError, ScenarioRules};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Reads rule and catalog overrides from disk, falling back to bundled rules
/// and an empty catalog.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    pub rules: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
}

impl FileLoader {
    pub const fn new(rules: Option<PathBuf>, catalog: Option<PathBuf>) -> Self {
        Self { rules, catalog }
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl DataLoader for FileLoader {
    type Error = LoadError;

    fn load_rules(&self) -> Result<ScenarioRules, Self::Error> {
        match &self.rules {
            Some(path) => Ok(ScenarioRules::from_json(&read(path)?)?),
            None => Ok(ScenarioRules::load_from_static()),
        }
    }

    fn load_catalog(&self) -> Result<CardCatalog, Self::Error> {
        match &self.catalog {
            Some(path) => Ok(CardCatalog::from_json(&read(path)?)?),
            None => Ok(CardCatalog::empty()),
        }
    }
}
