//! Asset classes and their candidate instruments.
//!
//! Each asset class owns an ordered, non-empty list of candidates. The order is
//! significant: it breaks ranking ties. An instrument belongs to at most one
//! asset class.

use crate::domain::error::RotatorError;
use crate::ports::config_port::ConfigPort;
use std::collections::{HashMap, HashSet};

pub const ASSET_CLASS_SECTION: &str = "asset_classes";

#[derive(Debug, Clone, PartialEq)]
pub struct AssetClass {
    pub name: String,
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    classes: Vec<AssetClass>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

/// Parse a comma-separated candidate list, preserving order.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

impl Universe {
    pub fn new(classes: Vec<AssetClass>) -> Result<Self, RotatorError> {
        let mut owner: HashMap<&str, &str> = HashMap::new();
        for class in &classes {
            if class.candidates.is_empty() {
                return Err(RotatorError::EmptyAssetClass {
                    asset_class: class.name.clone(),
                });
            }
            for symbol in &class.candidates {
                if let Some(first) = owner.insert(symbol.as_str(), class.name.as_str()) {
                    return Err(RotatorError::DuplicateInstrument {
                        symbol: symbol.clone(),
                        first: first.to_string(),
                        second: class.name.clone(),
                    });
                }
            }
        }
        Ok(Universe { classes })
    }

    /// Build from the `[asset_classes]` section, ordered by class name.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, RotatorError> {
        let mut entries = config.get_section(ASSET_CLASS_SECTION);
        if entries.is_empty() {
            return Err(RotatorError::ConfigMissing {
                section: ASSET_CLASS_SECTION.to_string(),
                key: "<asset class>".to_string(),
            });
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut classes = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            if value.trim().is_empty() {
                return Err(RotatorError::EmptyAssetClass { asset_class: name });
            }
            let candidates = parse_codes(&value).map_err(|e| RotatorError::ConfigInvalid {
                section: ASSET_CLASS_SECTION.to_string(),
                key: name.clone(),
                reason: e.to_string(),
            })?;
            classes.push(AssetClass { name, candidates });
        }
        Universe::new(classes)
    }

    pub fn classes(&self) -> &[AssetClass] {
        &self.classes
    }

    pub fn count(&self) -> usize {
        self.classes.len()
    }

    /// Every candidate across all classes, in class then candidate order.
    pub fn symbols(&self) -> Vec<String> {
        self.classes
            .iter()
            .flat_map(|c| c.candidates.iter().cloned())
            .collect()
    }
}
