use crate::error::{Error, Result};
use crate::search::query::{validate_since, FilterConfig, SortBy};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const BUILTIN_PRESETS: &str = include_str!("../../config/presets.yaml");
const MAX_PRESET_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetCatalog {
    pub version: u32,
    pub presets: Vec<Preset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: PresetConfig,
}

/// Filter values a preset fills in; same field names as a search request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stars: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stars: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default)]
    pub exclude_archived: bool,
    #[serde(default)]
    pub exclude_forks: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_repos: Option<u32>,
}

impl PresetConfig {
    pub fn to_filter(&self, default_page_size: u32) -> FilterConfig {
        FilterConfig {
            language: self.language.clone(),
            topics: self.topics.clone(),
            min_stars: self.min_stars,
            max_stars: self.max_stars,
            since: self.since.clone(),
            exclude_archived: self.exclude_archived,
            exclude_forks: self.exclude_forks,
            sort_by: self.sort_by.unwrap_or_default(),
            page_size: self.num_repos.unwrap_or(default_page_size),
        }
    }
}

impl PresetCatalog {
    /// The catalog shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_PRESETS)
    }

    /// Load from `path` when given, otherwise the built-in catalog
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    /// Load preset catalog from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read presets from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml_str(&content).map_err(|e| {
            Error::Config(format!(
                "Invalid presets in {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let catalog: PresetCatalog = serde_yaml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate the entire catalog
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported presets version: {}. Expected version 1",
                self.version
            )));
        }

        let slug = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$")
            .map_err(|e| Error::Internal(format!("Invalid preset id pattern: {e}")))?;

        let mut seen = HashSet::new();
        for (index, preset) in self.presets.iter().enumerate() {
            if !seen.insert(preset.id.as_str()) {
                return Err(Error::Config(format!("Duplicate preset id: {}", preset.id)));
            }

            Self::validate_preset(preset, &slug).map_err(|e| {
                Error::Config(format!("Preset #{} ({}): {}", index + 1, preset.id, e))
            })?;
        }

        Ok(())
    }

    fn validate_preset(preset: &Preset, slug: &Regex) -> Result<()> {
        if !slug.is_match(&preset.id) {
            return Err(Error::Config(
                "Preset id must be a lowercase slug like 'rust-projects'".to_string(),
            ));
        }

        if preset.name.trim().is_empty() {
            return Err(Error::Config("Preset name cannot be empty".to_string()));
        }

        if let Some(since) = &preset.config.since {
            validate_since(since)?;
        }

        if let Some(num_repos) = preset.config.num_repos {
            if num_repos == 0 || num_repos > MAX_PRESET_PAGE_SIZE {
                return Err(Error::Config(format!(
                    "num_repos must be between 1 and {MAX_PRESET_PAGE_SIZE}"
                )));
            }
        }

        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
