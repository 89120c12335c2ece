mod entity;
mod parse;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use entity::Entity;
#[cfg(test)]
pub use entity::Relationship;
use parse::parse_entities;

const SAMPLE_CAST: &str = include_str!("sample_cast.json");

/// Where the entity records for a session come from.
#[derive(Clone, Debug)]
pub enum EntitySource {
    File(PathBuf),
    Sample,
}

impl EntitySource {
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Sample => "built-in sample cast".to_owned(),
        }
    }

    pub fn load(&self) -> Result<Vec<Entity>> {
        let entities = match self {
            Self::File(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read entity file {}", path.display()))?;
                parse_entities(&raw)
                    .with_context(|| format!("failed to parse entity file {}", path.display()))?
            }
            Self::Sample => parse_entities(SAMPLE_CAST).context("built-in sample cast is invalid")?,
        };

        log::info!(
            "loaded {} entities from {}",
            entities.len(),
            self.describe()
        );
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_cast_loads() {
        let entities = EntitySource::Sample.load().unwrap();
        assert!(entities.len() >= 5);
        assert!(entities.iter().all(|entity| !entity.name.is_empty()));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = EntitySource::File(PathBuf::from("/definitely/not/here.json"))
            .load()
            .unwrap_err();
        assert!(format!("{error:#}").contains("/definitely/not/here.json"));
    }
}
