//! Application-level configuration loading, including the runtime word catalog.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use indexmap::IndexMap;
use rand::seq::{IndexedRandom, IteratorRandom};
use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON word catalog.
const DEFAULT_CONFIG_PATH: &str = "config/words.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WORD_IMPOSTOR_CONFIG_PATH";

/// Pair handed to the engine when a round starts: the secret word for
/// innocents and the hint optionally shown to impostors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    /// The secret word revealed to innocent players.
    pub word: String,
    /// The hint revealed to impostors when the lobby enables hints.
    pub hint: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
///
/// The catalog acts as the content supplier for round setup: categories map to
/// candidate `(word, hint)` pairs.
pub struct AppConfig {
    catalog: IndexMap<String, Vec<WordEntry>>,
}

impl AppConfig {
    /// Load the word catalog from disk, falling back to the baked-in default catalog.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        categories = app_config.catalog.len(),
                        "loaded word catalog from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in catalog"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Draw a random `(word, hint)` pair from `category`.
    ///
    /// Unknown or empty categories yield a fixed fallback entry so round setup
    /// always has a referent for the later guess comparison.
    pub fn supply_word(&self, category: &str) -> WordEntry {
        self.catalog
            .get(category)
            .and_then(|entries| entries.choose(&mut rand::rng()))
            .cloned()
            .unwrap_or_else(fallback_entry)
    }

    /// Pick a uniformly random category name from the catalog.
    pub fn random_category(&self) -> String {
        self.catalog
            .keys()
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| "General".to_string())
    }

    /// Whether the catalog contains the given category.
    pub fn has_category(&self, category: &str) -> bool {
        self.catalog.contains_key(category)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the catalog file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    categories: IndexMap<String, Vec<RawEntry>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let catalog = value
            .categories
            .into_iter()
            .map(|(category, entries)| {
                (category, entries.into_iter().map(Into::into).collect())
            })
            .collect();
        Self { catalog }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single word entry inside the catalog file.
struct RawEntry {
    word: String,
    hint: String,
}

impl From<RawEntry> for WordEntry {
    fn from(value: RawEntry) -> Self {
        Self {
            word: value.word,
            hint: value.hint,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Entry returned when a category is unknown so callers always receive a value.
fn fallback_entry() -> WordEntry {
    WordEntry {
        word: "Secret".to_string(),
        hint: "Something unexpected".to_string(),
    }
}

fn entry(word: &str, hint: &str) -> WordEntry {
    WordEntry {
        word: word.to_string(),
        hint: hint.to_string(),
    }
}

/// Built-in catalog shipped with the binary.
fn default_catalog() -> IndexMap<String, Vec<WordEntry>> {
    IndexMap::from([
        (
            "Animals".to_string(),
            vec![
                entry("Dog", "Domesticated best friend"),
                entry("Cat", "Independent purring creature"),
                entry("Elephant", "Huge creature with a trunk"),
                entry("Penguin", "Black-and-white Antarctic bird"),
                entry("Giraffe", "Long-necked African animal"),
            ],
        ),
        (
            "Food".to_string(),
            vec![
                entry("Pizza", "Italian dish with cheese and sauce"),
                entry("Sushi", "Japanese rice with fish"),
                entry("Burger", "Sandwich with a patty"),
                entry("Ice cream", "Cold dessert"),
                entry("Pasta", "Italian noodles"),
            ],
        ),
        (
            "Countries".to_string(),
            vec![
                entry("Poland", "Country in central Europe"),
                entry("Japan", "Island nation in Asia"),
                entry("Brazil", "Large South American country"),
                entry("Germany", "Country in the middle of Europe"),
                entry("Norway", "Land of fjords"),
            ],
        ),
        (
            "Sports".to_string(),
            vec![
                entry("Football", "Ball and goals"),
                entry("Tennis", "Racket and a small ball"),
                entry("Swimming", "Moving through water"),
                entry("Basketball", "Hoop and a ball"),
                entry("Ski jumping", "Leaping off a ramp"),
            ],
        ),
        (
            "Movies".to_string(),
            vec![
                entry("Avatar", "Pandora, blue people"),
                entry("Titanic", "Ship meets iceberg"),
                entry("Inception", "Dreams within dreams"),
                entry("The Matrix", "Pills and a virtual world"),
                entry("Star Wars", "Space and lightsabers"),
            ],
        ),
        (
            "Instruments".to_string(),
            vec![
                entry("Guitar", "Strings, rock music"),
                entry("Piano", "Keys, classical music"),
                entry("Drums", "Percussion, loud"),
                entry("Violin", "Bow, classical music"),
                entry("Trumpet", "Brass, jazz"),
            ],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_supplies_known_category() {
        let config = AppConfig::default();
        let entry = config.supply_word("Animals");
        assert!(!entry.word.is_empty());
        assert!(!entry.hint.is_empty());
    }

    #[test]
    fn unknown_category_falls_back() {
        let config = AppConfig::default();
        let entry = config.supply_word("Quantum Physics");
        assert_eq!(entry.word, "Secret");
    }

    #[test]
    fn random_category_is_part_of_catalog() {
        let config = AppConfig::default();
        let category = config.random_category();
        assert!(config.has_category(&category));
    }
}
