/// Config file loading and creation for the tasteduel CLI.
///
/// Config lives at ~/.config/tasteduel/config.toml.
/// All fields are optional. CLI args override config values.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tasteduel_core::CategoryType;

use crate::bail;

#[derive(Deserialize, Default)]
pub struct TasteduelConfig {
    pub data_dir: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub k_factor: Option<f64>,
    pub prioritize_close_ratings: Option<bool>,
    /// Category filters, e.g. `cuisine = ["Italian", "Japanese"]`.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# tasteduel configuration
# All values here can be overridden by CLI flags.

# Where ratings and comparison history are saved
# data_dir = \"/home/me/.local/share/tasteduel\"

# JSON file with your own items instead of the built-in foods.
# Each item: { \"id\": 1, \"name\": \"Pizza\", \"description\": \"...\", \"categories\": { ... } }
# catalog = \"/path/to/foods.json\"

# Rating volatility: how far one comparison moves ratings
# k_factor = 32

# Once past the first 10 comparisons, prefer refining close ratings (true)
# or probing pairs the model is unsure about (false)
# prioritize_close_ratings = true

# Only compare items matching these categories.
# AND across category types, OR within one type.
# [categories]
# cuisine = [\"Italian\", \"Japanese\"]
# dietary = [\"Vegetarian\"]
";

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home)
}

/// Returns the default config path: ~/.config/tasteduel/config.toml
pub fn config_path() -> PathBuf {
    home_dir().join(".config").join("tasteduel").join("config.toml")
}

/// Returns the default data directory: ~/.local/share/tasteduel
pub fn default_data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("tasteduel")
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> TasteduelConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => TasteduelConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

fn parse_config(content: &str) -> Result<TasteduelConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config() -> PathBuf {
    let path = config_path();

    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    // Create parent directories
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));

    path
}

/// Parse a `--filter type=value` argument.
pub fn parse_filter(arg: &str) -> Result<(CategoryType, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("Invalid filter \"{arg}\", expected <type>=<value> (e.g. cuisine=Italian)"))?;
    let category_type: CategoryType = key.trim().parse().map_err(|e| format!("{e}"))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("Invalid filter \"{arg}\": empty value"));
    }
    Ok((category_type, value.to_string()))
}

/// Merge config-file filters with `--filter` arguments into selection filters.
pub fn selected_categories(
    from_config: &BTreeMap<String, Vec<String>>,
    from_cli: &[String],
) -> Result<BTreeMap<CategoryType, Vec<String>>, String> {
    let mut selected: BTreeMap<CategoryType, Vec<String>> = BTreeMap::new();

    for (key, values) in from_config {
        let category_type: CategoryType = key.parse().map_err(|e| format!("{e}"))?;
        selected.entry(category_type).or_default().extend(values.iter().cloned());
    }

    for arg in from_cli {
        let (category_type, value) = parse_filter(arg)?;
        let values = selected.entry(category_type).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    Ok(selected)
}
