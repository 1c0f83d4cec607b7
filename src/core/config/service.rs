use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::schema::AppConfig;
use super::validation::validate_config;
use crate::core::errors::AppError;

/// Environment variables that override a single config field.
const ENV_OVERRIDES: [(&str, &[&str]); 3] = [
    ("DONATION_MODEL", &["model", "name"]),
    ("DONATION_OLLAMA_URL", &["backend", "base_url"]),
    ("DONATION_KB_PATH", &["knowledge", "path"]),
];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("DONATION_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        self.paths.project_root.join("config.yml")
    }

    pub fn user_config_path(&self) -> PathBuf {
        self.paths.user_data_dir.join("config.yml")
    }

    /// Project config, then the user config layered on top, then env overrides.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        let (config, warnings) = self.load_config_with_warnings()?;
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        Ok(config)
    }

    /// Same as [`Self::load_config`], but hands back the skipped-file warnings
    /// instead of logging them, for callers that load config before logging
    /// is up.
    pub fn load_config_with_warnings(&self) -> Result<(AppConfig, Vec<String>), AppError> {
        let project_path = self.config_path();
        let user_path = self.user_config_path();
        let mut warnings = Vec::new();

        let mut merged = load_yaml_file(&project_path, &mut warnings);
        if user_path != project_path {
            merged = deep_merge(&merged, &load_yaml_file(&user_path, &mut warnings));
        }

        let overrides: Vec<(&[&str], String)> = ENV_OVERRIDES
            .iter()
            .filter_map(|(var, path)| env::var(var).ok().map(|value| (*path, value)))
            .collect();
        let merged = apply_overrides(merged, &overrides);

        Ok((parse_config(&merged)?, warnings))
    }

    pub fn knowledge_path(&self, config: &AppConfig) -> PathBuf {
        self.paths.resolve_data_path(&config.knowledge.path)
    }
}

/// Validates a merged config tree and fills in defaults.
pub fn parse_config(value: &Value) -> Result<AppConfig, AppError> {
    validate_config(value)?;
    serde_json::from_value(value.clone()).map_err(|e| AppError::Config(e.to_string()))
}

fn load_yaml_file(path: &Path, warnings: &mut Vec<String>) -> Value {
    if !path.exists() {
        return Value::Object(Map::new());
    }

    match fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Value::Object(Map::new()),
        Ok(contents) => match serde_yaml::from_str::<Value>(&contents) {
            Ok(value @ Value::Object(_)) => value,
            Ok(Value::Null) => Value::Object(Map::new()),
            Ok(_) => {
                warnings.push(format!(
                    "Ignoring config {}: top level is not a mapping",
                    path.display()
                ));
                Value::Object(Map::new())
            }
            Err(err) => {
                warnings.push(format!("Ignoring unparsable config {}: {}", path.display(), err));
                Value::Object(Map::new())
            }
        },
        Err(err) => {
            warnings.push(format!("Ignoring unreadable config {}: {}", path.display(), err));
            Value::Object(Map::new())
        }
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

fn apply_overrides(mut config: Value, overrides: &[(&[&str], String)]) -> Value {
    for (path, value) in overrides {
        set_path(&mut config, path, Value::String(value.clone()));
    }
    config
}

fn set_path(target: &mut Value, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *target = value;
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        set_path(child, rest, value);
    }
}
