use serde_json::{Map, Value};

use crate::core::errors::AppError;

pub fn validate_config(config: &Value) -> Result<(), AppError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(model) = expect_optional_object(root, "model")? {
        validate_non_empty_string_field(model, "model.name", "name")?;
    }

    if let Some(backend) = expect_optional_object(root, "backend")? {
        validate_non_empty_string_field(backend, "backend.base_url", "base_url")?;
        if let Some(url) = backend.get("base_url").and_then(|v| v.as_str()) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "Invalid config at 'backend.base_url': '{}' must start with http:// or https://",
                    url
                )));
            }
        }
        validate_u64_field(
            backend,
            "backend.request_timeout_secs",
            "request_timeout_secs",
            1,
            86_400,
        )?;
        validate_u64_field(
            backend,
            "backend.pull_timeout_secs",
            "pull_timeout_secs",
            1,
            86_400,
        )?;
        validate_u64_field(backend, "backend.max_retries", "max_retries", 0, 10)?;
    }

    if let Some(knowledge) = expect_optional_object(root, "knowledge")? {
        validate_non_empty_string_field(knowledge, "knowledge.path", "path")?;
        validate_bool_field(knowledge, "knowledge.seed_sample", "seed_sample")?;
    }

    if let Some(assistant) = expect_optional_object(root, "assistant")? {
        validate_non_empty_string_field(assistant, "assistant.language", "language")?;
        validate_optional_string_field(assistant, "assistant.system_prompt", "system_prompt")?;
        validate_f64_field(assistant, "assistant.temperature", "temperature", 0.0, 2.0)?;
        validate_bool_field(
            assistant,
            "assistant.warm_up_on_update",
            "warm_up_on_update",
        )?;
    }

    if let Some(logging) = expect_optional_object(root, "logging")? {
        validate_non_empty_string_field(logging, "logging.level", "level")?;
        validate_bool_field(logging, "logging.file", "file")?;
        validate_non_empty_string_field(logging, "logging.file_name", "file_name")?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, AppError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_bool_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), AppError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_bool().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "boolean"))
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), AppError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(AppError::Config(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), AppError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() {
        return Ok(());
    }
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if !(min..=max).contains(&number) {
        return Err(AppError::Config(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_non_empty_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), AppError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(AppError::Config(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), AppError> {
    match section.get(key) {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(config_type_error(path, "string")),
    }
}

fn config_type_error(path: &str, expected: &str) -> AppError {
    AppError::Config(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
