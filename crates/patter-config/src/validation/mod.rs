//! Configuration validation.
//!
//! Each check pushes a message; all failures are reported together in a
//! single `ConfigError`.

#[cfg(test)]
mod tests;

use crate::schema::PatterConfig;
use patter_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PatterConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&mut errors, config);
    validate_generation(&mut errors, config);
    validate_markup(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_server(errors: &mut Vec<String>, config: &PatterConfig) {
    if config.server.port == 0 {
        errors.push("server.port must be non-zero".into());
    }
    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".into());
    }
}

fn validate_generation(errors: &mut Vec<String>, config: &PatterConfig) {
    let generation = &config.generation;
    if generation.model.trim().is_empty() {
        errors.push("generation.model must not be empty".into());
    }
    if !generation.base_url.starts_with("http://") && !generation.base_url.starts_with("https://")
    {
        errors.push(format!(
            "generation.base_url = {:?} must be an http(s) URL",
            generation.base_url
        ));
    }
    if generation.timeout_secs == 0 {
        errors.push("generation.timeout_secs must be at least 1".into());
    }
    if generation.connect_timeout_secs == 0 {
        errors.push("generation.connect_timeout_secs must be at least 1".into());
    }
}

fn validate_markup(errors: &mut Vec<String>, config: &PatterConfig) {
    let markup = &config.markup;
    if markup.begin.is_empty() {
        errors.push("markup.begin must not be empty".into());
    }
    if markup.end.is_empty() {
        errors.push("markup.end must not be empty".into());
    }
    if !markup.begin.is_empty() && markup.begin == markup.end {
        errors.push("markup.begin and markup.end must differ".into());
    }
}
