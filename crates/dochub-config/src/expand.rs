//! `${VAR}` and `${VAR:-default}` expansion for path-valued settings.

use crate::ConfigError;

/// Expand environment references in a single setting.
///
/// Bare `$VAR` is left alone so that globs and literal dollar signs in
/// paths survive untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| -> Result<Option<String>, UnsetVar> {
        std::env::var(name).map(Some).map_err(|_| UnsetVar {
            name: name.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })
}

/// Expand every entry of a list setting, reporting the entry index on failure.
pub(crate) fn expand_all(values: &mut [String], field: &str) -> Result<(), ConfigError> {
    for (idx, value) in values.iter_mut().enumerate() {
        *value = expand_env(value, &format!("{field}[{idx}]"))?;
    }
    Ok(())
}

struct UnsetVar {
    name: String,
}
