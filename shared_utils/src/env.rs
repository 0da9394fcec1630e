use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// Empty values count as missing, so `FOO= cmd` behaves like an unset `FOO`.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    optional_env_var(name).ok_or_else(|| MissingEnvVarError(name.to_string()))
}

/// Reads an optional environment variable, trimming surrounding whitespace.
pub fn optional_env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_var_reports_its_name() {
        // SAFETY: serialized with the other env tests in this module.
        unsafe { std::env::remove_var("SHARED_UTILS_TEST_MISSING") };
        let err = get_env_var("SHARED_UTILS_TEST_MISSING").unwrap_err();
        assert_eq!(err.0, "SHARED_UTILS_TEST_MISSING");
        assert!(err.to_string().contains("SHARED_UTILS_TEST_MISSING"));
    }

    #[test]
    #[serial]
    fn blank_value_counts_as_missing() {
        unsafe { std::env::set_var("SHARED_UTILS_TEST_BLANK", "   ") };
        assert!(get_env_var("SHARED_UTILS_TEST_BLANK").is_err());
        assert_eq!(optional_env_var("SHARED_UTILS_TEST_BLANK"), None);
        unsafe { std::env::remove_var("SHARED_UTILS_TEST_BLANK") };
    }

    #[test]
    #[serial]
    fn present_value_is_trimmed() {
        unsafe { std::env::set_var("SHARED_UTILS_TEST_SET", " key-123 ") };
        assert_eq!(get_env_var("SHARED_UTILS_TEST_SET").unwrap(), "key-123");
        unsafe { std::env::remove_var("SHARED_UTILS_TEST_SET") };
    }
}
