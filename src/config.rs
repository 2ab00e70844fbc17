/// Application-level constants
pub const APP_NAME: &str = "rxscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable prefix for runtime overrides.
pub const ENV_PREFIX: &str = "RXSCAN_";

/// Log filter used when `RUST_LOG` is unset.
/// Debug builds log pipeline stage counts; release builds stay at info.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "rxscan_lib=debug,rxscan=debug"
    } else {
        "rxscan_lib=info,rxscan=info"
    }
}

/// Full name of an `RXSCAN_*` environment variable.
pub fn env_key(suffix: &str) -> String {
    format!("{ENV_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_rxscan() {
        assert_eq!(APP_NAME, "rxscan");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn default_filter_targets_crate() {
        assert!(default_log_filter().starts_with("rxscan_lib="));
    }

    #[test]
    fn env_key_is_prefixed() {
        assert_eq!(env_key("CORRECT_NAMES"), "RXSCAN_CORRECT_NAMES");
    }
}
