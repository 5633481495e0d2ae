//! Application settings loaded via OrthoConfig.
//!
//! Values are layered from CLI arguments, `POSTNEST_*` environment variables
//! and an optional configuration file. Raw values stay as strings or numbers
//! here; accessors validate them into domain and adapter types.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::Duration;
use ortho_config::OrthoConfig;
use pagination::PageSize;
use serde::Deserialize;
use url::Url;

use crate::outbound::crypto::HashCost;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_RESET_LINK_BASE: &str = "http://localhost:3000";
const DEFAULT_SAME_SITE: &str = "lax";

/// Errors raised while turning raw settings into typed values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A setting holds a value that cannot be used.
    #[error("invalid value for {field}='{value}': {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
}

fn invalid(field: &'static str, value: impl ToString, reason: impl ToString) -> SettingsError {
    SettingsError::Invalid {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Process-wide configuration for the PostNest server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "POSTNEST")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Directory holding uploaded post images.
    pub uploads_dir: Option<PathBuf>,
    /// Posts per home feed page.
    #[ortho_config(default = 2)]
    pub page_size: u64,
    /// Session lifetime in days.
    #[ortho_config(default = 7)]
    pub session_ttl_days: i64,
    /// Base URL used to build password reset links.
    pub reset_link_base: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies: `strict`, `lax` or `none`.
    pub cookie_same_site: Option<String>,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: Option<u32>,
    /// Argon2 pass count.
    pub hash_iterations: Option<u32>,
    /// Argon2 lanes.
    pub hash_parallelism: Option<u32>,
    /// Age after which reset tokens stop working. Unset means never.
    pub reset_token_ttl_minutes: Option<i64>,
}

impl AppSettings {
    /// Listen address, defaulting to `0.0.0.0:3000`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|err: std::net::AddrParseError| invalid("bind_addr", raw, err))
    }

    /// Upload directory, defaulting to `uploads`.
    pub fn uploads_dir(&self) -> &Path {
        self.uploads_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_UPLOADS_DIR))
    }

    /// Validated feed page size.
    pub fn page_size(&self) -> Result<PageSize, SettingsError> {
        PageSize::new(self.page_size).map_err(|err| invalid("page_size", self.page_size, err))
    }

    /// Session lifetime; must be positive.
    pub fn session_ttl(&self) -> Result<Duration, SettingsError> {
        if self.session_ttl_days <= 0 {
            return Err(invalid(
                "session_ttl_days",
                self.session_ttl_days,
                "must be at least one day",
            ));
        }
        Duration::try_days(self.session_ttl_days)
            .ok_or_else(|| invalid("session_ttl_days", self.session_ttl_days, "out of range"))
    }

    /// Base URL for reset links, defaulting to `http://localhost:3000`.
    pub fn reset_link_base(&self) -> Result<Url, SettingsError> {
        let raw = self
            .reset_link_base
            .as_deref()
            .unwrap_or(DEFAULT_RESET_LINK_BASE);
        Url::parse(raw).map_err(|err| invalid("reset_link_base", raw, err))
    }

    /// Argon2 cost, with unset fields taken from the recommended defaults.
    pub fn hash_cost(&self) -> HashCost {
        let defaults = HashCost::default();
        HashCost {
            memory_kib: self.hash_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.hash_iterations.unwrap_or(defaults.iterations),
            parallelism: self.hash_parallelism.unwrap_or(defaults.parallelism),
        }
    }

    /// Reset token lifetime, if one is configured.
    pub fn reset_token_ttl(&self) -> Result<Option<Duration>, SettingsError> {
        let Some(minutes) = self.reset_token_ttl_minutes else {
            return Ok(None);
        };
        if minutes <= 0 {
            return Err(invalid(
                "reset_token_ttl_minutes",
                minutes,
                "must be at least one minute",
            ));
        }
        Duration::try_minutes(minutes)
            .map(Some)
            .ok_or_else(|| invalid("reset_token_ttl_minutes", minutes, "out of range"))
    }

    /// Raw `SameSite` policy name, defaulting to `lax`.
    pub fn cookie_same_site(&self) -> &str {
        self.cookie_same_site
            .as_deref()
            .unwrap_or(DEFAULT_SAME_SITE)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings loading and validation.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 13] = [
        "POSTNEST_BIND_ADDR",
        "POSTNEST_UPLOADS_DIR",
        "POSTNEST_PAGE_SIZE",
        "POSTNEST_SESSION_TTL_DAYS",
        "POSTNEST_RESET_LINK_BASE",
        "POSTNEST_SESSION_KEY_FILE",
        "POSTNEST_COOKIE_SECURE",
        "POSTNEST_COOKIE_SAME_SITE",
        "POSTNEST_HASH_MEMORY_KIB",
        "POSTNEST_HASH_ITERATIONS",
        "POSTNEST_HASH_PARALLELISM",
        "POSTNEST_RESET_TOKEN_TTL_MINUTES",
        "POSTNEST_CONFIG_PATH",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("postnest")]).expect("config should load")
    }

    fn cleared_env() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None::<String>)).collect()
    }

    fn with_overrides(
        overrides: &[(&'static str, &str)],
    ) -> Vec<(&'static str, Option<String>)> {
        let mut vars = cleared_env();
        for (name, value) in overrides {
            if let Some(slot) = vars.iter_mut().find(|(existing, _)| existing == name) {
                slot.1 = Some((*value).to_owned());
            }
        }
        vars
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared_env());

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:3000".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.uploads_dir(), Path::new("uploads"));
        assert_eq!(settings.page_size().expect("page size").get(), 2);
        assert_eq!(settings.session_ttl().expect("ttl"), Duration::days(7));
        assert_eq!(
            settings.reset_link_base().expect("url").as_str(),
            "http://localhost:3000/"
        );
        assert!(settings.cookie_secure);
        assert_eq!(settings.cookie_same_site(), "lax");
        assert_eq!(settings.hash_cost(), HashCost::default());
        assert_eq!(settings.reset_token_ttl().expect("ttl"), None);
        assert!(settings.session_key_file.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(with_overrides(&[
            ("POSTNEST_BIND_ADDR", "127.0.0.1:8080"),
            ("POSTNEST_PAGE_SIZE", "10"),
            ("POSTNEST_SESSION_TTL_DAYS", "1"),
            ("POSTNEST_COOKIE_SECURE", "false"),
            ("POSTNEST_HASH_ITERATIONS", "4"),
            ("POSTNEST_RESET_TOKEN_TTL_MINUTES", "30"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("bind addr").port(),
            8080
        );
        assert_eq!(settings.page_size().expect("page size").get(), 10);
        assert_eq!(settings.session_ttl().expect("ttl"), Duration::days(1));
        assert!(!settings.cookie_secure);
        assert_eq!(settings.hash_cost().iterations, 4);
        assert_eq!(
            settings.hash_cost().memory_kib,
            HashCost::default().memory_kib
        );
        assert_eq!(
            settings.reset_token_ttl().expect("ttl"),
            Some(Duration::minutes(30))
        );
    }

    #[rstest]
    #[case("POSTNEST_PAGE_SIZE", "0")]
    #[case("POSTNEST_SESSION_TTL_DAYS", "0")]
    #[case("POSTNEST_RESET_TOKEN_TTL_MINUTES", "-5")]
    #[case("POSTNEST_BIND_ADDR", "not an address")]
    #[case("POSTNEST_RESET_LINK_BASE", "no scheme")]
    fn unusable_values_are_reported(#[case] name: &'static str, #[case] value: &str) {
        let _guard = lock_env(with_overrides(&[(name, value)]));

        let settings = load_from_empty_args();
        let failures = [
            settings.bind_addr().err(),
            settings.page_size().err(),
            settings.session_ttl().err(),
            settings.reset_link_base().err(),
            settings.reset_token_ttl().err(),
        ];

        assert_eq!(failures.iter().flatten().count(), 1);
    }
}
