//! Session cookie configuration and validation.
//!
//! Turns the raw cookie settings into the key and flags the session
//! middleware needs, applying stricter rules to release builds.

use std::io;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use cap_std::{ambient_authority, fs::Dir};
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_MIN_LEN: usize = 64;
const SAMESITE_EXPECTED: &str = "strict|lax|none";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing key and fall back to an ephemeral one.
    Debug,
    /// Release builds require a readable key of sufficient length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use postnest::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Raw cookie settings as configured.
#[derive(Debug, Clone, Copy)]
pub struct SessionInputs<'a> {
    /// File holding key material; `None` means not configured.
    pub key_file: Option<&'a Path>,
    /// Whether cookies carry the `Secure` flag.
    pub cookie_secure: bool,
    /// `SameSite` policy name.
    pub same_site: &'a str,
}

/// Session settings ready for the middleware.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Configured `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// Release builds need an explicit key file.
    #[error("session_key_file must be set in release builds")]
    MissingKeyFile,
    /// The `SameSite` value is not recognised.
    #[error("invalid cookie_same_site='{value}'; expected {expected}")]
    InvalidSameSite {
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The session key file exists but is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("cookie_same_site=none requires cookie_secure=true")]
    InsecureSameSiteNone,
}

/// Validate cookie settings for the given build mode.
///
/// # Examples
///
/// ```rust
/// use postnest::inbound::http::session_config::{
///     BuildMode, SessionInputs, session_settings,
/// };
///
/// let settings = session_settings(
///     &SessionInputs { key_file: None, cookie_secure: true, same_site: "lax" },
///     BuildMode::Debug,
/// )
/// .expect("debug builds fall back to an ephemeral key");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings(
    inputs: &SessionInputs<'_>,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let same_site = parse_same_site(inputs.same_site, inputs.cookie_secure, mode)?;
    let key = session_key(inputs.key_file, mode)?;
    Ok(SessionSettings {
        key,
        cookie_secure: inputs.cookie_secure,
        same_site,
    })
}

fn parse_same_site(
    value: &str,
    cookie_secure: bool,
    mode: BuildMode,
) -> Result<SameSite, SessionConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => {
            if !cookie_secure {
                if !mode.is_debug() {
                    return Err(SessionConfigError::InsecureSameSiteNone);
                }
                warn!("SameSite=None without Secure; browsers may reject the cookie");
            }
            Ok(SameSite::None)
        }
        _ => Err(SessionConfigError::InvalidSameSite {
            value: value.to_owned(),
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn read_key_bytes(path: &Path) -> io::Result<Vec<u8>> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "key path must name a file")
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read(file_name)
}

fn ephemeral_key(reason: &str) -> Key {
    warn!(reason, "using temporary session key (dev only)");
    Key::generate()
}

fn session_key(path: Option<&Path>, mode: BuildMode) -> Result<Key, SessionConfigError> {
    let Some(path) = path else {
        if mode.is_debug() {
            return Ok(ephemeral_key("session_key_file not set"));
        }
        return Err(SessionConfigError::MissingKeyFile);
    };

    let mut bytes = match read_key_bytes(path) {
        Ok(bytes) => bytes,
        Err(error) => {
            if mode.is_debug() {
                warn!(path = %path.display(), error = %error, "session key unreadable");
                return Ok(ephemeral_key("session key unreadable"));
            }
            return Err(SessionConfigError::KeyRead {
                path: path.to_path_buf(),
                source: error,
            });
        }
    };

    let length = bytes.len();
    if length < SESSION_KEY_MIN_LEN {
        bytes.zeroize();
        if mode.is_debug() {
            warn!(path = %path.display(), length, "session key too short");
            return Ok(ephemeral_key("session key too short"));
        }
        return Err(SessionConfigError::KeyTooShort {
            path: path.to_path_buf(),
            length,
            min_len: SESSION_KEY_MIN_LEN,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}
