//! Authentication primitives: credentials, password digests and reset tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use super::user::{DisplayName, EmailAddress, UserValidationError};

/// Number of random bytes behind a generated reset token.
const RESET_TOKEN_BYTES: usize = 32;

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// E-mail or display name failed user validation.
    User(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Reset token was blank.
    EmptyToken,
    /// Reset token contained characters outside the URL-safe alphabet.
    InvalidToken,
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyToken => write!(f, "reset token must not be empty"),
            Self::InvalidToken => write!(f, "reset token is malformed"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<UserValidationError> for AuthValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Plaintext password, wiped from memory on drop.
///
/// Whitespace is preserved exactly as supplied.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate that the password is non-empty.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Password string provided by the caller.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Opaque password digest in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a digest produced by a password hasher.
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Encoded digest.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Single-use password reset secret.
///
/// ## Invariants
/// - Non-empty and composed only of URL-safe characters
///   (`A-Z a-z 0-9 - _`), so it can be embedded in a link path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ResetToken(String);

impl ResetToken {
    /// Validate a token received from a caller.
    ///
    /// # Examples
    /// ```
    /// use postnest::domain::ResetToken;
    ///
    /// assert!(ResetToken::parse("abc_DEF-123").is_ok());
    /// assert!(ResetToken::parse("has/slash").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::EmptyToken);
        }
        if !raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(AuthValidationError::InvalidToken);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Generate a fresh token from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; RESET_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Encoded token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetToken(<redacted>)")
    }
}

/// A reset token together with the instant it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenGrant {
    token: ResetToken,
    issued_at: DateTime<Utc>,
}

impl ResetTokenGrant {
    /// Pair a token with its issue time.
    pub fn new(token: ResetToken, issued_at: DateTime<Utc>) -> Self {
        Self { token, issued_at }
    }

    /// The secret itself.
    pub fn token(&self) -> &ResetToken {
        &self.token
    }

    /// When the token was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Whether the grant has outlived `ttl` at `now`. Without a TTL grants
    /// never expire.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| now - self.issued_at >= ttl)
    }
}

/// Validated login credentials used by authentication services.
///
/// # Examples
/// ```
/// use postnest::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" a@x.com ", "pw1").unwrap();
/// assert_eq!(creds.email().as_ref(), "a@x.com");
/// assert_eq!(creds.password().expose(), "pw1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw e-mail/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
        })
    }

    /// E-mail used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    email: EmailAddress,
    name: DisplayName,
    password: Password,
}

impl RegistrationRequest {
    /// Validate raw registration fields.
    pub fn try_from_parts(
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            name: DisplayName::new(name)?,
            password: Password::new(password)?,
        })
    }

    /// Requested login e-mail.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Requested display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Chosen password.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Raw reset submission.
///
/// Fields are kept unvalidated so the service can report a confirmation
/// mismatch before anything else is inspected.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetPasswordRequest {
    token: String,
    new_password: Zeroizing<String>,
    confirm_password: Zeroizing<String>,
}

impl ResetPasswordRequest {
    /// Capture the submitted fields.
    pub fn new(
        token: impl Into<String>,
        new_password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            new_password: Zeroizing::new(new_password.into()),
            confirm_password: Zeroizing::new(confirm_password.into()),
        }
    }

    /// Token exactly as submitted.
    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    /// Whether the password and its confirmation are identical.
    pub fn passwords_match(&self) -> bool {
        self.new_password.as_str() == self.confirm_password.as_str()
    }

    /// The new password as submitted.
    pub fn new_password(&self) -> &str {
        self.new_password.as_str()
    }
}

impl fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("token", &"<redacted>")
            .field("new_password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", AuthValidationError::User(UserValidationError::EmptyEmail))]
    #[case(
        "nobody",
        "pw",
        AuthValidationError::User(UserValidationError::EmailMissingSeparator)
    )]
    #[case("a@x.com", "", AuthValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn passwords_keep_surrounding_whitespace() {
        let creds = LoginCredentials::try_from_parts("a@x.com", " pw ").expect("valid");
        assert_eq!(creds.password().expose(), " pw ");
    }

    #[rstest]
    fn secrets_are_redacted_in_debug_output() {
        let password = Password::new("hunter2").expect("valid password");
        let token = ResetToken::parse("secret-token").expect("valid token");
        let request = ResetPasswordRequest::new("secret-token", "hunter2", "hunter2");
        for rendered in [
            format!("{password:?}"),
            format!("{token:?}"),
            format!("{request:?}"),
        ] {
            assert!(!rendered.contains("hunter2"));
            assert!(!rendered.contains("secret-token"));
        }
    }

    #[rstest]
    #[case("", AuthValidationError::EmptyToken)]
    #[case("has space", AuthValidationError::InvalidToken)]
    #[case("a/b", AuthValidationError::InvalidToken)]
    #[case("a+b=", AuthValidationError::InvalidToken)]
    fn token_parse_rejects_bad_input(#[case] raw: &str, #[case] expected: AuthValidationError) {
        assert_eq!(ResetToken::parse(raw), Err(expected));
    }

    #[rstest]
    fn generated_tokens_are_url_safe_and_distinct() {
        let first = ResetToken::generate();
        let second = ResetToken::generate();
        assert_ne!(first, second);
        assert_eq!(ResetToken::parse(first.as_str()), Ok(first.clone()));
        assert_eq!(first.as_str().len(), 43);
    }

    #[rstest]
    #[case(None, 10_000, false)]
    #[case(Some(30), 29, false)]
    #[case(Some(30), 30, true)]
    fn grant_expiry(
        #[case] ttl_minutes: Option<i64>,
        #[case] elapsed_minutes: i64,
        #[case] expired: bool,
    ) {
        let issued = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("timestamp");
        let grant = ResetTokenGrant::new(ResetToken::generate(), issued);
        let now = issued + Duration::minutes(elapsed_minutes);
        assert_eq!(
            grant.is_expired(now, ttl_minutes.map(Duration::minutes)),
            expired
        );
    }

    #[rstest]
    fn reset_request_detects_mismatch() {
        assert!(ResetPasswordRequest::new("t", "a", "a").passwords_match());
        assert!(!ResetPasswordRequest::new("t", "a", "b").passwords_match());
    }
}
