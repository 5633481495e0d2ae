//! Password recovery: issue, validate and consume single-use reset tokens.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::hashing::hash_password;
use crate::domain::port_errors::map_user_error;
use crate::domain::ports::{
    Notifier, OutboundMessage, PasswordHasher, PasswordResetService, ResetIssueOutcome,
    ResetTokenConsumption, UserRepository,
};
use crate::domain::{
    EmailAddress, Error, Password, ResetPasswordRequest, ResetToken, ResetTokenGrant, User,
};

const RESET_SUBJECT: &str = "PostNest password reset";

/// Password reset service implementing [`PasswordResetService`].
#[derive(Clone)]
pub struct PasswordResetServiceImpl<U, H, N> {
    users: Arc<U>,
    hasher: Arc<H>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    link_base: Url,
    token_ttl: Option<Duration>,
}

impl<U, H, N> PasswordResetServiceImpl<U, H, N> {
    /// Create a service whose tokens never expire.
    ///
    /// Reset links are rendered as `{link_base}/reset-password/{token}`.
    pub fn new(
        users: Arc<U>,
        hasher: Arc<H>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        link_base: Url,
    ) -> Self {
        Self {
            users,
            hasher,
            notifier,
            clock,
            link_base,
            token_ttl: None,
        }
    }

    /// Expire tokens older than `ttl`.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.token_ttl = ttl;
        self
    }

    fn reset_link(&self, token: &ResetToken) -> String {
        format!(
            "{}/reset-password/{}",
            self.link_base.as_str().trim_end_matches('/'),
            token.as_str()
        )
    }

    fn reset_message(&self, to: &EmailAddress, token: &ResetToken) -> OutboundMessage {
        let link = self.reset_link(token);
        OutboundMessage {
            to: to.clone(),
            subject: RESET_SUBJECT.to_owned(),
            body_html: format!(
                "<p>A password reset was requested for your account.</p>\
                 <p><a href=\"{link}\">Choose a new password</a></p>\
                 <p>If you did not ask for this, ignore this message.</p>"
            ),
        }
    }
}

fn invalid_token() -> Error {
    Error::not_found("reset token is invalid or has expired").with_details(json!({
        "field": "token",
        "code": "invalid_token",
    }))
}

fn password_mismatch() -> Error {
    Error::invalid_request("passwords do not match").with_details(json!({
        "field": "confirmPassword",
        "code": "password_mismatch",
    }))
}

#[async_trait]
impl<U, H, N> PasswordResetService for PasswordResetServiceImpl<U, H, N>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    N: Notifier,
{
    async fn issue(&self, email: &EmailAddress) -> Result<ResetIssueOutcome, Error> {
        let Some(user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
        else {
            debug!("reset requested for unknown email");
            return Ok(ResetIssueOutcome::UserNotFound);
        };

        let token = ResetToken::generate();
        let grant = ResetTokenGrant::new(token.clone(), self.clock.utc());
        let stored = self
            .users
            .set_reset_token(user.id(), Some(grant))
            .await
            .map_err(map_user_error)?;
        if !stored {
            debug!(user_id = %user.id(), "user vanished before token could be stored");
            return Ok(ResetIssueOutcome::UserNotFound);
        }

        let message = self.reset_message(user.email(), &token);
        if let Err(err) = self.notifier.send(&message).await {
            warn!(
                user_id = %user.id(),
                kind = err.kind(),
                error = %err,
                "reset notification failed; token left in place"
            );
            return Err(Error::service_unavailable(
                "password reset e-mail could not be sent",
            ));
        }

        info!(user_id = %user.id(), "password reset issued");
        Ok(ResetIssueOutcome::Sent)
    }

    async fn validate(&self, token: &str) -> Result<User, Error> {
        let token = ResetToken::parse(token).map_err(|_| invalid_token())?;
        let user = self
            .users
            .find_by_reset_token(&token)
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid_token)?;

        let now = self.clock.utc();
        match user.reset_token() {
            Some(grant) if !grant.is_expired(now, self.token_ttl) => Ok(user),
            _ => Err(invalid_token()),
        }
    }

    async fn consume(&self, request: &ResetPasswordRequest) -> Result<(), Error> {
        if !request.passwords_match() {
            return Err(password_mismatch());
        }
        let token = ResetToken::parse(request.token()).map_err(|_| invalid_token())?;
        let password = Password::new(request.new_password()).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "password",
                "code": "empty_password",
            }))
        })?;

        // Skip the hashing cost for tokens nobody holds.
        self.validate(token.as_str()).await?;

        let new_hash = hash_password(&self.hasher, &password).await?;
        let consumption = ResetTokenConsumption {
            token,
            issued_after: self.token_ttl.map(|ttl| self.clock.utc() - ttl),
            new_hash,
        };
        let user_id = self
            .users
            .consume_reset_token(&consumption)
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid_token)?;

        info!(user_id = %user_id, "password reset completed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "password_reset_service_tests.rs"]
mod tests;
