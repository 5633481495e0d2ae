//! Notifier that writes outbound messages to the log instead of mailing them.
//!
//! Suitable for development and tests; production deployments plug a real
//! delivery adapter into the same port.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{Notifier, NotifierError, OutboundMessage};

/// [`Notifier`] emitting each message as tracing events.
///
/// Recipient and subject go out at `info`; the body, which may carry a reset
/// link, only at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifierError> {
        info!(to = %message.to, subject = %message.subject, "notification dispatched");
        debug!(to = %message.to, body = %message.body_html, "notification body");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmailAddress;

    #[tokio::test]
    async fn always_accepts_messages() {
        let message = OutboundMessage {
            to: EmailAddress::new("a@x.com").expect("email"),
            subject: "Hello".to_owned(),
            body_html: "<p>hi</p>".to_owned(),
        };

        assert!(TracingNotifier.send(&message).await.is_ok());
    }
}
