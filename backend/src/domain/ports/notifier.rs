//! Port for outbound user notifications (e-mail).

use async_trait::async_trait;

use crate::domain::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum NotifierError {
        /// The message could not be handed to the delivery channel.
        Delivery { message: String } => "notification delivery failed: {message}",
    }
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Recipient address.
    pub to: EmailAddress,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub body_html: String,
}

/// Delivers messages to users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message`; `Ok` means the channel accepted it.
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifierError>;
}
