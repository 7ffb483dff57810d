//! Order-event email notifications.
//!
//! Emails are best-effort and fire-and-forget: they are dispatched on a
//! detached task after the triggering write has committed, failures are
//! logged and swallowed, and there are no retries. Nothing in the request
//! path ever waits on the relay.

use crate::order::Order;
use crate::types::EmailAddress;
use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Failure at the mail-relay boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mail relay failure: {0}")]
pub struct MailError(pub String);

/// An outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: EmailAddress,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// The mail-relay collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hand a message to the relay.
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// A mailer that logs instead of sending. Default when no relay is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        tracing::info!(to = %message.to, subject = %message.subject, "email (log only)");
        Ok(())
    }
}

/// A mailer that records messages for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages handed to the relay so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}

/// Dispatch a message on a detached task. Errors are logged, never surfaced.
pub fn dispatch(mailer: Arc<dyn Mailer>, message: EmailMessage) {
    tokio::spawn(async move {
        let to = message.to.clone();
        if let Err(err) = mailer.send(message).await {
            tracing::warn!(%to, error = %err, "order notification failed");
        }
    });
}

fn items_table(order: &Order) -> String {
    let mut rows = String::new();
    for item in &order.order_items {
        let _ = write!(
            rows,
            "<tr>\
             <td style=\"padding:8px;border-bottom:1px solid #eee;\">{}</td>\
             <td style=\"padding:8px;border-bottom:1px solid #eee;text-align:center;\">{}</td>\
             <td style=\"padding:8px;border-bottom:1px solid #eee;text-align:right;\">{}</td>\
             </tr>",
            item.name, item.quantity, item.price
        );
    }
    format!(
        "<table style=\"width:100%;border-collapse:collapse;\">\
         <tr><th align=\"left\">Item</th><th>Qty</th><th align=\"right\">Price</th></tr>{rows}\
         </table>"
    )
}

/// Order-confirmation email, sent after checkout.
pub fn order_confirmation(order: &Order, to: EmailAddress, recipient: &str) -> EmailMessage {
    let html = format!(
        "<h2>Thanks for your order, {recipient}!</h2>\
         <p>Order <strong>{}</strong> has been placed and is being processed.</p>\
         {}\
         <p>Items: {} &middot; Tax: {} &middot; Shipping: {}</p>\
         <p><strong>Total: {}</strong></p>",
        order.id,
        items_table(order),
        order.items_price,
        order.tax_price,
        order.shipping_price,
        order.total_price
    );
    EmailMessage {
        to,
        subject: format!("Order confirmed - {}", order.id),
        html,
    }
}

/// Shipped notification, sent on Processing -> Shipped.
pub fn order_shipped(order: &Order, to: EmailAddress, recipient: &str) -> EmailMessage {
    let tracking = order.tracking_number.as_ref().map_or_else(String::new, |t| {
        format!("<p>Tracking number: <strong>{t}</strong></p>")
    });
    let html = format!(
        "<h2>Good news, {recipient}!</h2>\
         <p>Order <strong>{}</strong> is on its way.</p>{tracking}{}",
        order.id,
        items_table(order)
    );
    EmailMessage {
        to,
        subject: format!("Order shipped - {}", order.id),
        html,
    }
}

/// Delivered notification, sent on Shipped -> Delivered.
pub fn order_delivered(order: &Order, to: EmailAddress, recipient: &str) -> EmailMessage {
    let html = format!(
        "<h2>Delivered!</h2>\
         <p>{recipient}, order <strong>{}</strong> was delivered. We hope you enjoy it.</p>",
        order.id
    );
    EmailMessage {
        to,
        subject: format!("Order delivered - {}", order.id),
        html,
    }
}

/// Cancellation notice, sent on Processing -> Cancelled.
pub fn order_cancelled(order: &Order, to: EmailAddress, recipient: &str) -> EmailMessage {
    let html = format!(
        "<h2>Order cancelled</h2>\
         <p>{recipient}, order <strong>{}</strong> has been cancelled. Any reserved \
         stock has been released.</p>",
        order.id
    );
    EmailMessage {
        to,
        subject: format!("Order cancelled - {}", order.id),
        html,
    }
}
