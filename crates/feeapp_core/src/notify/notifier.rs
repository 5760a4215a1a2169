//! Notifier capability and the transport-free implementations core ships.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

/// Notification delivery failure.
///
/// Kept separate from repository errors so callers can report a failed send
/// without implying anything about stored data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    EmptyRecipient,
    EmptyMessage,
    /// No transport is available in this environment.
    Unavailable(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRecipient => write!(f, "notification recipient must not be empty"),
            Self::EmptyMessage => write!(f, "notification message must not be empty"),
            Self::Unavailable(reason) => write!(f, "notifier unavailable: {reason}"),
        }
    }
}

impl Error for NotifyError {}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Outbound delivery capability injected by the composition layer.
pub trait Notifier {
    /// Delivers `message` to `recipient` (an opaque address such as a phone
    /// number).
    fn send(&self, recipient: &str, message: &str) -> NotifyResult<()>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn send(&self, recipient: &str, message: &str) -> NotifyResult<()> {
        (**self).send(recipient, message)
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn send(&self, recipient: &str, message: &str) -> NotifyResult<()> {
        (**self).send(recipient, message)
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn send(&self, recipient: &str, message: &str) -> NotifyResult<()> {
        (**self).send(recipient, message)
    }
}

/// One message accepted by [`PreviewNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: String,
    pub message: String,
}

/// Preview/no-op notifier: accepts every well-formed message without
/// delivering it and keeps it in an in-memory outbox.
#[derive(Debug, Default)]
pub struct PreviewNotifier {
    outbox: Mutex<Vec<OutboundMessage>>,
}

impl PreviewNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        match self.outbox.lock() {
            Ok(outbox) => outbox.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for PreviewNotifier {
    fn send(&self, recipient: &str, message: &str) -> NotifyResult<()> {
        ensure_addressable(recipient, message)?;

        let mut outbox = self
            .outbox
            .lock()
            .map_err(|_| NotifyError::Unavailable("preview outbox is poisoned".to_string()))?;
        outbox.push(OutboundMessage {
            recipient: recipient.to_string(),
            message: message.to_string(),
        });

        info!(
            "event=notify_send module=notify status=ok mode=preview message_len={}",
            message.chars().count()
        );
        Ok(())
    }
}

/// Notifier for environments without any transport; every send fails.
#[derive(Debug, Clone)]
pub struct UnavailableNotifier {
    reason: String,
}

impl UnavailableNotifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Notifier for UnavailableNotifier {
    fn send(&self, recipient: &str, message: &str) -> NotifyResult<()> {
        ensure_addressable(recipient, message)?;
        warn!("event=notify_send module=notify status=error error_code=notifier_unavailable");
        Err(NotifyError::Unavailable(self.reason.clone()))
    }
}

/// Shared precondition for every notifier.
pub fn ensure_addressable(recipient: &str, message: &str) -> NotifyResult<()> {
    if recipient.trim().is_empty() {
        return Err(NotifyError::EmptyRecipient);
    }
    if message.trim().is_empty() {
        return Err(NotifyError::EmptyMessage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Notifier, NotifyError, PreviewNotifier, UnavailableNotifier};
    use std::sync::Arc;

    #[test]
    fn preview_notifier_records_messages_in_order() {
        let notifier = PreviewNotifier::new();
        notifier.send("111", "first").unwrap();
        notifier.send("222", "second").unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].recipient, "111");
        assert_eq!(sent[1].message, "second");
    }

    #[test]
    fn preview_notifier_rejects_blank_input() {
        let notifier = PreviewNotifier::new();
        assert_eq!(notifier.send(" ", "hi"), Err(NotifyError::EmptyRecipient));
        assert_eq!(notifier.send("111", ""), Err(NotifyError::EmptyMessage));
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn unavailable_notifier_always_fails() {
        let notifier = UnavailableNotifier::new("no sms transport");
        let err = notifier.send("111", "hello").unwrap_err();
        assert_eq!(err, NotifyError::Unavailable("no sms transport".to_string()));
    }

    fn deliver(notifier: impl Notifier, message: &str) {
        notifier.send("111", message).unwrap();
    }

    #[test]
    fn shared_handles_forward_to_inner_notifier() {
        let notifier = Arc::new(PreviewNotifier::new());
        let boxed: Box<dyn Notifier> = Box::new(Arc::clone(&notifier));
        boxed.send("111", "via box").unwrap();
        deliver(&*notifier, "via ref");
        assert_eq!(notifier.sent().len(), 2);
    }
}
