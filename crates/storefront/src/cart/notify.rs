//! Shopper notifications (the "toast" side channel).
//!
//! The cart store reports every failed operation to a [`Notifier`] in addition
//! to returning the error, so UI layers can surface it without threading
//! results through every call site.

use std::sync::{Arc, Mutex, PoisonError};

use rocket_shoes_core::ProductId;
use serde::Serialize;
use tokio::sync::broadcast;

use super::error::{CartError, CartErrorKind};

/// Capacity of the broadcast channel; slow receivers skip older notifications.
const BROADCAST_CAPACITY: usize = 64;

/// A user-visible notification about a failed cart operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartNotification {
    #[serde(rename = "error", serialize_with = "serialize_kind")]
    pub kind: CartErrorKind,
    pub product_id: ProductId,
    pub message: &'static str,
}

fn serialize_kind<S: serde::Serializer>(kind: &CartErrorKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.code())
}

impl From<&CartError> for CartNotification {
    fn from(err: &CartError) -> Self {
        Self {
            kind: err.kind(),
            product_id: err.product_id(),
            message: err.user_message(),
        }
    }
}

/// Receives cart notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &CartNotification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: &CartNotification) {
        (**self).notify(notification);
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &CartNotification) {
        tracing::info!(
            kind = notification.kind.code(),
            product_id = %notification.product_id,
            message = notification.message,
            "Cart notification"
        );
    }
}

/// Fans notifications out to any number of subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<CartNotification>,
}

impl BroadcastNotifier {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Receive notifications sent after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartNotification> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: &CartNotification) {
        // No subscribers is fine
        let _ = self.sender.send(notification.clone());
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<CartNotification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<CartNotification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return the recorded notifications.
    pub fn take(&self) -> Vec<CartNotification> {
        std::mem::take(&mut *self.seen.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &CartNotification) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}
