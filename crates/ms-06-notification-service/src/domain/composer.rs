//! Event to notification mapping.

use shared_bus::EventPayload;
use shared_types::{EntityId, NotificationKind};

/// Notification content derived from an event, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub user_id: EntityId,
    pub kind: NotificationKind,
    pub message: String,
}

/// Build the notification for `payload`.
pub fn compose(payload: &EventPayload) -> NotificationDraft {
    match payload {
        EventPayload::UserCreated(user) => NotificationDraft {
            user_id: user.id,
            kind: NotificationKind::Welcome,
            message: format!("Welcome {}! Your account has been created.", user.name),
        },
        EventPayload::OrderCreated(order) => NotificationDraft {
            user_id: order.user_id,
            kind: NotificationKind::OrderConfirmation,
            message: format!(
                "Your order #{} for {} (${:.2}) has been received.",
                order.id, order.product, order.amount
            ),
        },
        EventPayload::OrderCompleted(order) => NotificationDraft {
            user_id: order.user_id,
            kind: NotificationKind::OrderCompleted,
            message: format!("Your order #{} for {} has been completed.", order.id, order.product),
        },
    }
}
