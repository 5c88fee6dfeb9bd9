use catalog::{
    Vocabulary,
    notifications::{Notification, NotificationTitle},
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    store::{Store, new_id},
    templates::{Subject, render},
};

/// Writes the notification for an action that already succeeded.
///
/// A failed write is logged and dropped; the action itself stands.
pub async fn record(
    store: &dyn Store,
    sender_id: &str,
    title: NotificationTitle,
    subject: Option<Subject<'_>>,
) -> Option<Notification> {
    let notification = Notification {
        id: new_id(),
        recipient_id: None,
        sender_id: sender_id.to_string(),
        kind: title.kind(),
        title,
        message: render(title, subject),
        read: false,
        created_at: Utc::now(),
    };

    match store.insert_notification(&notification).await {
        Ok(()) => {
            info!("{} by {sender_id}", title.as_str());
            Some(notification)
        }
        Err(e) => {
            warn!("Failed to record \"{}\" notification: {e}", title.as_str());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use catalog::notifications::NotificationKind;

    use super::*;
    use crate::{memory::MemoryStore, store::NotificationQuery};

    #[tokio::test]
    async fn test_record_persists_unread() {
        let store = MemoryStore::new();

        let recorded = record(&store, "sender", NotificationTitle::SectionUpdated, None)
            .await
            .unwrap();
        assert_eq!(recorded.kind, NotificationKind::Section);
        assert!(!recorded.read);
        assert_eq!(recorded.recipient_id, None);

        let (items, total) = store
            .list_notifications(&NotificationQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0], recorded);
        assert_eq!(store.count_unread().await.unwrap(), 1);
    }
}
