//! Barber inbox and live change feed.
//!
//! The repository publishes every inserted notification on a broadcast
//! channel, mirroring the shape of the hosted store's per-barber
//! subscription; this service filters the feed per barber for the shell.

use std::sync::Arc;

use chrono::Utc;
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use super::error::ServiceResult;
use crate::db::{BarberRepository, FullRepository, NotificationRepository};
use crate::models::{BarberId, Notification};

pub struct NotificationCenter {
    repo: Arc<dyn FullRepository>,
}

impl NotificationCenter {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo }
    }

    /// Inbox for one barber, newest first.
    pub async fn list(&self, barber_id: BarberId) -> ServiceResult<Vec<Notification>> {
        self.repo.get_barber(barber_id).await?;
        Ok(self.repo.list_notifications(barber_id).await?)
    }

    pub async fn mark_read(&self, id: Uuid) -> ServiceResult<()> {
        self.repo.mark_notification_read(id).await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, barber_id: BarberId) -> ServiceResult<usize> {
        self.repo.get_barber(barber_id).await?;
        Ok(self.repo.mark_all_read(barber_id).await?)
    }

    /// Push a notification into a barber's inbox (and onto the feed).
    pub async fn notify(
        &self,
        barber_id: BarberId,
        title: &str,
        body: &str,
    ) -> ServiceResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            barber_id,
            title: title.to_string(),
            body: body.to_string(),
            read: false,
            created_at: Utc::now(),
        };
        self.repo.insert_notification(&notification).await?;
        Ok(notification)
    }

    /// Live stream of this barber's new notifications.
    ///
    /// Lagged receivers skip missed items and continue; the stream ends when
    /// the repository is dropped.
    pub fn feed(&self, barber_id: BarberId) -> impl Stream<Item = Notification> {
        let mut rx = self.repo.subscribe_notifications();
        async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(notification) if notification.barber_id == barber_id => {
                        yield notification;
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("notification feed lagged; skipped {} messages", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BarberRepository, LocalRepository};
    use crate::models::Barber;
    use futures::StreamExt;

    async fn seeded() -> (NotificationCenter, BarberId, BarberId) {
        let repo = Arc::new(LocalRepository::new());
        let carlos = Barber {
            id: BarberId::random(),
            name: "Carlos".into(),
            email: "carlos@example.com".into(),
            phone: "5551234".into(),
        };
        let miguel = Barber {
            id: BarberId::random(),
            name: "Miguel".into(),
            email: "miguel@example.com".into(),
            phone: "5559876".into(),
        };
        repo.insert_barber(&carlos).await.unwrap();
        repo.insert_barber(&miguel).await.unwrap();
        (NotificationCenter::new(repo), carlos.id, miguel.id)
    }

    #[tokio::test]
    async fn test_inbox_is_newest_first_and_mark_read() {
        let (center, carlos, _) = seeded().await;
        center.notify(carlos, "Nueva cita", "Juan, 14:00").await.unwrap();
        let second = center
            .notify(carlos, "Cita cancelada", "Luis, 11:00")
            .await
            .unwrap();

        let inbox = center.list(carlos).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].id, second.id);

        center.mark_read(second.id).await.unwrap();
        let inbox = center.list(carlos).await.unwrap();
        assert!(inbox[0].read);
        assert!(!inbox[1].read);
    }

    #[tokio::test]
    async fn test_mark_all_read_counts_changes() {
        let (center, carlos, _) = seeded().await;
        center.notify(carlos, "a", "x").await.unwrap();
        center.notify(carlos, "b", "y").await.unwrap();

        assert_eq!(center.mark_all_read(carlos).await.unwrap(), 2);
        assert_eq!(center.mark_all_read(carlos).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_feed_filters_by_barber() {
        let (center, carlos, miguel) = seeded().await;
        let mut feed = Box::pin(center.feed(carlos));

        center.notify(miguel, "Ajena", "no debe llegar").await.unwrap();
        center.notify(carlos, "Propia", "sí llega").await.unwrap();

        let delivered = feed.next().await.unwrap();
        assert_eq!(delivered.title, "Propia");
        assert_eq!(delivered.barber_id, carlos);
    }
}
