use crate::{
    error::{AppError, Result},
    models::{
        event::RealtimeEvent,
        notification::{Notification, NotificationType},
        reservation::Reservation,
    },
    services::{events::EventBus, Database},
    utils::schedule::reminder_is_due,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// 通知服务
///
/// 负责通知的持久化与实时广播。提醒不用进程内定时器：
/// 到期时刻持久化在预订记录上，由一个每分钟运行的后台任务
/// 轮询触发，进程重启不会丢任务。尽力而为，至多延迟一个
/// 轮询周期，不保证送达。
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<Database>,
    events: EventBus,
}

/// 轮询的两类提醒，分别对应预订上的一组到期字段
#[derive(Debug, Clone, Copy)]
enum ReminderKind {
    Start,
    End,
}

impl ReminderKind {
    fn due_field(&self) -> &'static str {
        match self {
            Self::Start => "start_reminder_at",
            Self::End => "end_reminder_at",
        }
    }

    fn sent_field(&self) -> &'static str {
        match self {
            Self::Start => "start_reminder_sent",
            Self::End => "end_reminder_sent",
        }
    }

    fn subject_field(&self) -> &'static str {
        match self {
            Self::Start => "start_date",
            Self::End => "end_date",
        }
    }

    fn notification_type(&self) -> NotificationType {
        match self {
            Self::Start => NotificationType::StartReminder,
            Self::End => NotificationType::EndReminder,
        }
    }

    fn message(&self, lead_minutes: i64) -> String {
        match self {
            Self::Start => format!("Reminder: Your reservation starts in {} minutes", lead_minutes),
            Self::End => format!("Reminder: Your reservation ends in {} minutes", lead_minutes),
        }
    }
}

impl NotificationService {
    pub async fn new(db: Arc<Database>, events: EventBus) -> Result<Self> {
        Ok(Self { db, events })
    }

    /// 预订创建成功后记录并广播创建通知
    pub async fn reservation_created(&self, reservation: &Reservation) -> Result<Notification> {
        let notification = self
            .persist(
                &reservation.user_id,
                &reservation.id,
                NotificationType::Creation,
                "Your reservation has been created successfully",
            )
            .await?;

        self.events
            .publish(RealtimeEvent::NewNotification(notification.clone()));

        Ok(notification)
    }

    /// 后台任务的一次提醒轮询
    pub async fn run_reminder_pass(&self, now: DateTime<Utc>, lead_minutes: i64) -> Result<()> {
        self.emit_due_reminders(now, lead_minutes, ReminderKind::Start).await?;
        self.emit_due_reminders(now, lead_minutes, ReminderKind::End).await?;
        Ok(())
    }

    async fn emit_due_reminders(
        &self,
        now: DateTime<Utc>,
        lead_minutes: i64,
        kind: ReminderKind,
    ) -> Result<()> {
        let sql = format!(
            r#"
            SELECT *, meta::id(id) AS id FROM reservation
            WHERE {sent} = false
              AND {due} <= <datetime> $now
              AND {subject} > <datetime> $now
              AND status IN ['pending', 'confirmed']
            "#,
            sent = kind.sent_field(),
            due = kind.due_field(),
            subject = kind.subject_field(),
        );

        let mut response = self
            .db
            .query_with_params(&sql, json!({ "now": now }))
            .await?;
        let due: Vec<Reservation> = response.take(0)?;

        for reservation in due {
            let (due_at, subject_at) = match kind {
                ReminderKind::Start => (reservation.start_reminder_at, reservation.start_date),
                ReminderKind::End => (reservation.end_reminder_at, reservation.end_date),
            };
            // 数据库过滤之外再校验一次窗口，时钟漂移时不发过期提醒
            if !reminder_is_due(due_at, subject_at, now) {
                continue;
            }

            let notification = self
                .persist(
                    &reservation.user_id,
                    &reservation.id,
                    kind.notification_type(),
                    &kind.message(lead_minutes),
                )
                .await?;

            self.events
                .publish(RealtimeEvent::ReminderNotification(notification));

            let marked: Option<Reservation> = self
                .db
                .merge_by_id(
                    "reservation",
                    &reservation.id,
                    json!({ kind.sent_field(): true }),
                )
                .await?;
            if marked.is_none() {
                error!(
                    "Failed to mark reminder as sent for reservation {}",
                    reservation.id
                );
            }

            info!(
                "Sent {:?} reminder for reservation {}",
                kind, reservation.id
            );
        }

        Ok(())
    }

    pub async fn get_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM notification WHERE user_id = $user_id ORDER BY created_at DESC",
                json!({ "user_id": user_id }),
            )
            .await?;
        let notifications: Vec<Notification> = response.take(0)?;
        Ok(notifications)
    }

    /// 批量已读，返回本次置位的条数
    pub async fn mark_all_read(&self, user_id: &str) -> Result<usize> {
        let mut response = self
            .db
            .query_with_params(
                "UPDATE notification SET read = true WHERE user_id = $user_id AND read = false",
                json!({ "user_id": user_id }),
            )
            .await?;
        let updated: Vec<serde_json::Value> = response.take(0)?;
        debug!("Marked {} notifications as read for user {}", updated.len(), user_id);
        Ok(updated.len())
    }

    pub async fn delete_notification(&self, notification_id: &str, user_id: &str) -> Result<()> {
        let notification: Notification = self
            .db
            .get_by_id("notification", notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if notification.user_id != user_id {
            return Err(AppError::forbidden("You can only delete your own notifications"));
        }

        self.db.delete_by_id("notification", notification_id).await?;
        Ok(())
    }

    async fn persist(
        &self,
        user_id: &str,
        reservation_id: &str,
        notification_type: NotificationType,
        message: &str,
    ) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            reservation_id: reservation_id.to_string(),
            notification_type,
            message: message.to_string(),
            read: false,
            created_at: Utc::now(),
        };

        let data = serde_json::to_value(&notification)?;
        let created: Notification = self
            .db
            .create("notification", &notification.id, data)
            .await?;
        Ok(created)
    }
}
