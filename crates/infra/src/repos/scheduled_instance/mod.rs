mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemoryScheduledInstanceRepo;
use kinfolk_domain::{ScheduledInstance, ID};
pub use postgres::PostgresScheduledInstanceRepo;

#[async_trait::async_trait]
pub trait IScheduledInstanceRepo: Send + Sync {
    /// Stores a pending instance unless its reminder already has a pending instance on
    /// the same channel. Returns whether the instance was stored.
    async fn enqueue(&self, instance: &ScheduledInstance) -> anyhow::Result<bool>;
    async fn find(&self, instance_id: &ID) -> Option<ScheduledInstance>;
    /// Pending instances scheduled at or before `now`, oldest first
    async fn find_due(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<ScheduledInstance>>;
    async fn find_by_reminder(&self, reminder_id: &ID) -> anyhow::Result<Vec<ScheduledInstance>>;
    async fn mark_triggered(
        &self,
        instance_id: &ID,
        triggered_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use crate::KinfolkContext;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use kinfolk_domain::{ScheduledInstance, ID};

    fn ts(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn keeps_at_most_one_pending_instance_per_channel() {
        let ctx = KinfolkContext::create_inmemory();
        let reminder_id = ID::default();
        let channel_id = ID::default();

        let first = ScheduledInstance::new(reminder_id.clone(), channel_id.clone(), ts(5, 9));
        assert!(ctx.repos.scheduled_instances.enqueue(&first).await.unwrap());
        let second = ScheduledInstance::new(reminder_id.clone(), channel_id.clone(), ts(6, 9));
        assert!(!ctx.repos.scheduled_instances.enqueue(&second).await.unwrap());

        // Another channel gets its own instance
        let other = ScheduledInstance::new(reminder_id.clone(), ID::default(), ts(6, 9));
        assert!(ctx.repos.scheduled_instances.enqueue(&other).await.unwrap());

        // Once delivered a new instance can be queued
        ctx.repos
            .scheduled_instances
            .mark_triggered(&first.id, ts(5, 9))
            .await
            .unwrap();
        assert!(ctx.repos.scheduled_instances.enqueue(&second).await.unwrap());

        let instances = ctx
            .repos
            .scheduled_instances
            .find_by_reminder(&reminder_id)
            .await
            .unwrap();
        assert_eq!(instances.len(), 3);
    }

    #[tokio::test]
    async fn finds_due_instances_in_order() {
        let ctx = KinfolkContext::create_inmemory();
        let now = ts(5, 9);
        let late = ScheduledInstance::new(ID::default(), ID::default(), now);
        let early = ScheduledInstance::new(ID::default(), ID::default(), now - Duration::days(2));
        let future =
            ScheduledInstance::new(ID::default(), ID::default(), now + Duration::minutes(1));
        let delivered =
            ScheduledInstance::new(ID::default(), ID::default(), now - Duration::days(1));
        for instance in [&late, &early, &future, &delivered] {
            ctx.repos.scheduled_instances.enqueue(instance).await.unwrap();
        }
        ctx.repos
            .scheduled_instances
            .mark_triggered(&delivered.id, now)
            .await
            .unwrap();

        let due = ctx.repos.scheduled_instances.find_due(now).await.unwrap();
        let due_ids = due.into_iter().map(|i| i.id).collect::<Vec<_>>();
        assert_eq!(due_ids, vec![early.id.clone(), late.id.clone()]);
    }

    #[tokio::test]
    async fn marking_twice_keeps_first_trigger_time() {
        let ctx = KinfolkContext::create_inmemory();
        let instance = ScheduledInstance::new(ID::default(), ID::default(), ts(5, 9));
        ctx.repos.scheduled_instances.enqueue(&instance).await.unwrap();

        ctx.repos
            .scheduled_instances
            .mark_triggered(&instance.id, ts(5, 9))
            .await
            .unwrap();
        ctx.repos
            .scheduled_instances
            .mark_triggered(&instance.id, ts(6, 9))
            .await
            .unwrap();

        let res = ctx.repos.scheduled_instances.find(&instance.id).await.unwrap();
        assert_eq!(res.triggered_at, Some(ts(5, 9)));
    }
}
