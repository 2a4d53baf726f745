use crate::shared::usecase::UseCase;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use kinfolk_domain::{
    date::truncate_to_minute, Contact, DeliveryRecord, NotificationChannel, Notification,
    Reminder, ScheduledInstance, ID,
};
use kinfolk_infra::KinfolkContext;
use std::{collections::HashMap, panic::AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// Delivers every pending `ScheduledInstance` that is due at `now` and queues the next
/// occurrence of recurring reminders.
///
/// Only one dispatcher may run against a store at a time.
#[derive(Debug)]
pub struct SendDueRemindersUseCase {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub delivered: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    Delivered,
    Failed,
    Skipped,
}

/// Entities referenced by the due instances of a tick
struct DueRefs {
    reminders: HashMap<ID, Reminder>,
    contacts: HashMap<ID, Contact>,
    channels: HashMap<ID, NotificationChannel>,
}

impl DueRefs {
    async fn load(due: &[ScheduledInstance], ctx: &KinfolkContext) -> anyhow::Result<Self> {
        let mut reminder_ids = due.iter().map(|i| i.reminder_id.clone()).collect::<Vec<_>>();
        reminder_ids.sort();
        reminder_ids.dedup();
        let mut channel_ids = due.iter().map(|i| i.channel_id.clone()).collect::<Vec<_>>();
        channel_ids.sort();
        channel_ids.dedup();

        let reminders = ctx
            .repos
            .reminders
            .find_many(&reminder_ids)
            .await?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect::<HashMap<_, _>>();

        let mut contact_ids = reminders
            .values()
            .map(|r| r.contact_id.clone())
            .collect::<Vec<_>>();
        contact_ids.sort();
        contact_ids.dedup();
        let contacts = ctx
            .repos
            .contacts
            .find_many(&contact_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let channels = ctx
            .repos
            .channels
            .find_many(&channel_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        Ok(Self {
            reminders,
            contacts,
            channels,
        })
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDueRemindersUseCase {
    type Response = TickReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDueReminders";

    async fn execute(&mut self, ctx: &KinfolkContext) -> Result<Self::Response, Self::Error> {
        let now = truncate_to_minute(self.now);

        let due = ctx
            .repos
            .scheduled_instances
            .find_due(now)
            .await
            .map_err(|e| {
                error!("Unable to load due scheduled instances: {:?}", e);
                UseCaseError::StorageError
            })?;

        let mut report = TickReport::default();
        if due.is_empty() {
            return Ok(report);
        }

        let mut refs = DueRefs::load(&due, ctx).await.map_err(|e| {
            error!("Unable to load the references of due instances: {:?}", e);
            UseCaseError::StorageError
        })?;

        for instance in &due {
            let outcome = AssertUnwindSafe(process_instance(instance, &mut refs, now, ctx))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Outcome::Delivered) => report.delivered += 1,
                Ok(Outcome::Failed) => report.failed += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(_) => {
                    error!(
                        "Panic while processing scheduled instance: {}. It is left pending.",
                        instance.id
                    );
                    report.failed += 1;
                }
            }
        }

        if report.delivered + report.failed > 0 {
            info!(
                "Reminder tick at {}: {} delivered, {} failed, {} skipped",
                now, report.delivered, report.failed, report.skipped
            );
        }

        Ok(report)
    }
}

async fn process_instance(
    instance: &ScheduledInstance,
    refs: &mut DueRefs,
    now: DateTime<Utc>,
    ctx: &KinfolkContext,
) -> Outcome {
    let channel = match refs.channels.get(&instance.channel_id) {
        Some(channel) if channel.active => channel.clone(),
        Some(_) => {
            debug!(
                "Skipping scheduled instance: {} of inactive channel: {}",
                instance.id, instance.channel_id
            );
            return Outcome::Skipped;
        }
        None => {
            warn!(
                "Channel: {} of scheduled instance: {} was not found. Leaving it pending.",
                instance.channel_id, instance.id
            );
            return Outcome::Skipped;
        }
    };
    let reminder = match refs.reminders.get(&instance.reminder_id) {
        Some(reminder) => reminder.clone(),
        None => {
            warn!(
                "Reminder: {} of scheduled instance: {} was not found. Leaving it pending.",
                instance.reminder_id, instance.id
            );
            return Outcome::Skipped;
        }
    };
    let contact = match refs.contacts.get(&reminder.contact_id) {
        Some(contact) => contact,
        None => {
            error!(
                "Contact: {} of reminder: {} was not found. Leaving scheduled instance: {} pending.",
                reminder.contact_id, reminder.id, instance.id
            );
            return Outcome::Skipped;
        }
    };

    let notification = Notification::for_reminder(&reminder, contact);
    let outcome = match ctx
        .transports
        .send(&channel, &notification.subject, &notification.body)
        .await
    {
        Ok(()) => {
            let record = DeliveryRecord::success(
                channel.id.clone(),
                now,
                notification.subject,
                notification.body,
            );
            if let Err(e) = ctx.repos.delivery_records.record_success(&record, instance).await {
                error!(
                    "Unable to store the delivery of scheduled instance: {}. It is left pending: {:?}",
                    instance.id, e
                );
                return Outcome::Failed;
            }
            Outcome::Delivered
        }
        Err(e) => {
            warn!(
                "Unable to deliver scheduled instance: {} to channel: {}: {}",
                instance.id, channel.id, e
            );
            let record = DeliveryRecord::failure(
                channel.id.clone(),
                now,
                notification.subject,
                notification.body,
                &e.to_string(),
            );
            if let Err(e) = ctx.repos.delivery_records.insert(&record).await {
                error!("Unable to store failed delivery record: {:?}", e);
            }
            register_channel_failure(&channel, refs, ctx).await;
            Outcome::Failed
        }
    };

    reschedule(&reminder, &channel.id, refs, now, ctx).await;

    outcome
}

async fn register_channel_failure(
    channel: &NotificationChannel,
    refs: &mut DueRefs,
    ctx: &KinfolkContext,
) {
    let fails = match ctx.repos.channels.bump_fails(&channel.id).await {
        Ok(fails) => fails,
        Err(e) => {
            error!("Unable to count the failure of channel: {}: {:?}", channel.id, e);
            return;
        }
    };

    let mut channel = channel.clone();
    channel.fails = fails;
    if channel.has_reached_max_fails() {
        match ctx.repos.channels.set_active(&channel.id, false).await {
            Ok(()) => {
                channel.active = false;
                warn!(
                    "Channel: {} has failed {} deliveries in a row and was disabled",
                    channel.id, fails
                );
            }
            Err(e) => error!("Unable to disable channel: {}: {:?}", channel.id, e),
        }
    }
    refs.channels.insert(channel.id.clone(), channel);
}

/// Queues the next occurrence of a recurring `Reminder` on the channel it was just sent to
async fn reschedule(
    reminder: &Reminder,
    channel_id: &ID,
    refs: &mut DueRefs,
    now: DateTime<Utc>,
    ctx: &KinfolkContext,
) {
    if !reminder.reminder_type.is_recurring() {
        return;
    }

    let channel = match ctx.repos.channels.find(channel_id).await {
        Some(channel) => channel,
        None => return,
    };
    let active = channel.active;
    refs.channels.insert(channel.id.clone(), channel);
    if !active {
        return;
    }

    let tz = &ctx.config.timezone;
    let next = match reminder.next_schedule(&ctx.calendars, now, tz) {
        Ok(next) => next,
        Err(e) => {
            warn!(
                "Unable to find the next occurrence of reminder: {} in the {} calendar: {}. Falling back to gregorian.",
                reminder.id, reminder.calendar_type, e
            );
            reminder.gregorian_next_schedule(now)
        }
    };
    let scheduled_at = match next {
        Some(scheduled_at) => scheduled_at,
        None => {
            warn!(
                "Reminder: {} has no next occurrence after: {} with frequency: {}",
                reminder.id, now, reminder.frequency_number
            );
            return;
        }
    };

    let instance = ScheduledInstance::new(reminder.id.clone(), channel_id.clone(), scheduled_at);
    match ctx.repos.scheduled_instances.enqueue(&instance).await {
        Ok(true) => debug!(
            "Scheduled next instance of reminder: {} at: {}",
            reminder.id, scheduled_at
        ),
        Ok(false) => debug!(
            "Reminder: {} already has a pending instance on channel: {}",
            reminder.id, channel_id
        ),
        Err(e) => error!(
            "Unable to schedule the next instance of reminder: {}: {:?}",
            reminder.id, e
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_utils::{setup, ts, TestContext};
    use chrono::Duration;
    use kinfolk_domain::{ReminderType, MAX_CHANNEL_FAILS};
    use kinfolk_infra::{NotificationTransport, TransportError, TransportRegistry};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl NotificationTransport for RecordingTransport {
        async fn send(
            &self,
            destination: &str,
            subject: &str,
            _: &str,
        ) -> Result<(), TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), subject.to_string()));
            Ok(())
        }
    }

    struct FailingTransport;

    #[async_trait::async_trait]
    impl NotificationTransport for FailingTransport {
        async fn send(&self, _: &str, _: &str, _: &str) -> Result<(), TransportError> {
            Err(TransportError::Other("Mailbox unavailable".into()))
        }
    }

    struct PanickingTransport;

    #[async_trait::async_trait]
    impl NotificationTransport for PanickingTransport {
        async fn send(&self, _: &str, _: &str, _: &str) -> Result<(), TransportError> {
            panic!("Transport exploded")
        }
    }

    async fn insert_reminder(
        ctx: &KinfolkContext,
        contact: &Contact,
        reminder_type: ReminderType,
        channel: &NotificationChannel,
        scheduled_at: DateTime<Utc>,
    ) -> (Reminder, ScheduledInstance) {
        let reminder = Reminder::new(contact.id.clone(), "Dentist".into(), reminder_type);
        ctx.repos.reminders.insert(&reminder).await.unwrap();
        let instance =
            ScheduledInstance::new(reminder.id.clone(), channel.id.clone(), scheduled_at);
        assert!(ctx.repos.scheduled_instances.enqueue(&instance).await.unwrap());
        (reminder, instance)
    }

    #[actix_web::test]
    async fn delivers_one_time_reminder_once() {
        let TestContext {
            mut ctx,
            contact,
            channel,
        } = setup(ts(2026, 2, 5, 9, 0)).await;
        let recorder = Arc::new(RecordingTransport::default());
        ctx.transports =
            Arc::new(TransportRegistry::new().with_transport("email", recorder.clone()));

        let (reminder, instance) = insert_reminder(
            &ctx,
            &contact,
            ReminderType::OneTime,
            &channel,
            ts(2026, 2, 5, 9, 0),
        )
        .await;

        let mut usecase = SendDueRemindersUseCase {
            now: ts(2026, 2, 5, 9, 0) + Duration::seconds(30),
        };
        let report = usecase.execute(&ctx).await.unwrap();
        assert_eq!(
            report,
            TickReport {
                delivered: 1,
                failed: 0,
                skipped: 0
            }
        );
        assert_eq!(
            recorder.sent.lock().unwrap().clone(),
            vec![("ada@example.com".to_string(), "Reminder: Dentist".to_string())]
        );

        let instance = ctx.repos.scheduled_instances.find(&instance.id).await.unwrap();
        assert_eq!(instance.triggered_at, Some(ts(2026, 2, 5, 9, 0)));
        let reminder = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(reminder.number_times_triggered, 1);
        let instances = ctx
            .repos
            .scheduled_instances
            .find_by_reminder(&reminder.id)
            .await
            .unwrap();
        assert_eq!(instances.len(), 1);

        // A second tick has nothing to do
        let mut usecase = SendDueRemindersUseCase {
            now: ts(2026, 2, 5, 9, 1),
        };
        assert_eq!(usecase.execute(&ctx).await.unwrap(), TickReport::default());
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn reschedules_recurring_reminder() {
        let TestContext {
            ctx,
            contact,
            channel,
        } = setup(ts(2026, 3, 1, 9, 0)).await;

        let (mut reminder, _) = insert_reminder(
            &ctx,
            &contact,
            ReminderType::RecurringWeek,
            &channel,
            ts(2026, 3, 1, 9, 0),
        )
        .await;
        reminder.frequency_number = 2;
        ctx.repos.reminders.save(&reminder).await.unwrap();

        let mut usecase = SendDueRemindersUseCase {
            now: ts(2026, 3, 1, 9, 0),
        };
        assert_eq!(usecase.execute(&ctx).await.unwrap().delivered, 1);

        let pending = ctx
            .repos
            .scheduled_instances
            .find_by_reminder(&reminder.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|i| i.is_pending())
            .collect::<Vec<_>>();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].scheduled_at, ts(2026, 3, 15, 9, 0));
    }

    #[actix_web::test]
    async fn out_of_range_next_occurrence_is_not_scheduled() {
        let TestContext {
            ctx,
            contact,
            channel,
        } = setup(ts(2026, 3, 1, 9, 0)).await;

        let (mut reminder, instance) = insert_reminder(
            &ctx,
            &contact,
            ReminderType::RecurringWeek,
            &channel,
            ts(2026, 3, 1, 9, 0),
        )
        .await;
        reminder.frequency_number = 1_000_000_000;
        ctx.repos.reminders.save(&reminder).await.unwrap();

        let mut usecase = SendDueRemindersUseCase {
            now: ts(2026, 3, 1, 9, 0),
        };
        let report = usecase.execute(&ctx).await.unwrap();
        assert_eq!(
            report,
            TickReport {
                delivered: 1,
                failed: 0,
                skipped: 0
            }
        );

        let instances = ctx
            .repos
            .scheduled_instances
            .find_by_reminder(&reminder.id)
            .await
            .unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].id, instance.id);
        assert!(!instances[0].is_pending());
    }

    #[actix_web::test]
    async fn failed_deliveries_disable_the_channel() {
        let TestContext {
            mut ctx,
            contact,
            mut channel,
        } = setup(ts(2026, 2, 5, 9, 0)).await;
        ctx.transports =
            Arc::new(TransportRegistry::new().with_transport("email", Arc::new(FailingTransport)));

        // A channel one failure away from being disabled
        channel.fails = MAX_CHANNEL_FAILS - 1;
        ctx.repos.channels.delete(&channel.id).await.unwrap();
        ctx.repos.channels.insert(&channel).await.unwrap();

        let (_, instance) = insert_reminder(
            &ctx,
            &contact,
            ReminderType::RecurringMonth,
            &channel,
            ts(2026, 2, 5, 9, 0),
        )
        .await;

        let mut usecase = SendDueRemindersUseCase {
            now: ts(2026, 2, 5, 9, 0),
        };
        let report = usecase.execute(&ctx).await.unwrap();
        assert_eq!(report.failed, 1);

        let stored = ctx.repos.channels.find(&channel.id).await.unwrap();
        assert_eq!(stored.fails, MAX_CHANNEL_FAILS);
        assert!(!stored.active);

        let records = ctx
            .repos
            .delivery_records
            .find_by_channel(&channel.id, 10)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].error.as_deref(), Some("Mailbox unavailable"));

        // The instance is kept pending but the disabled channel is skipped from now on
        assert!(ctx
            .repos
            .scheduled_instances
            .find(&instance.id)
            .await
            .unwrap()
            .is_pending());
        let mut usecase = SendDueRemindersUseCase {
            now: ts(2026, 2, 5, 9, 1),
        };
        assert_eq!(usecase.execute(&ctx).await.unwrap().skipped, 1);
    }

    #[actix_web::test]
    async fn success_resets_channel_fails() {
        let TestContext {
            ctx,
            contact,
            mut channel,
        } = setup(ts(2026, 2, 5, 9, 0)).await;
        channel.fails = 3;
        ctx.repos.channels.delete(&channel.id).await.unwrap();
        ctx.repos.channels.insert(&channel).await.unwrap();
        insert_reminder(
            &ctx,
            &contact,
            ReminderType::OneTime,
            &channel,
            ts(2026, 2, 5, 9, 0),
        )
        .await;

        let mut usecase = SendDueRemindersUseCase {
            now: ts(2026, 2, 5, 9, 0),
        };
        assert_eq!(usecase.execute(&ctx).await.unwrap().delivered, 1);
        assert_eq!(ctx.repos.channels.find(&channel.id).await.unwrap().fails, 0);
    }

    #[actix_web::test]
    async fn a_panicking_transport_does_not_stop_the_tick() {
        let TestContext {
            mut ctx,
            contact,
            channel,
        } = setup(ts(2026, 2, 5, 9, 0)).await;
        let recorder = Arc::new(RecordingTransport::default());
        ctx.transports = Arc::new(
            TransportRegistry::new()
                .with_transport("email", recorder.clone())
                .with_transport("webhook", Arc::new(PanickingTransport)),
        );

        let mut webhook = NotificationChannel::new(
            channel.user_id.clone(),
            "webhook",
            "https://example.com/hook",
        );
        webhook.verified_at = Some(ts(2026, 1, 1, 0, 0));
        ctx.repos.channels.insert(&webhook).await.unwrap();

        let (_, exploding) = insert_reminder(
            &ctx,
            &contact,
            ReminderType::OneTime,
            &webhook,
            ts(2026, 2, 5, 8, 0),
        )
        .await;
        let (_, delivered) = insert_reminder(
            &ctx,
            &contact,
            ReminderType::OneTime,
            &channel,
            ts(2026, 2, 5, 9, 0),
        )
        .await;

        let mut usecase = SendDueRemindersUseCase {
            now: ts(2026, 2, 5, 9, 0),
        };
        let report = usecase.execute(&ctx).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);

        let find = |id: ID| {
            let ctx = ctx.clone();
            async move { ctx.repos.scheduled_instances.find(&id).await.unwrap() }
        };
        assert!(find(exploding.id).await.is_pending());
        assert!(!find(delivered.id).await.is_pending());
    }

    #[actix_web::test]
    async fn orphan_instances_are_left_pending() {
        let TestContext {
            ctx,
            contact,
            channel,
        } = setup(ts(2026, 2, 5, 9, 0)).await;

        let orphan =
            ScheduledInstance::new(ID::default(), channel.id.clone(), ts(2026, 2, 5, 9, 0));
        assert!(ctx.repos.scheduled_instances.enqueue(&orphan).await.unwrap());
        let (_, inactive_instance) = {
            let mut inactive =
                NotificationChannel::new(channel.user_id.clone(), "email", "old@example.com");
            inactive.active = false;
            ctx.repos.channels.insert(&inactive).await.unwrap();
            insert_reminder(
                &ctx,
                &contact,
                ReminderType::OneTime,
                &inactive,
                ts(2026, 2, 5, 9, 0),
            )
            .await
        };

        let mut usecase = SendDueRemindersUseCase {
            now: ts(2026, 2, 5, 9, 0),
        };
        let report = usecase.execute(&ctx).await.unwrap();
        assert_eq!(report.skipped, 2);
        assert!(ctx
            .repos
            .scheduled_instances
            .find(&inactive_instance.id)
            .await
            .unwrap()
            .is_pending());
    }
}
