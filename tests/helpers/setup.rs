use super::transports::ScriptedTransport;
use chrono::{DateTime, TimeZone, Utc};
use kinfolk_api::{execute, SendDueRemindersUseCase, TickReport};
use kinfolk_domain::{Contact, NotificationChannel, VaultMembership, ID};
use kinfolk_infra::{KinfolkContext, StaticTimeSys, TransportRegistry};
use std::sync::Arc;

pub struct TestApp {
    pub ctx: KinfolkContext,
    pub contact: Contact,
    pub channel: NotificationChannel,
    pub transport: Arc<ScriptedTransport>,
}

impl TestApp {
    /// Moves the clock of the context
    pub fn at(&mut self, now: DateTime<Utc>) -> &KinfolkContext {
        self.ctx.sys = Arc::new(StaticTimeSys::at(now));
        &self.ctx
    }

    pub async fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        let ctx = self.at(now);
        execute(SendDueRemindersUseCase { now }, ctx)
            .await
            .expect("Tick to succeed")
    }
}

pub fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Inmemory context in UTC where `email` channels deliver through a `ScriptedTransport`.
/// The vault of the contact has one member with one verified email channel.
pub async fn setup_app(now: DateTime<Utc>) -> TestApp {
    setup_app_with_channel(now, |_| {}).await
}

pub async fn setup_app_with_channel<F>(now: DateTime<Utc>, modify_channel: F) -> TestApp
where
    F: FnOnce(&mut NotificationChannel),
{
    let transport = Arc::new(ScriptedTransport::default());
    let mut ctx = KinfolkContext::create_inmemory();
    ctx.config.timezone = chrono_tz::UTC;
    ctx.sys = Arc::new(StaticTimeSys::at(now));
    ctx.transports = Arc::new(TransportRegistry::new().with_transport("email", transport.clone()));

    let membership = VaultMembership {
        vault_id: ID::default(),
        user_id: ID::default(),
    };
    ctx.repos
        .vault_memberships
        .insert(&membership)
        .await
        .expect("To insert membership");

    let contact = Contact::new(membership.vault_id.clone(), Some("Ada"), Some("Lovelace"));
    ctx.repos.contacts.insert(&contact).await.expect("To insert contact");

    let mut channel = NotificationChannel::new(membership.user_id, "email", "ada@example.com");
    channel.verified_at = Some(now);
    modify_channel(&mut channel);
    ctx.repos.channels.insert(&channel).await.expect("To insert channel");

    TestApp {
        ctx,
        contact,
        channel,
        transport,
    }
}
