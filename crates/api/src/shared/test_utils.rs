use chrono::{DateTime, TimeZone, Utc};
use kinfolk_domain::{Contact, NotificationChannel, VaultMembership, ID};
use kinfolk_infra::{KinfolkContext, StaticTimeSys};
use std::sync::Arc;

pub struct TestContext {
    pub ctx: KinfolkContext,
    pub contact: Contact,
    pub channel: NotificationChannel,
}

pub fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Inmemory context frozen at `now` with one contact in a vault whose only member
/// has a verified email channel
pub async fn setup(now: DateTime<Utc>) -> TestContext {
    let mut ctx = KinfolkContext::create_inmemory();
    ctx.sys = Arc::new(StaticTimeSys::at(now));
    ctx.config.timezone = chrono_tz::UTC;

    let membership = VaultMembership {
        vault_id: ID::default(),
        user_id: ID::default(),
    };
    ctx.repos.vault_memberships.insert(&membership).await.unwrap();

    let contact = Contact::new(membership.vault_id.clone(), Some("Ada"), Some("Lovelace"));
    ctx.repos.contacts.insert(&contact).await.unwrap();

    let mut channel = NotificationChannel::new(membership.user_id, "email", "ada@example.com");
    channel.verified_at = Some(now);
    ctx.repos.channels.insert(&channel).await.unwrap();

    TestContext {
        ctx,
        contact,
        channel,
    }
}
