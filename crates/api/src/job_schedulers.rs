use crate::{
    reminder::send_due_reminders::{SendDueRemindersUseCase, TickReport},
    shared::usecase::execute,
};
use actix_web::rt::time::{interval, sleep_until, Instant};
use kinfolk_infra::KinfolkContext;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Runs the reminder dispatcher from the next minute boundary until `shutdown` is cancelled.
/// Ticks run one at a time and a tick in flight is completed before the job stops.
pub fn start_send_reminders_job(ctx: KinfolkContext, shutdown: CancellationToken) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);

        tokio::select! {
            _ = sleep_until(start) => {}
            _ = shutdown.cancelled() => return,
        }

        let mut poll_interval =
            interval(Duration::from_secs(ctx.config.reminder_poll_interval_secs));
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = poll_interval.tick() => {}
                _ = shutdown.cancelled() => break,
            }
            send_due_reminders(&ctx).await;
        }
        info!("Reminder dispatcher stopped");
    });
}

/// Runs a single dispatcher tick at the current time
pub async fn send_due_reminders(ctx: &KinfolkContext) -> Option<TickReport> {
    let usecase = SendDueRemindersUseCase { now: ctx.sys.now() };
    execute(usecase, ctx).await.ok()
}
