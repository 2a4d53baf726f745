mod remove_important_date_reminder;
mod sync_important_date_reminder;

use actix_web::web;
use remove_important_date_reminder::remove_important_date_reminder_controller;
use sync_important_date_reminder::sync_important_date_reminder_controller;

pub use remove_important_date_reminder::RemoveImportantDateReminderUseCase;
pub use sync_important_date_reminder::SyncImportantDateReminderUseCase;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/important-dates/{important_date_id}/reminder",
        web::put().to(sync_important_date_reminder_controller),
    );
    cfg.route(
        "/important-dates/{important_date_id}/reminder",
        web::delete().to(remove_important_date_reminder_controller),
    );
}
