mod create_reminder;
mod delete_reminder;
mod get_reminder_instances;
pub mod send_due_reminders;
mod update_reminder;

use actix_web::web;
use create_reminder::create_reminder_controller;
use delete_reminder::delete_reminder_controller;
use get_reminder_instances::get_reminder_instances_controller;
use update_reminder::update_reminder_controller;

pub use create_reminder::CreateReminderUseCase;
pub use delete_reminder::DeleteReminderUseCase;
pub use get_reminder_instances::GetReminderInstancesUseCase;
pub use update_reminder::UpdateReminderUseCase;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/contacts/{contact_id}/reminders",
        web::post().to(create_reminder_controller),
    );

    cfg.route(
        "/reminders/{reminder_id}",
        web::put().to(update_reminder_controller),
    );
    cfg.route(
        "/reminders/{reminder_id}",
        web::delete().to(delete_reminder_controller),
    );

    cfg.route(
        "/reminders/{reminder_id}/instances",
        web::get().to(get_reminder_instances_controller),
    );
}
