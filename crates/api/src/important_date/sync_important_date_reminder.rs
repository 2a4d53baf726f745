use crate::error::KinfolkError;
use crate::shared::{
    reminder_input::{schedule_initial_instances, InvalidReminderInput, ReminderInput},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use kinfolk_api_structs::sync_important_date_reminder::*;
use kinfolk_domain::{Reminder, ReminderType, ID};
use kinfolk_infra::KinfolkContext;
use tracing::{error, info};

pub async fn sync_important_date_reminder_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<KinfolkContext>,
) -> Result<HttpResponse, KinfolkError> {
    let usecase = SyncImportantDateReminderUseCase {
        important_date_id: path_params.important_date_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder)))
        .map_err(KinfolkError::from)
}

/// Makes the companion reminder of an `ImportantDate` follow its `remind_me` flag.
///
/// With `remind_me` set the yearly companion reminder is created and scheduled, or
/// updated from the date when it already exists. Without it the companion is deleted.
/// Responds with the companion reminder after the sync.
#[derive(Debug)]
pub struct SyncImportantDateReminderUseCase {
    pub important_date_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    ContactNotFound(ID),
    InvalidInput(InvalidReminderInput),
    StorageError,
}

impl From<UseCaseError> for KinfolkError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(important_date_id) => Self::NotFound(format!(
                "The important date with id: {}, was not found.",
                important_date_id
            )),
            UseCaseError::ContactNotFound(contact_id) => Self::NotFound(format!(
                "The contact with id: {}, was not found.",
                contact_id
            )),
            UseCaseError::InvalidInput(e) => Self::BadClientData(e.message()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SyncImportantDateReminderUseCase {
    type Response = Option<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncImportantDateReminder";

    async fn execute(&mut self, ctx: &KinfolkContext) -> Result<Self::Response, Self::Error> {
        let date = ctx
            .repos
            .important_dates
            .find(&self.important_date_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.important_date_id.clone()))?;

        let companion = ctx.repos.reminders.find_by_important_date(&date.id).await;

        if !date.remind_me {
            if let Some(reminder) = companion {
                ctx.repos
                    .reminders
                    .delete(&reminder.id)
                    .await
                    .map_err(|e| {
                        error!("Unable to delete companion reminder: {}: {:?}", reminder.id, e);
                        UseCaseError::StorageError
                    })?;
                info!(
                    "Deleted companion reminder: {} of important date: {}",
                    reminder.id, date.id
                );
            }
            return Ok(None);
        }

        let input = ReminderInput::from_important_date(&date);
        let now = ctx.sys.now();

        if let Some(mut reminder) = companion {
            input
                .apply(&mut reminder, None, ctx, now)
                .map_err(UseCaseError::InvalidInput)?;
            ctx.repos
                .reminders
                .save(&reminder)
                .await
                .map_err(|e| {
                    error!("Unable to save companion reminder: {}: {:?}", reminder.id, e);
                    UseCaseError::StorageError
                })?;
            return Ok(Some(reminder));
        }

        let contact = ctx
            .repos
            .contacts
            .find(&date.contact_id)
            .await
            .ok_or_else(|| UseCaseError::ContactNotFound(date.contact_id.clone()))?;

        let mut reminder = Reminder::new(
            contact.id.clone(),
            String::new(),
            ReminderType::RecurringYear,
        );
        reminder.important_date_id = Some(date.id.clone());
        input
            .apply(&mut reminder, None, ctx, now)
            .map_err(UseCaseError::InvalidInput)?;

        ctx.repos
            .reminders
            .insert(&reminder)
            .await
            .map_err(|e| {
                error!("Unable to insert companion reminder: {}: {:?}", reminder.id, e);
                UseCaseError::StorageError
            })?;
        schedule_initial_instances(&reminder, &contact, ctx, now)
            .await
            .map_err(|e| {
                error!("Unable to schedule first occurrence of reminder: {}: {:?}", reminder.id, e);
                UseCaseError::StorageError
            })?;

        Ok(Some(reminder))
    }
}
