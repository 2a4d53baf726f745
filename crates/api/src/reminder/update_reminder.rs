use crate::error::KinfolkError;
use crate::shared::{
    reminder_input::{InvalidReminderInput, ReminderInput},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use kinfolk_api_structs::update_reminder::*;
use kinfolk_domain::{Reminder, ID};
use kinfolk_infra::KinfolkContext;
use tracing::error;

pub async fn update_reminder_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<KinfolkContext>,
) -> Result<HttpResponse, KinfolkError> {
    let usecase = UpdateReminderUseCase {
        reminder_id: path_params.reminder_id.clone(),
        input: body.into_inner().into(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder)))
        .map_err(KinfolkError::from)
}

/// Replaces the editable fields of a `Reminder`. Pending instances are left as they are,
/// the next occurrence is computed from the new fields when an instance fires.
#[derive(Debug)]
pub struct UpdateReminderUseCase {
    pub reminder_id: ID,
    pub input: ReminderInput,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidInput(InvalidReminderInput),
    StorageError,
}

impl From<UseCaseError> for KinfolkError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(reminder_id) => Self::NotFound(format!(
                "The reminder with id: {}, was not found.",
                reminder_id
            )),
            UseCaseError::InvalidInput(e) => Self::BadClientData(e.message()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateReminder";

    async fn execute(&mut self, ctx: &KinfolkContext) -> Result<Self::Response, Self::Error> {
        let mut reminder = ctx
            .repos
            .reminders
            .find(&self.reminder_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.reminder_id.clone()))?;

        // Companion reminders fall back to the label of their important date
        let fallback_label = match &reminder.important_date_id {
            Some(important_date_id) => ctx
                .repos
                .important_dates
                .find(important_date_id)
                .await
                .and_then(|date| date.reminder_label()),
            None => None,
        };

        self.input
            .apply(&mut reminder, fallback_label, ctx, ctx.sys.now())
            .map_err(UseCaseError::InvalidInput)?;

        ctx.repos
            .reminders
            .save(&reminder)
            .await
            .map_err(|e| {
                error!("Unable to save reminder: {}: {:?}", reminder.id, e);
                UseCaseError::StorageError
            })?;

        Ok(reminder)
    }
}
