use crate::error::KinfolkError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use kinfolk_api_structs::remove_important_date_reminder::*;
use kinfolk_domain::{Reminder, ID};
use kinfolk_infra::KinfolkContext;
use tracing::error;

pub async fn remove_important_date_reminder_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<KinfolkContext>,
) -> Result<HttpResponse, KinfolkError> {
    let usecase = RemoveImportantDateReminderUseCase {
        important_date_id: path_params.important_date_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder)))
        .map_err(KinfolkError::from)
}

/// Deletes the companion reminder of an `ImportantDate`. The important date itself
/// may already be gone. Responds with the deleted reminder, if there was one.
#[derive(Debug)]
pub struct RemoveImportantDateReminderUseCase {
    pub important_date_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for KinfolkError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RemoveImportantDateReminderUseCase {
    type Response = Option<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "RemoveImportantDateReminder";

    async fn execute(&mut self, ctx: &KinfolkContext) -> Result<Self::Response, Self::Error> {
        let companion = match ctx
            .repos
            .reminders
            .find_by_important_date(&self.important_date_id)
            .await
        {
            Some(reminder) => reminder,
            None => return Ok(None),
        };

        ctx.repos
            .reminders
            .delete(&companion.id)
            .await
            .map_err(|e| {
                error!("Unable to delete companion reminder: {}: {:?}", companion.id, e);
                UseCaseError::StorageError
            })
    }
}
