use crate::error::KinfolkError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use kinfolk_api_structs::get_reminder_instances::*;
use kinfolk_domain::{ScheduledInstance, ID};
use kinfolk_infra::KinfolkContext;
use tracing::error;

pub async fn get_reminder_instances_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<KinfolkContext>,
) -> Result<HttpResponse, KinfolkError> {
    let usecase = GetReminderInstancesUseCase {
        reminder_id: path_params.reminder_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|instances| HttpResponse::Ok().json(APIResponse::new(instances)))
        .map_err(KinfolkError::from)
}

#[derive(Debug)]
pub struct GetReminderInstancesUseCase {
    pub reminder_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for KinfolkError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(reminder_id) => Self::NotFound(format!(
                "The reminder with id: {}, was not found.",
                reminder_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetReminderInstancesUseCase {
    type Response = Vec<ScheduledInstance>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminderInstances";

    async fn execute(&mut self, ctx: &KinfolkContext) -> Result<Self::Response, Self::Error> {
        let reminder = ctx
            .repos
            .reminders
            .find(&self.reminder_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.reminder_id.clone()))?;

        let mut instances = ctx
            .repos
            .scheduled_instances
            .find_by_reminder(&reminder.id)
            .await
            .map_err(|e| {
                error!("Unable to find instances of reminder: {}: {:?}", reminder.id, e);
                UseCaseError::StorageError
            })?;
        instances.sort_by_key(|instance| instance.scheduled_at);

        Ok(instances)
    }
}
