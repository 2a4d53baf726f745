use crate::error::KinfolkError;
use crate::shared::{
    reminder_input::{schedule_initial_instances, InvalidReminderInput, ReminderInput},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use kinfolk_api_structs::create_reminder::*;
use kinfolk_domain::{Reminder, ReminderType, ScheduledInstance, ID};
use kinfolk_infra::KinfolkContext;
use tracing::error;

pub async fn create_reminder_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<KinfolkContext>,
) -> Result<HttpResponse, KinfolkError> {
    let usecase = CreateReminderUseCase {
        contact_id: path_params.contact_id.clone(),
        input: body.into_inner().into(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Created().json(APIResponse::new(res.reminder, res.instances)))
        .map_err(KinfolkError::from)
}

/// Creates a `Reminder` on a `Contact` and schedules its first instance on every channel
/// of the users sharing the vault of the contact
#[derive(Debug)]
pub struct CreateReminderUseCase {
    pub contact_id: ID,
    pub input: ReminderInput,
}

#[derive(Debug)]
pub struct UseCaseResponse {
    pub reminder: Reminder,
    pub instances: Vec<ScheduledInstance>,
}

#[derive(Debug)]
pub enum UseCaseError {
    ContactNotFound(ID),
    InvalidInput(InvalidReminderInput),
    StorageError,
}

impl From<UseCaseError> for KinfolkError {
    fn from(e: UseCaseError) -> Self {
        match e {
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
impl UseCase for CreateReminderUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminder";

    async fn execute(&mut self, ctx: &KinfolkContext) -> Result<Self::Response, Self::Error> {
        let contact = ctx
            .repos
            .contacts
            .find(&self.contact_id)
            .await
            .ok_or_else(|| UseCaseError::ContactNotFound(self.contact_id.clone()))?;

        let now = ctx.sys.now();
        let reminder_type = self.input.reminder_type.unwrap_or(ReminderType::OneTime);
        let mut reminder = Reminder::new(contact.id.clone(), String::new(), reminder_type);
        self.input
            .apply(&mut reminder, None, ctx, now)
            .map_err(UseCaseError::InvalidInput)?;

        ctx.repos
            .reminders
            .insert(&reminder)
            .await
            .map_err(|e| {
                error!("Unable to insert reminder: {}: {:?}", reminder.id, e);
                UseCaseError::StorageError
            })?;

        let instances = schedule_initial_instances(&reminder, &contact, ctx, now)
            .await
            .map_err(|e| {
                error!("Unable to schedule first occurrence of reminder: {}: {:?}", reminder.id, e);
                UseCaseError::StorageError
            })?;

        Ok(UseCaseResponse {
            reminder,
            instances,
        })
    }
}
