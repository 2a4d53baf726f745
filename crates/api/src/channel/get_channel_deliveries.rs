use crate::error::KinfolkError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use kinfolk_api_structs::get_channel_deliveries::*;
use kinfolk_domain::{DeliveryRecord, NotificationChannel, ID};
use kinfolk_infra::KinfolkContext;
use tracing::error;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

pub async fn get_channel_deliveries_controller(
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<KinfolkContext>,
) -> Result<HttpResponse, KinfolkError> {
    let usecase = GetChannelDeliveriesUseCase {
        channel_id: path_params.channel_id.clone(),
        limit: query_params.limit,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse::new(res.channel_id, res.channel, res.deliveries))
        })
        .map_err(KinfolkError::from)
}

/// Delivery history of a channel, newest first. The history of a deleted channel is
/// still available.
#[derive(Debug)]
pub struct GetChannelDeliveriesUseCase {
    pub channel_id: ID,
    pub limit: Option<usize>,
}

#[derive(Debug)]
pub struct UseCaseResponse {
    pub channel_id: ID,
    pub channel: Option<NotificationChannel>,
    pub deliveries: Vec<DeliveryRecord>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidLimit(usize),
    StorageError,
}

impl From<UseCaseError> for KinfolkError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(channel_id) => Self::NotFound(format!(
                "The channel with id: {}, was not found.",
                channel_id
            )),
            UseCaseError::InvalidLimit(limit) => Self::BadClientData(format!(
                "The limit: {} is not valid, it has to be between 1 and {}",
                limit, MAX_LIMIT
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetChannelDeliveriesUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "GetChannelDeliveries";

    async fn execute(&mut self, ctx: &KinfolkContext) -> Result<Self::Response, Self::Error> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(UseCaseError::InvalidLimit(limit));
        }

        let channel = ctx.repos.channels.find(&self.channel_id).await;
        let deliveries = ctx
            .repos
            .delivery_records
            .find_by_channel(&self.channel_id, limit)
            .await
            .map_err(|e| {
                error!("Unable to find deliveries of channel: {}: {:?}", self.channel_id, e);
                UseCaseError::StorageError
            })?;

        if channel.is_none() && deliveries.is_empty() {
            return Err(UseCaseError::NotFound(self.channel_id.clone()));
        }

        Ok(UseCaseResponse {
            channel_id: self.channel_id.clone(),
            channel,
            deliveries,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_utils::{setup, ts, TestContext};

    #[actix_web::test]
    async fn lists_history_newest_first() {
        let TestContext { ctx, channel, .. } = setup(ts(2026, 2, 5, 9, 0)).await;

        for minute in 0..3 {
            let record = DeliveryRecord::failure(
                channel.id.clone(),
                ts(2026, 2, 5, 9, minute),
                "Reminder: Dentist".into(),
                "<p>Dentist</p>".into(),
                "Timeout",
            );
            ctx.repos.delivery_records.insert(&record).await.unwrap();
        }

        let mut usecase = GetChannelDeliveriesUseCase {
            channel_id: channel.id.clone(),
            limit: Some(2),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert!(res.channel.is_some());
        assert_eq!(
            res.deliveries.iter().map(|d| d.sent_at).collect::<Vec<_>>(),
            vec![ts(2026, 2, 5, 9, 2), ts(2026, 2, 5, 9, 1)]
        );

        // History survives the channel
        ctx.repos.channels.delete(&channel.id).await.unwrap();
        let mut usecase = GetChannelDeliveriesUseCase {
            channel_id: channel.id.clone(),
            limit: None,
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert!(res.channel.is_none());
        assert_eq!(res.deliveries.len(), 3);
    }

    #[actix_web::test]
    async fn rejects_unknown_channels_and_bad_limits() {
        let TestContext { ctx, channel, .. } = setup(ts(2026, 2, 5, 9, 0)).await;

        let mut usecase = GetChannelDeliveriesUseCase {
            channel_id: ID::default(),
            limit: None,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(_))
        ));

        let mut usecase = GetChannelDeliveriesUseCase {
            channel_id: channel.id.clone(),
            limit: Some(0),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::InvalidLimit(0))
        ));
    }
}
