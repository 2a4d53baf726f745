mod get_channel_deliveries;

use actix_web::web;
use get_channel_deliveries::get_channel_deliveries_controller;

pub use get_channel_deliveries::GetChannelDeliveriesUseCase;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/channels/{channel_id}/deliveries",
        web::get().to(get_channel_deliveries_controller),
    );
}
