use actix_web::{web, HttpResponse};
use kinfolk_api_structs::get_service_health::*;
use kinfolk_infra::KinfolkContext;

async fn status(ctx: web::Data<KinfolkContext>) -> HttpResponse {
    HttpResponse::Ok().json(APIResponse {
        message: "Yo! We are up!\r\n".into(),
        calendars: ctx.calendars.names(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
