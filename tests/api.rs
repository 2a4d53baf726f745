mod helpers;

use actix_web::{http::StatusCode, test, web, App};
use helpers::setup::{setup_app, ts};
use kinfolk_api::configure_server_api;
use kinfolk_api_structs::{
    create_reminder, get_channel_deliveries, get_reminder_instances, get_service_health,
    sync_important_date_reminder, update_reminder,
};
use kinfolk_domain::{ImportantDate, ReminderType, ID};
use serde_json::json;

macro_rules! init_app {
    ($app:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($app.ctx.clone()))
                .service(web::scope("/api/v1").configure(configure_server_api)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_status_ok() {
    let app = setup_app(ts(2026, 2, 1, 8, 0)).await;
    let service = init_app!(app);

    let req = test::TestRequest::get().uri("/api/v1/").to_request();
    let res: get_service_health::APIResponse = test::call_and_read_body_json(&service, req).await;
    assert!(res.calendars.contains(&"gregorian".to_string()));
    assert!(res.calendars.contains(&"lunar".to_string()));
}

#[actix_web::test]
async fn test_create_and_update_reminder() {
    let app = setup_app(ts(2026, 2, 1, 8, 0)).await;
    let service = init_app!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/contacts/{}/reminders", app.contact.id))
        .set_json(json!({
            "label": "Dentist",
            "type": "one_time",
            "day": 5,
            "month": 2,
            "year": 2026
        }))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: create_reminder::APIResponse = test::read_body_json(res).await;
    assert_eq!(created.reminder.label, "Dentist");
    assert_eq!(created.reminder.reminder_type, ReminderType::OneTime);
    assert_eq!(created.scheduled_instances.len(), 1);
    assert_eq!(created.scheduled_instances[0].scheduled_at, ts(2026, 2, 5, 9, 0));
    assert!(!created.scheduled_instances[0].delivered);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/reminders/{}", created.reminder.id))
        .set_json(json!({
            "label": "Dentist appointment",
            "type": "recurring_month",
            "frequencyNumber": 6,
            "day": 5,
            "month": 2
        }))
        .to_request();
    let updated: update_reminder::APIResponse = test::call_and_read_body_json(&service, req).await;
    assert_eq!(updated.reminder.label, "Dentist appointment");
    assert_eq!(updated.reminder.frequency_number, 6);
    assert_eq!(updated.reminder.year, None);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/reminders/{}/instances", created.reminder.id))
        .to_request();
    let instances: get_reminder_instances::APIResponse =
        test::call_and_read_body_json(&service, req).await;
    assert_eq!(instances.instances, created.scheduled_instances);
}

#[actix_web::test]
async fn test_rejects_invalid_reminders() {
    let app = setup_app(ts(2026, 2, 1, 8, 0)).await;
    let service = init_app!(app);

    let bad_bodies = vec![
        json!({ "label": "Dentist", "type": "recurring_week", "frequencyNumber": 0 }),
        json!({ "label": "Dentist", "type": "recurring_week", "frequencyNumber": 1_000_000_000 }),
        json!({ "label": "Dentist", "type": "one_time", "day": 31, "month": 4 }),
        json!({ "label": "Dentist", "type": "every_day" }),
        json!({ "label": "Dentist" }),
        json!({ "type": "one_time" }),
    ];
    for body in bad_bodies {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/contacts/{}/reminders", app.contact.id))
            .set_json(body)
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/contacts/{}/reminders", ID::default()))
        .set_json(json!({ "label": "Dentist", "type": "one_time" }))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_reminder() {
    let app = setup_app(ts(2026, 2, 1, 8, 0)).await;
    let service = init_app!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/contacts/{}/reminders", app.contact.id))
        .set_json(json!({ "label": "Dentist", "type": "one_time", "day": 5, "month": 2 }))
        .to_request();
    let created: create_reminder::APIResponse = test::call_and_read_body_json(&service, req).await;

    let uri = format!("/api/v1/reminders/{}", created.reminder.id);
    let req = test::TestRequest::delete().uri(&uri).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::delete().uri(&uri).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = test::call_service(
        &service,
        test::TestRequest::get()
            .uri(&format!("{}/instances", uri))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_sync_important_date_reminder() {
    let app = setup_app(ts(2026, 1, 15, 10, 0)).await;
    let service = init_app!(app);

    let mut date = ImportantDate::new(app.contact.id.clone());
    date.date_type = Some("birthdate".into());
    date.calendar_type = Some("lunar".into());
    date.original_day = Some(15);
    date.original_month = Some(8);
    date.remind_me = true;
    app.ctx.repos.important_dates.insert(&date).await.unwrap();

    let uri = format!("/api/v1/important-dates/{}/reminder", date.id);
    let req = test::TestRequest::put().uri(&uri).to_request();
    let res: sync_important_date_reminder::APIResponse =
        test::call_and_read_body_json(&service, req).await;
    let reminder = res.reminder.expect("Companion reminder to be created");
    assert_eq!(reminder.important_date_id, Some(date.id.clone()));
    assert_eq!(reminder.calendar_type, "lunar");
    assert_eq!(reminder.reminder_type, ReminderType::RecurringYear);

    let req = test::TestRequest::delete().uri(&uri).to_request();
    let res: sync_important_date_reminder::APIResponse =
        test::call_and_read_body_json(&service, req).await;
    assert_eq!(res.reminder.map(|r| r.id), Some(reminder.id));
    assert!(app
        .ctx
        .repos
        .reminders
        .find_by_important_date(&date.id)
        .await
        .is_none());

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/important-dates/{}/reminder", ID::default()))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_channel_deliveries() {
    let mut app = setup_app(ts(2026, 2, 1, 8, 0)).await;
    let service = init_app!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/contacts/{}/reminders", app.contact.id))
        .set_json(json!({
            "label": "Dentist",
            "type": "one_time",
            "day": 5,
            "month": 2,
            "year": 2026
        }))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    app.transport.failing_next("Relay unavailable");
    app.tick(ts(2026, 2, 5, 9, 0)).await;
    app.tick(ts(2026, 2, 5, 9, 1)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}/deliveries?limit=10", app.channel.id))
        .to_request();
    let res: get_channel_deliveries::APIResponse =
        test::call_and_read_body_json(&service, req).await;
    assert_eq!(res.channel_id, app.channel.id);
    assert_eq!(res.active, Some(true));
    assert_eq!(res.fails, Some(0));
    assert_eq!(res.deliveries.len(), 2);
    assert_eq!(res.deliveries[0].error, None);
    assert_eq!(res.deliveries[1].error.as_deref(), Some("Relay unavailable"));
    assert_eq!(res.deliveries[0].subject, "Reminder: Dentist");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}/deliveries", ID::default()))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
