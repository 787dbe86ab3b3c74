use actix_session::Session;
use actix_web::{get, post, web, HttpResponse, Responder};
use log::error;
use serde_json::json;

use crate::handlers::session_handler;
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(init_session)
        .service(access_tool)
        .service(end_session);
}

#[get("/api/session")]
async fn init_session(data: web::Data<AppState>, session: Session) -> impl Responder {
    match session_handler::initialize_session(data, session).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => {
            error!("Error initializing session: {:?}", e);
            HttpResponse::InternalServerError().json(json!({"error": e.to_string()}))
        }
    }
}

#[post("/api/session/access")]
async fn access_tool(data: web::Data<AppState>, session: Session) -> impl Responder {
    match session_handler::grant_access(data, session).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => {
            error!("Error granting access: {:?}", e);
            HttpResponse::InternalServerError().json(json!({"error": e.to_string()}))
        }
    }
}

#[post("/api/session/end")]
async fn end_session(data: web::Data<AppState>, session: Session) -> impl Responder {
    let ended = session_handler::end_session(data, session).await;
    HttpResponse::Ok().json(json!({"ended": ended}))
}
