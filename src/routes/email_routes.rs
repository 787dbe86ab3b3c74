use actix_session::Session;
use actix_web::{get, post, web, Responder};

use crate::handlers::email_handler;
use crate::models::email_request::{EmailRequestFields, RefineRequest};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(generate)
        .service(refine)
        .service(history)
        .service(draft);
}

#[post("/api/email/generate")]
async fn generate(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<EmailRequestFields>,
) -> impl Responder {
    email_handler::handle_generate(data, session, req_body.into_inner()).await
}

#[post("/api/email/refine")]
async fn refine(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<RefineRequest>,
) -> impl Responder {
    email_handler::handle_refine(data, session, req_body.into_inner()).await
}

#[get("/api/email/history")]
async fn history(data: web::Data<AppState>, session: Session) -> impl Responder {
    email_handler::history(data, session).await
}

#[get("/api/email/draft")]
async fn draft(data: web::Data<AppState>, session: Session) -> impl Responder {
    email_handler::latest_draft(data, session).await
}
