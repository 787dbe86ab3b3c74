use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use serde_json::json;

use crate::handlers::session_handler::current_session;
use crate::models::email_request::{EmailRequestFields, RefineRequest};
use crate::models::user_session::WorkflowState;
use crate::routes::app_state::AppState;
use crate::services::generation_service::{self, GenerationError};

enum Job {
    Generate(EmailRequestFields),
    Refine(RefineRequest),
}

pub async fn handle_generate(
    data: web::Data<AppState>,
    session: Session,
    fields: EmailRequestFields,
) -> HttpResponse {
    run_job(data, session, Job::Generate(fields)).await
}

pub async fn handle_refine(
    data: web::Data<AppState>,
    session: Session,
    request: RefineRequest,
) -> HttpResponse {
    run_job(data, session, Job::Refine(request)).await
}

async fn run_job(data: web::Data<AppState>, session: Session, job: Job) -> HttpResponse {
    let Some((session_id, handle)) = current_session(&data, &session).await else {
        error!("Generation requested without an initialized session");
        return HttpResponse::BadRequest().json(json!({"error": "Session not initialized"}));
    };

    // The task keeps running when the client disconnects, so the workflow
    // always gets back to idle and records its outcome.
    let completion = data.completion.clone();
    let task_handle = handle.clone();
    let task = actix_web::rt::spawn(async move {
        match job {
            Job::Generate(fields) => {
                generation_service::generate_email(&fields, &task_handle, completion.as_ref()).await
            }
            Job::Refine(request) => {
                generation_service::refine_email(&request, &task_handle, completion.as_ref()).await
            }
        }
    });

    match task.await {
        Ok(Ok(email)) => {
            info!("Draft ready for session {}", session_id);
            HttpResponse::Ok().json(json!({"email": email}))
        }
        Ok(Err(e)) => generation_error_response(&session_id, &e),
        Err(e) => {
            error!("Generation task for session {} failed: {:?}", session_id, e);
            handle.lock().await.workflow = WorkflowState::Idle;
            HttpResponse::InternalServerError().json(json!({"error": "Generation task failed"}))
        }
    }
}

fn generation_error_response(session_id: &str, err: &GenerationError) -> HttpResponse {
    match err {
        GenerationError::Validation(e) => {
            info!("Rejected request for session {}: {}", session_id, e);
            HttpResponse::BadRequest().json(json!({"error": e.to_string(), "field": e.field()}))
        }
        GenerationError::Completion(e) => {
            error!("Provider failure for session {}: {}", session_id, e);
            HttpResponse::BadGateway().json(json!({"error": e.to_string()}))
        }
        GenerationError::InProgress => {
            warn!("Session {} already has a generation in flight", session_id);
            HttpResponse::Conflict().json(json!({"error": err.to_string()}))
        }
    }
}

pub async fn history(data: web::Data<AppState>, session: Session) -> HttpResponse {
    match current_session(&data, &session).await {
        Some((_, handle)) => {
            let user_session = handle.lock().await;
            HttpResponse::Ok().json(json!({"history": user_session.history.turns()}))
        }
        None => HttpResponse::BadRequest().json(json!({"error": "Session not initialized"})),
    }
}

pub async fn latest_draft(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let Some((_, handle)) = current_session(&data, &session).await else {
        return HttpResponse::BadRequest().json(json!({"error": "Session not initialized"}));
    };

    let user_session = handle.lock().await;
    match user_session.history.latest_draft() {
        Some(turn) => HttpResponse::Ok().json(json!({"email": turn.content})),
        None => HttpResponse::NotFound().json(json!({"error": "No draft generated yet"})),
    }
}
