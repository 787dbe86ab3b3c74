use actix_session::{Session, SessionInsertError};
use actix_web::web;
use log::{info, warn};

use crate::global_session_manager::SessionHandle;
use crate::models::user_session::SessionView;
use crate::routes::app_state::AppState;

const SESSION_ID_KEY: &str = "session_id";

/// Looks up the session named by the cookie, if it is still alive.
pub async fn current_session(
    data: &web::Data<AppState>,
    session: &Session,
) -> Option<(String, SessionHandle)> {
    let session_id = match session.get::<String>(SESSION_ID_KEY) {
        Ok(Some(id)) => id,
        Ok(None) => return None,
        Err(e) => {
            warn!("Unreadable session cookie: {:?}", e);
            return None;
        }
    };

    match data.session_manager.get(&session_id).await {
        Some(handle) => Some((session_id, handle)),
        None => {
            warn!("Session {} from cookie is no longer known", session_id);
            None
        }
    }
}

async fn current_or_new_session(
    data: &web::Data<AppState>,
    session: &Session,
) -> Result<(String, SessionHandle), SessionInsertError> {
    if let Some(existing) = current_session(data, session).await {
        return Ok(existing);
    }

    let (session_id, handle) = data.session_manager.create().await;
    session.insert(SESSION_ID_KEY, session_id.clone())?;
    info!("Initialized user session: {}", session_id);
    Ok((session_id, handle))
}

pub async fn initialize_session(
    data: web::Data<AppState>,
    session: Session,
) -> Result<SessionView, SessionInsertError> {
    let (session_id, handle) = current_or_new_session(&data, &session).await?;
    let user_session = handle.lock().await;
    Ok(user_session.view(&session_id))
}

/// The landing screen's single trigger.
pub async fn grant_access(
    data: web::Data<AppState>,
    session: Session,
) -> Result<SessionView, SessionInsertError> {
    let (session_id, handle) = current_or_new_session(&data, &session).await?;
    let mut user_session = handle.lock().await;
    if user_session.enter_tool() {
        info!("Session {} entered the tool", session_id);
    }
    Ok(user_session.view(&session_id))
}

pub async fn end_session(data: web::Data<AppState>, session: Session) -> bool {
    let ended = match current_session(&data, &session).await {
        Some((session_id, _)) => {
            data.session_manager.remove(&session_id).await;
            info!("Ended user session: {}", session_id);
            true
        }
        None => false,
    };
    session.purge();
    ended
}
