use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::web;

pub mod app_state;
pub mod email_routes;
pub mod session_routes;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(session_routes::init_routes)
        .configure(email_routes::init_routes);
}

/// Cookie session carrying only the opaque session id. Served over plain
/// HTTP on localhost, so the cookie is not marked secure.
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("tailormail_session".to_string())
        .cookie_secure(false)
        .build()
}
