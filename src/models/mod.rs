pub mod conversation;
pub mod email_request;
pub mod user_session;
