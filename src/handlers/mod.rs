pub mod email_handler;
pub mod session_handler;
