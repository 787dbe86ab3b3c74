pub mod completion_service;
pub mod generation_service;
pub mod prompt_service;
