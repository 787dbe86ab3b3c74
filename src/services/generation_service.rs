use log::{debug, error, info};

use crate::global_session_manager::SessionHandle;
use crate::models::email_request::{EmailRequestFields, ModelParameters, RefineRequest, ValidationError};
use crate::models::user_session::WorkflowState;
use crate::services::completion_service::{CompletionClient, CompletionError};
use crate::services::prompt_service::build_prompt;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("A draft is already being generated for this session")]
    InProgress,
}

/// Drafts a new email from the form fields.
///
/// Nothing is recorded when validation fails. Otherwise the prompt is kept in
/// the history as a user turn whether or not the provider call succeeds, and
/// the reply is appended as an assistant turn on success.
pub async fn generate_email(
    fields: &EmailRequestFields,
    session: &SessionHandle,
    client: &dyn CompletionClient,
) -> Result<String, GenerationError> {
    fields.validate()?;

    let prompt = build_prompt(fields);
    debug!("Built prompt:\n{}", prompt);
    run_generation(prompt, &fields.parameters, false, session, client).await
}

/// Asks the model to revise its latest draft with a free-form instruction.
pub async fn refine_email(
    request: &RefineRequest,
    session: &SessionHandle,
    client: &dyn CompletionClient,
) -> Result<String, GenerationError> {
    request.validate()?;
    run_generation(request.instruction.clone(), &request.parameters, true, session, client).await
}

/// The session lock is only held to mark the start and to record the
/// outcome, never across the provider call.
async fn run_generation(
    user_turn: String,
    parameters: &ModelParameters,
    needs_draft: bool,
    session: &SessionHandle,
    client: &dyn CompletionClient,
) -> Result<String, GenerationError> {
    let context = {
        let mut user_session = session.lock().await;
        if user_session.workflow == WorkflowState::Generating {
            return Err(GenerationError::InProgress);
        }
        if needs_draft && user_session.history.latest_draft().is_none() {
            return Err(ValidationError::NoDraftToRefine.into());
        }

        user_session.workflow = WorkflowState::Generating;
        user_session.history.append_user_turn(user_turn);
        let context = user_session.history.context();
        info!(
            "Generating with {} ({} of {} turns, temperature {}, max tokens {})",
            parameters.model.model_id(),
            context.len(),
            user_session.history.len(),
            parameters.temperature,
            parameters.max_tokens
        );
        context
    };

    let result = client
        .generate(
            &context,
            parameters.model.model_id(),
            parameters.temperature,
            parameters.max_tokens,
        )
        .await;

    let mut user_session = session.lock().await;
    user_session.workflow = WorkflowState::Idle;
    match result {
        Ok(reply) => {
            user_session.history.append_assistant_turn(reply.clone());
            info!("Generated a draft of {} characters", reply.len());
            Ok(reply)
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            Err(e.into())
        }
    }
}
