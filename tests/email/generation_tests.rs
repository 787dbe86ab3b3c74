use std::sync::Arc;

use tokio::sync::Mutex;

use tailormail::global_session_manager::SessionHandle;
use tailormail::models::conversation::{ConversationTurn, Role};
use tailormail::models::email_request::{
    EmailRequestFields, ModelChoice, RefineRequest, ValidationError, LLAMA_MODEL_ID, MIXTRAL_MODEL_ID,
};
use tailormail::models::user_session::{UserSession, WorkflowState};
use tailormail::services::completion_service::CompletionError;
use tailormail::services::generation_service::{generate_email, refine_email, GenerationError};
use tailormail::services::prompt_service::build_prompt;

use crate::support::{invoice_follow_up, MockCompletion, DRAFT};

fn new_session(history_max_turns: Option<usize>) -> SessionHandle {
    Arc::new(Mutex::new(UserSession::new(history_max_turns)))
}

#[tokio::test]
async fn missing_required_fields_never_reach_the_provider() {
    let cases = [
        (
            EmailRequestFields { recipient_name: String::new(), ..invoice_follow_up() },
            ValidationError::MissingRecipientName,
        ),
        (
            EmailRequestFields { sender_name: " ".to_string(), ..invoice_follow_up() },
            ValidationError::MissingSenderName,
        ),
        (
            EmailRequestFields { email_reason: String::new(), ..invoice_follow_up() },
            ValidationError::MissingEmailReason,
        ),
        (EmailRequestFields::default(), ValidationError::MissingRecipientName),
    ];

    for (fields, expected) in cases {
        let mut completion = MockCompletion::new();
        completion.expect_generate().never();
        let session = new_session(None);
        let before = session.lock().await.history.clone();

        let result = generate_email(&fields, &session, &completion).await;

        assert_eq!(result, Err(GenerationError::Validation(expected)));
        assert_eq!(session.lock().await.history, before);
        assert_eq!(session.lock().await.workflow, WorkflowState::Idle);
    }
}

#[tokio::test]
async fn success_appends_user_then_assistant_turn() {
    let fields = invoice_follow_up();
    let prompt = build_prompt(&fields);

    let mut completion = MockCompletion::new();
    let expected_prompt = prompt.clone();
    completion
        .expect_generate()
        .withf(move |history, model_id, temperature, max_tokens| {
            history.len() == 2
                && history[0].role == Role::System
                && history[1] == ConversationTurn::user(expected_prompt.clone())
                && model_id == LLAMA_MODEL_ID
                && *temperature == 1.0
                && *max_tokens == 1024
        })
        .times(1)
        .returning(|_, _, _, _| Ok(DRAFT.to_string()));

    let session = new_session(None);
    let before = session.lock().await.history.turns().to_vec();

    let reply = generate_email(&fields, &session, &completion).await.unwrap();
    assert_eq!(reply, DRAFT);

    let mut expected = before;
    expected.push(ConversationTurn::user(prompt));
    expected.push(ConversationTurn::assistant(DRAFT));
    assert_eq!(session.lock().await.history.turns(), expected.as_slice());
    assert_eq!(session.lock().await.workflow, WorkflowState::Idle);
}

#[tokio::test]
async fn provider_failure_keeps_only_the_user_turn() {
    let mut completion = MockCompletion::new();
    completion
        .expect_generate()
        .times(1)
        .returning(|_, _, _, _| Err(CompletionError::ProviderError("401 Unauthorized".to_string())));

    let session = new_session(None);
    let fields = invoice_follow_up();

    let result = generate_email(&fields, &session, &completion).await;

    assert!(matches!(
        result,
        Err(GenerationError::Completion(CompletionError::ProviderError(_)))
    ));
    let roles: Vec<Role> = session.lock().await.history.turns().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User]);
    assert_eq!(session.lock().await.history.turns()[1].content, build_prompt(&fields));
    assert!(session.lock().await.history.latest_draft().is_none());
    assert_eq!(session.lock().await.workflow, WorkflowState::Idle);
}

#[tokio::test]
async fn empty_response_is_surfaced_without_an_assistant_turn() {
    let mut completion = MockCompletion::new();
    completion
        .expect_generate()
        .times(1)
        .returning(|_, _, _, _| Err(CompletionError::EmptyResponseError));

    let session = new_session(None);
    let result = generate_email(&invoice_follow_up(), &session, &completion).await;

    assert_eq!(
        result,
        Err(GenerationError::Completion(CompletionError::EmptyResponseError))
    );
    assert_eq!(session.lock().await.history.len(), 2);
}

#[tokio::test]
async fn retry_after_failure_sends_the_earlier_user_turn_as_context() {
    let mut completion = MockCompletion::new();
    let mut sequence = mockall::Sequence::new();
    completion
        .expect_generate()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _, _| Err(CompletionError::ProviderError("rate limited".to_string())));
    completion
        .expect_generate()
        .withf(|history, _, _, _| {
            history.len() == 3 && history[1].role == Role::User && history[2].role == Role::User
        })
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _, _| Ok(DRAFT.to_string()));

    let session = new_session(None);
    let fields = invoice_follow_up();

    assert!(generate_email(&fields, &session, &completion).await.is_err());
    assert_eq!(generate_email(&fields, &session, &completion).await.unwrap(), DRAFT);

    let roles: Vec<Role> = session.lock().await.history.turns().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::User, Role::Assistant]);
}

#[tokio::test]
async fn mixtral_selection_uses_the_mixtral_model() {
    let mut completion = MockCompletion::new();
    completion
        .expect_generate()
        .withf(|_, model_id, temperature, max_tokens| {
            model_id == MIXTRAL_MODEL_ID && *temperature == 0.25 && *max_tokens == 400
        })
        .times(1)
        .returning(|_, _, _, _| Ok(DRAFT.to_string()));

    let mut fields = invoice_follow_up();
    fields.parameters.model = ModelChoice::from_selector("Mixtral");
    fields.parameters.temperature = 0.25;
    fields.parameters.max_tokens = 400;

    let session = new_session(None);
    assert!(generate_email(&fields, &session, &completion).await.is_ok());
}

#[tokio::test]
async fn refine_requires_an_existing_draft() {
    let mut completion = MockCompletion::new();
    completion.expect_generate().never();

    let session = new_session(None);
    let request = RefineRequest {
        instruction: "Make it shorter".to_string(),
        ..Default::default()
    };

    let result = refine_email(&request, &session, &completion).await;
    assert_eq!(
        result,
        Err(GenerationError::Validation(ValidationError::NoDraftToRefine))
    );
    assert_eq!(session.lock().await.history.len(), 1);
}

#[tokio::test]
async fn refine_rejects_a_blank_instruction() {
    let mut completion = MockCompletion::new();
    completion.expect_generate().never();

    let session = new_session(None);
    session.lock().await.history.append_user_turn("prompt");
    session.lock().await.history.append_assistant_turn(DRAFT);

    let result = refine_email(&RefineRequest::default(), &session, &completion).await;
    assert_eq!(
        result,
        Err(GenerationError::Validation(ValidationError::MissingInstruction))
    );
    assert_eq!(session.lock().await.history.len(), 3);
}

#[tokio::test]
async fn refine_sends_the_previous_draft_and_appends_the_revision() {
    let mut completion = MockCompletion::new();
    let mut sequence = mockall::Sequence::new();
    completion
        .expect_generate()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _, _| Ok(DRAFT.to_string()));
    completion
        .expect_generate()
        .withf(|history, _, _, _| {
            history.len() == 4
                && history[2] == ConversationTurn::assistant(DRAFT)
                && history[3] == ConversationTurn::user("Make it shorter")
        })
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _, _| Ok("Subject: Invoice #123\n\nHi Jane, any update? Sam".to_string()));

    let session = new_session(None);
    generate_email(&invoice_follow_up(), &session, &completion).await.unwrap();

    let request = RefineRequest {
        instruction: "Make it shorter".to_string(),
        ..Default::default()
    };
    let revised = refine_email(&request, &session, &completion).await.unwrap();

    assert!(revised.contains("any update"));
    assert_eq!(session.lock().await.history.len(), 5);
    assert_eq!(session.lock().await.history.latest_draft().unwrap().content, revised);
}

#[tokio::test]
async fn window_limits_what_is_sent_but_not_what_is_kept() {
    let mut completion = MockCompletion::new();
    completion
        .expect_generate()
        .withf(|history, _, _, _| history.len() <= 3 && history[0].role == Role::System)
        .times(3)
        .returning(|_, _, _, _| Ok(DRAFT.to_string()));

    let session = new_session(Some(2));
    let fields = invoice_follow_up();
    for _ in 0..3 {
        generate_email(&fields, &session, &completion).await.unwrap();
    }

    assert_eq!(session.lock().await.history.len(), 7);
}

#[tokio::test]
async fn session_is_unlocked_and_generating_during_the_provider_call() {
    let session = new_session(None);
    let observed = session.clone();

    let mut completion = MockCompletion::new();
    completion
        .expect_generate()
        .times(1)
        .returning(move |_, _, _, _| {
            let user_session = observed
                .try_lock()
                .expect("the session lock must be free while the provider works");
            assert_eq!(user_session.workflow, WorkflowState::Generating);
            assert_eq!(user_session.history.len(), 2);
            Ok(DRAFT.to_string())
        });

    generate_email(&invoice_follow_up(), &session, &completion).await.unwrap();
    assert_eq!(session.lock().await.workflow, WorkflowState::Idle);
}

#[tokio::test]
async fn second_generation_is_refused_while_one_is_running() {
    let mut completion = MockCompletion::new();
    completion.expect_generate().never();

    let session = new_session(None);
    session.lock().await.workflow = WorkflowState::Generating;

    let result = generate_email(&invoice_follow_up(), &session, &completion).await;
    assert_eq!(result, Err(GenerationError::InProgress));

    let request = RefineRequest {
        instruction: "Make it shorter".to_string(),
        ..Default::default()
    };
    let result = refine_email(&request, &session, &completion).await;
    assert_eq!(result, Err(GenerationError::InProgress));

    let user_session = session.lock().await;
    assert_eq!(user_session.history.len(), 1);
    assert_eq!(user_session.workflow, WorkflowState::Generating);
}
