use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIXTRAL_MODEL_ID: &str = "mixtral-8x7b-32768";
pub const LLAMA_MODEL_ID: &str = "llama-3.1-8b-instant";

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const MAX_TOKENS_LIMIT: u32 = 32000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Formal,
    Informal,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Formal => write!(f, "Formal"),
            Language::Informal => write!(f, "Informal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToneStyle {
    Friendly,
    #[default]
    Professional,
    Urgent,
}

impl fmt::Display for ToneStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneStyle::Friendly => write!(f, "Friendly"),
            ToneStyle::Professional => write!(f, "Professional"),
            ToneStyle::Urgent => write!(f, "Urgent"),
        }
    }
}

/// The model selector shown in the form.
///
/// Only two provider models are supported. Any selector that is not
/// recognised as Mixtral falls back to Llama 3.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelChoice {
    #[default]
    Llama31,
    Mixtral,
}

impl ModelChoice {
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim() {
            // "Mistral" is the legacy name of the Mixtral option.
            "Mixtral" | "Mistral" => ModelChoice::Mixtral,
            _ => ModelChoice::Llama31,
        }
    }

    pub fn model_id(&self) -> &'static str {
        match self {
            ModelChoice::Mixtral => MIXTRAL_MODEL_ID,
            ModelChoice::Llama31 => LLAMA_MODEL_ID,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelChoice::Mixtral => "Mixtral",
            ModelChoice::Llama31 => "Llama 3.1",
        }
    }
}

impl From<String> for ModelChoice {
    fn from(selector: String) -> Self {
        ModelChoice::from_selector(&selector)
    }
}

impl From<ModelChoice> for String {
    fn from(choice: ModelChoice) -> Self {
        choice.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    #[serde(rename = "model_choice")]
    pub model: ModelChoice,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        ModelParameters {
            model: ModelChoice::Llama31,
            temperature: 1.0,
            max_tokens: 1024,
        }
    }
}

impl ModelParameters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ValidationError::TemperatureOutOfRange(self.temperature));
        }
        if self.max_tokens > MAX_TOKENS_LIMIT {
            return Err(ValidationError::MaxTokensOutOfRange(self.max_tokens));
        }
        Ok(())
    }
}

/// Everything the form collects for one generation request.
///
/// Optional text fields default to an empty string, which means "not
/// provided". They are passed to the prompt as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRequestFields {
    pub recipient_name: String,
    pub recipient_role: String,
    pub company_name: String,
    pub sender_name: String,
    pub sender_role: String,
    pub sender_contact: String,
    pub sender_company: String,
    pub email_reason: String,
    pub specific_details: String,
    pub language: Language,
    pub tone_style: ToneStyle,
    pub cta_outcome: String,
    pub attachment_info: String,
    pub additional_instructions: String,
    #[serde(flatten)]
    pub parameters: ModelParameters,
}

impl EmailRequestFields {
    /// Checks the required fields in form order, then the model parameters.
    /// Only the first failure is reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.recipient_name) {
            return Err(ValidationError::MissingRecipientName);
        }
        if is_blank(&self.sender_name) {
            return Err(ValidationError::MissingSenderName);
        }
        if is_blank(&self.email_reason) {
            return Err(ValidationError::MissingEmailReason);
        }
        self.parameters.validate()
    }
}

/// A follow-up request asking the model to revise its latest draft.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineRequest {
    pub instruction: String,
    #[serde(flatten)]
    pub parameters: ModelParameters,
}

impl RefineRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.instruction) {
            return Err(ValidationError::MissingInstruction);
        }
        self.parameters.validate()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please provide the recipient's name.")]
    MissingRecipientName,

    #[error("Please provide the sender's name.")]
    MissingSenderName,

    #[error("Please provide the reason for the email.")]
    MissingEmailReason,

    #[error("Please provide a follow up instruction.")]
    MissingInstruction,

    #[error("There is no draft to refine yet. Generate an email first.")]
    NoDraftToRefine,

    #[error("Temperature must be between 0.0 and 2.0, got {0}.")]
    TemperatureOutOfRange(f32),

    #[error("Max tokens must be at most 32000, got {0}.")]
    MaxTokensOutOfRange(u32),
}

impl ValidationError {
    /// The form field the message belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingRecipientName => "recipient_name",
            ValidationError::MissingSenderName => "sender_name",
            ValidationError::MissingEmailReason => "email_reason",
            ValidationError::MissingInstruction | ValidationError::NoDraftToRefine => "instruction",
            ValidationError::TemperatureOutOfRange(_) => "temperature",
            ValidationError::MaxTokensOutOfRange(_) => "max_tokens",
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
