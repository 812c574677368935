//! Stage one of the pipeline: turn a mission description into wing parameters.
//!
//! [`prompt`] holds the instruction template sent to the model, [`llm`] the
//! chat-completion client, and [`params`] the typed result and its parser.

pub mod llm;
pub mod params;
pub mod prompt;

pub use llm::{ChatClient, ChatMessage, ChatRequest, ChatResponse, ChatRole, LlmError, OpenAiChatClient};
pub use params::{MissionError, WingParameters, check_mission, parse_wing_parameters};
pub use prompt::{describe_wing, extraction_request};
