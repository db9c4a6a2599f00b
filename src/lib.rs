pub mod core;
pub mod llm;
pub mod prompts;
pub mod rag;
pub mod server;
pub mod state;
pub mod unanswered;
