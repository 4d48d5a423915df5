//! Karir Agent - tool-using chat runtime, bounded session memory and chat pages

pub mod context;
pub mod pages;
pub mod runtime;
pub mod session;

pub use context::ContextManager;
pub use pages::Page;
pub use runtime::{AgentConfig, AgentEvent, AgentRuntime, UNABLE_TO_PROCESS};
pub use session::{Session, SessionKey, SessionRegistry};
