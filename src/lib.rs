//! karir - RIASEC career assistant: assessment, chat pages, job matching

pub mod app;
pub mod assess;
pub mod chat;

pub use app::App;
