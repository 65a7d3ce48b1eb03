//! chat のユースケース

pub mod app;
pub mod chat;
pub mod compaction;
pub mod persistence;

pub use app::ChatApp;
pub use chat::ChatUseCase;
pub use compaction::{CompactionOutcome, CompactionUseCase};
pub use persistence::MemoryPersistence;
