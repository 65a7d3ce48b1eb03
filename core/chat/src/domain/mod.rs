//! chat 固有のドメイン型（型と不変条件）

pub mod command;
pub mod conversation_memory;
pub mod memory_config;
pub mod priming;
pub mod stats;
pub mod turn;

pub use command::ChatCommand;
pub use conversation_memory::{CompactionSkip, ConversationMemory, MemorySnapshot};
pub use memory_config::MemoryConfig;
pub use priming::Priming;
pub use stats::MemoryStats;
pub use turn::Turn;
