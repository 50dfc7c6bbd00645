pub mod bus;
pub mod config;
pub mod engine;
pub mod interpreter;
pub mod repository;
pub mod scheduler;
pub mod status;
pub mod store;

pub use bus::{InboundSignal, MatchAgreed, OutboundSignal, SignalBus};
pub use config::Config;
pub use engine::ConsentEngine;
pub use repository::{InMemoryRepository, JsonFileRepository, SnapshotRepository};
pub use status::{SessionStatusEntry, StatusReport, StatusSummary};
pub use store::SessionStore;
