pub mod chat;
pub mod ingestion;
pub mod providers;
pub mod ranking;
pub mod recommendations;
pub mod refiner;
pub mod selector;
pub mod session;
pub mod similarity;
pub mod vocabulary;

pub use session::{SessionMemory, SessionSnapshot};
pub use vocabulary::Vocabulary;
