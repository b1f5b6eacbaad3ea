//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod chat_event;
pub mod dictionary;
pub mod history;
pub mod transport;

pub use chat_event::ChatEvent;
pub use dictionary::DictionaryRepository;
pub use history::HistoryRepository;
pub use transport::ChatTransport;
