pub mod domain;
pub mod ports;

pub use domain::{CatalogEntry, ClientId, Intent, Message, OrderLookup, Role};
pub use ports::{
    CatalogService, ConversationService, IntentClassifier, OrderLookupService, PortError,
    PortResult, TranscriptStore,
};
