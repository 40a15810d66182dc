pub mod format;
pub mod intent;
pub mod resolver;
pub mod session;

pub use intent::KeywordIntentClassifier;
pub use resolver::ReplyResolver;
pub use session::{
    ChatSession, PendingReply, SessionConfig, SessionSnapshot, SessionView, SubmitOutcome,
    SubscriptionId,
};
