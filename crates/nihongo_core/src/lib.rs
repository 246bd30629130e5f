pub mod catalog;
pub mod domain;
pub mod fallback;
pub mod ports;
pub mod store;

pub use catalog::Catalog;
pub use domain::{
    AuthState, Exercise, GrammarPoint, Lesson, LessonId, Message, MessageId, Registration, Sender,
    User, UserStats, UserUpdate, VocabularyEntry,
};
pub use fallback::{FallbackResponder, Topic};
pub use ports::{Delay, NoDelay, PortError, PortResult, TutorResponseService};
pub use store::{SessionStore, StoreLatency};
