pub mod delay;
pub mod tutor_llm;

pub use delay::TokioDelay;
pub use tutor_llm::{QwenTutorAdapter, TutorSettings};
