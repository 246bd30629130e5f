//! crates/nihongo_core/src/fallback.rs
//!
//! The local responder used whenever the remote completion API is not
//! configured or fails. Replies are picked by keyword, falling back to a
//! random general remark.

use async_trait::async_trait;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::sync::{Mutex, PoisonError};

use crate::domain::Message;
use crate::ports::TutorResponseService;

/// The topics the responder recognises, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Greeting,
    Gratitude,
    Grammar,
    Vocabulary,
    QuestionForm,
    Counting,
    Politeness,
    Particles,
    Help,
}

enum Keywords {
    Any(&'static [&'static str]),
    All(&'static [&'static str]),
}

impl Keywords {
    fn matches(&self, input: &str) -> bool {
        match self {
            Self::Any(words) => words.iter().any(|w| input.contains(w)),
            Self::All(words) => words.iter().all(|w| input.contains(w)),
        }
    }
}

const TOPICS: &[(Topic, Keywords)] = &[
    (Topic::Greeting, Keywords::Any(&["hello", "こんにちは", "konnichiwa"])),
    (Topic::Gratitude, Keywords::Any(&["thank", "ありがとう", "arigato"])),
    (Topic::Grammar, Keywords::Any(&["grammar", "grammer", "文法"])),
    (Topic::Vocabulary, Keywords::Any(&["vocabulary", "vocab", "単語"])),
    (Topic::QuestionForm, Keywords::All(&["how", "say"])),
    (Topic::Counting, Keywords::Any(&["counting", "numbers", "数"])),
    (Topic::Politeness, Keywords::Any(&["polite", "masu", "formal"])),
    (Topic::Particles, Keywords::Any(&["particles", "助詞"])),
    (Topic::Help, Keywords::Any(&["help"])),
];

const GENERAL_REMARKS: [&str; 5] = [
    "That's a great question about Japanese! The particle 'wa' (は) is often used to mark the topic of discussion. For example: 'Nihon wa utsukushii desu' (Japan is beautiful).",
    "Interesting! In Japanese, context is very important. Sometimes you don't need to state the subject because it's understood from context. This is different from English.",
    "Great question! Remember that Japanese has different levels of politeness. The '-masu' form is polite, while the dictionary form is casual. Choose appropriately based on your relationship with the listener.",
    "Excellent! Japanese verbs conjugate differently than English verbs. The basic form doesn't change for person (I/you/he), unlike English. For example: 'iku' (to go) is the same regardless of who goes.",
    "Very good! Japanese has two types of adjectives: '-i' adjectives (like 'atsui' - hot) and '-na' adjectives (like 'shizuka na' - quiet). They conjugate differently.",
];

impl Topic {
    /// The first topic whose keywords appear in the input, case-insensitively.
    pub fn classify(user_input: &str) -> Option<Self> {
        let lowered = user_input.to_lowercase();
        TOPICS
            .iter()
            .find(|(_, keywords)| keywords.matches(&lowered))
            .map(|(topic, _)| *topic)
    }

    pub fn reply(self) -> &'static str {
        match self {
            Self::Greeting => "Kon'nichiwa! こんにちは！ How can I help you with your Japanese studies today?",
            Self::Gratitude => "Dou itashimashite! どういたしまして！ You're welcome! Remember, 'arigatou gozaimasu' is more polite than 'arigatou'.",
            Self::Grammar => "Let me explain a common grammar point: The particle 'wa' (は) marks the topic of the sentence. For example: 'Watashi wa gakusei desu' (私は学生です) means 'As for me, I am a student.'",
            Self::Vocabulary => "Here's a useful vocabulary tip: The word 'kurasu' (クラス) means 'class' as in classroom. But be careful - in some contexts it can sound like 'class' in English. The Japanese word for 'class' (lesson) is 'jugyou' (授業).",
            Self::QuestionForm => "To form questions in Japanese, simply add 'ka' at the end of a statement. For example: 'Nihonjin desu' (You are Japanese) becomes 'Nihonjin desu ka?' (Are you Japanese?). The pitch usually rises at the end when asking.",
            Self::Counting => "In Japanese, counting depends on the objects being counted. For general objects, use: 1=ichi, 2=ni, 3=san, 4=yon, 5=go, 6=roku, 7=nana, 8=hachi, 9=kyuu, 10=juu. Note that 4 can be 'shi' but 'yon' is preferred to avoid association with death ('shi').",
            Self::Politeness => "The '-masu' form is the polite non-past form. For example: 'tabemasu' (eat), 'nomimasu' (drink), 'ikimasu' (go). To make it past tense, use '-mashita': 'tabemashita' (ate), 'ikimashita' (went).",
            Self::Particles => "Particles are crucial in Japanese grammar. 'wa' (は) marks the topic, 'ga' (が) marks the subject, 'wo' (を) marks the direct object, 'ni' (に) indicates direction/time, and 'de' (で) indicates location of action. Example: 'Watashi wa gakkou de hon wo yomimasu' (I read books at school).",
            Self::Help => "I'm here to help you learn Japanese! You can ask me about grammar, vocabulary, pronunciation, or practice conversations. Try asking about particles, counters, or how to say something specific in Japanese.",
        }
    }
}

/// Canned-reply tutor. The random source is injectable so tests can seed it.
pub struct FallbackResponder {
    rng: Mutex<StdRng>,
}

impl FallbackResponder {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Replies to `user_input` without any network access.
    pub fn generate_mock_response(&self, user_input: &str) -> String {
        if let Some(topic) = Topic::classify(user_input) {
            return topic.reply().to_string();
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        GENERAL_REMARKS
            .choose(&mut *rng)
            .copied()
            .unwrap_or(GENERAL_REMARKS[0])
            .to_string()
    }
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TutorResponseService for FallbackResponder {
    async fn generate_response(
        &self,
        user_input: &str,
        _context: &str,
        _conversation_history: &[Message],
    ) -> String {
        self.generate_mock_response(user_input)
    }

    fn is_configured(&self) -> bool {
        false
    }
}
