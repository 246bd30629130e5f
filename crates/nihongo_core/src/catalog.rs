//! crates/nihongo_core/src/catalog.rs
//!
//! The read-only lesson catalog. Built once at startup, either from the
//! lessons shipped with the application or from a JSON file.

use crate::domain::{Exercise, GrammarPoint, Lesson, LessonId, VocabularyEntry};
use crate::ports::{PortError, PortResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    lessons: Vec<Lesson>,
}

impl Catalog {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    /// Parses a JSON array of lessons (camelCase keys).
    pub fn from_json(json: &str) -> PortResult<Self> {
        let lessons: Vec<Lesson> = serde_json::from_str(json)
            .map_err(|e| PortError::Unexpected(format!("Malformed lesson catalog: {}", e)))?;
        Ok(Self::new(lessons))
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn get(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id == id)
    }

    pub fn contains(&self, id: LessonId) -> bool {
        self.get(id).is_some()
    }

    /// The lessons that ship with the application (Minna no Nihongo 1-3).
    pub fn builtin() -> Self {
        Self::new(vec![introduction(), family(), numbers_and_time()])
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

//=========================================================================================
// Built-in Lessons
//=========================================================================================

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn grammar(id: &str, pattern: &str, explanation: &str, examples: &[&str], notes: &str) -> GrammarPoint {
    GrammarPoint {
        id: id.to_string(),
        pattern: pattern.to_string(),
        explanation: explanation.to_string(),
        examples: strings(examples),
        usage_notes: notes.to_string(),
    }
}

fn word(id: &str, word: &str, reading: &str, meaning: &str, example: &str) -> VocabularyEntry {
    VocabularyEntry {
        id: id.to_string(),
        word: word.to_string(),
        reading: reading.to_string(),
        meaning: meaning.to_string(),
        level: "N5".to_string(),
        example_sentences: strings(&[example]),
    }
}

fn introduction() -> Lesson {
    Lesson {
        id: 1,
        title: "はじめまして - Introduction".to_string(),
        textbook: "Minna no Nihongo".to_string(),
        chapter: "Lesson 1".to_string(),
        content: "Basic greetings and introductions in Japanese. Learn to say hello, goodbye, and introduce yourself.".to_string(),
        grammar_points: vec![
            grammar(
                "gr-1",
                "です (desu)",
                "The copula verb used to end sentences formally",
                &["これは本です (This is a book)", "私は学生です (I am a student)"],
                "Used in formal situations and written language",
            ),
            grammar(
                "gr-2",
                "は (wa)",
                "Topic particle marking the topic of the sentence",
                &["私は田中です (I am Tanaka)", "これは何ですか？(What is this?)"],
                "Pronounced as \"wa\" when used as a particle",
            ),
        ],
        vocabulary: vec![
            word("voc-1", "こんにちは", "konnichiwa", "Hello", "こんにちは、元気ですか？(Hello, how are you?)"),
            word("voc-2", "さようなら", "sayōnara", "Goodbye", "じゃあ、また明日。さようなら。(Well, see you tomorrow. Goodbye.)"),
            word("voc-3", "ありがとう", "arigatō", "Thank you", "どうもありがとう。(Thank you very much.)"),
        ],
        exercises: vec![Exercise {
            id: "ex-1".to_string(),
            kind: "vocabulary".to_string(),
            question: "What does こんにちは mean?".to_string(),
            options: strings(&["Good morning", "Hello", "Good night", "See you later"]),
            correct_answer: "Hello".to_string(),
            explanation: "こんにちは is a greeting used during the day".to_string(),
        }],
    }
}

fn family() -> Lesson {
    Lesson {
        id: 2,
        title: "家族 - Family Members".to_string(),
        textbook: "Minna no Nihongo".to_string(),
        chapter: "Lesson 2".to_string(),
        content: "Learn about family members and relationships in Japanese culture.".to_string(),
        grammar_points: vec![
            grammar(
                "gr-3",
                "の (no)",
                "Possessive particle connecting nouns",
                &["私の本 (My book)", "田中さんの車 (Tanaka's car)"],
                "Used to show possession or relation between nouns",
            ),
            grammar(
                "gr-4",
                "が (ga)",
                "Subject particle marking the subject of the sentence",
                &["猫がいます (There is a cat/I have a cat)", "彼が先生です (He is the teacher)"],
                "Often used with existence verbs (aru, iru) and certain adjectives",
            ),
        ],
        vocabulary: vec![
            word("voc-4", "家族", "かぞく", "Family", "家族は大切です。(Family is important.)"),
            word("voc-5", "父", "ちち", "Father", "父は医者です。(My father is a doctor.)"),
            word("voc-6", "母", "はは", "Mother", "母は料理が得意です。(My mother is good at cooking.)"),
        ],
        exercises: Vec::new(),
    }
}

fn numbers_and_time() -> Lesson {
    Lesson {
        id: 3,
        title: "数字と時間 - Numbers and Time".to_string(),
        textbook: "Minna no Nihongo".to_string(),
        chapter: "Lesson 3".to_string(),
        content: "Numbers, counting, and telling time in Japanese.".to_string(),
        grammar_points: vec![
            grammar(
                "gr-5",
                "時 (ji)",
                "Counter for hours",
                &["三時 (Three o'clock)", "午後七時 (Seven PM)"],
                "Used with numbers to indicate hours",
            ),
            grammar(
                "gr-6",
                "分 (fun/bun)",
                "Counter for minutes",
                &["十五分 (Fifteen minutes)", "三分 (Three minutes)"],
                "Has irregular pronunciations for certain numbers (1, 4, 6, 8, 10)",
            ),
        ],
        vocabulary: vec![
            word("voc-7", "一", "いち", "One", "一つのりんご。(One apple.)"),
            word("voc-8", "二", "に", "Two", "二冊の本。(Two books.)"),
            word("voc-9", "三", "さん", "Three", "三人の友達。(Three friends.)"),
        ],
        exercises: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_three_ordered_lessons() {
        let catalog = Catalog::builtin();
        let ids: Vec<_> = catalog.lessons().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(catalog.get(2).map(|l| l.title.as_str()), Some("家族 - Family Members"));
        assert_eq!(catalog.get(1).map(|l| l.exercises.len()), Some(1));
    }

    #[test]
    fn unknown_lesson_is_none() {
        let catalog = Catalog::builtin();
        assert!(catalog.get(99).is_none());
        assert!(!catalog.contains(0));
    }

    #[test]
    fn loads_from_json() {
        let json = r#"[{
            "id": 10,
            "title": "カタカナ",
            "textbook": "Genki",
            "chapter": "Lesson 0",
            "content": "Katakana basics.",
            "vocabulary": [{
                "id": "v-1", "word": "コーヒー", "reading": "kōhī",
                "meaning": "Coffee", "level": "N5"
            }],
            "exercises": [{
                "id": "e-1", "type": "reading", "question": "Read コーヒー",
                "correctAnswer": "kōhī"
            }]
        }]"#;
        let catalog = Catalog::from_json(json).unwrap();
        let lesson = catalog.get(10).unwrap();
        assert!(lesson.grammar_points.is_empty());
        assert_eq!(lesson.vocabulary[0].word, "コーヒー");
        assert_eq!(lesson.exercises[0].kind, "reading");
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = Catalog::from_json("{not json").unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}
