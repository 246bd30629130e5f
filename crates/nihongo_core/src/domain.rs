//! crates/nihongo_core/src/domain.rs
//!
//! Defines the pure, core data structures for the tutor: learners, their
//! authentication state, lesson content and the practice transcript.
//! Serde derives exist so the outer service can expose these records as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lesson identifiers are small integers assigned by the catalog.
pub type LessonId = u32;

/// Message identifiers are epoch milliseconds, strictly increasing per store.
pub type MessageId = u64;

/// Every new learner starts with this many lessons on their plan.
pub const TOTAL_LESSONS: u32 = 20;

/// The proficiency label given to every new learner.
pub const BEGINNER_LEVEL: &str = "Beginner (N5-N4)";

//=========================================================================================
// Users and Authentication
//=========================================================================================

/// The learner currently using the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub native_language: Option<String>,
    pub learning_goal: Option<String>,
    pub level: String,
    pub completed_lessons: u32,
    pub total_lessons: u32,
    /// Cumulative study time in minutes.
    pub total_study_time: u32,
    pub current_streak: u32,
    pub achievements: Vec<String>,
    pub auth_token: Option<String>,
}

impl User {
    /// A fresh learner with default progress: nothing completed, beginner level.
    pub fn new_learner(name: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            level: BEGINNER_LEVEL.to_string(),
            total_lessons: TOTAL_LESSONS,
            auth_token: Some(auth_token.into()),
            ..Self::default()
        }
    }
}

/// A partial set of user fields, shallow-merged into the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserUpdate {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub native_language: Option<String>,
    pub learning_goal: Option<String>,
    pub level: Option<String>,
    pub completed_lessons: Option<u32>,
    pub total_lessons: Option<u32>,
    pub total_study_time: Option<u32>,
    pub current_streak: Option<u32>,
    pub achievements: Option<Vec<String>>,
    pub auth_token: Option<String>,
}

impl UserUpdate {
    /// Overwrites every field of `user` that this update carries.
    pub fn apply_to(self, user: &mut User) {
        if let Some(id) = self.id {
            user.id = id;
        }
        if let Some(name) = self.name {
            user.name = name;
        }
        if self.email.is_some() {
            user.email = self.email;
        }
        if self.phone.is_some() {
            user.phone = self.phone;
        }
        if self.native_language.is_some() {
            user.native_language = self.native_language;
        }
        if self.learning_goal.is_some() {
            user.learning_goal = self.learning_goal;
        }
        if let Some(level) = self.level {
            user.level = level;
        }
        if let Some(completed) = self.completed_lessons {
            user.completed_lessons = completed;
        }
        if let Some(total) = self.total_lessons {
            user.total_lessons = total;
        }
        if let Some(minutes) = self.total_study_time {
            user.total_study_time = minutes;
        }
        if let Some(streak) = self.current_streak {
            user.current_streak = streak;
        }
        if let Some(achievements) = self.achievements {
            user.achievements = achievements;
        }
        if self.auth_token.is_some() {
            user.auth_token = self.auth_token;
        }
    }
}

/// Data submitted by the sign-up form. Either `email` or `phone` identifies the learner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Registration {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub name: Option<String>,
    pub native_language: Option<String>,
    pub learning_goal: Option<String>,
}

impl Registration {
    /// The explicit name, else the local part of the email, else the phone number.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let email = self.email.as_deref().filter(|e| !e.is_empty());
        match (email, &self.phone) {
            (Some(email), _) => email.split('@').next().unwrap_or_default().to_string(),
            (None, Some(phone)) => phone.clone(),
            (None, None) => String::new(),
        }
    }
}

/// The authentication half of a session. Kept in lock-step with the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated { token: String },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token } => Some(token),
            Self::Anonymous => None,
        }
    }
}

/// Progress figures shown on the learner dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub completed_lessons: u32,
    pub total_lessons: u32,
    pub total_study_time: u32,
    pub current_streak: u32,
    pub progress_percentage: u32,
}

impl UserStats {
    /// Derives the dashboard figures; all zero (against the default plan) without a user.
    pub fn for_user(user: Option<&User>) -> Self {
        let Some(user) = user else {
            return Self {
                completed_lessons: 0,
                total_lessons: TOTAL_LESSONS,
                total_study_time: 0,
                current_streak: 0,
                progress_percentage: 0,
            };
        };

        let progress_percentage = if user.total_lessons == 0 {
            0
        } else {
            (100.0 * f64::from(user.completed_lessons) / f64::from(user.total_lessons)).round()
                as u32
        };

        Self {
            completed_lessons: user.completed_lessons,
            total_lessons: user.total_lessons,
            total_study_time: user.total_study_time,
            current_streak: user.current_streak,
            progress_percentage,
        }
    }
}

//=========================================================================================
// Lesson Content
//=========================================================================================

/// A single textbook lesson. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub textbook: String,
    pub chapter: String,
    pub content: String,
    #[serde(default)]
    pub grammar_points: Vec<GrammarPoint>,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyEntry>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarPoint {
    pub id: String,
    pub pattern: String,
    pub explanation: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub usage_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub id: String,
    /// The word in Japanese script.
    pub word: String,
    pub reading: String,
    pub meaning: String,
    /// JLPT level tag, e.g. `N5`.
    pub level: String,
    #[serde(default)]
    pub example_sentences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

//=========================================================================================
// Practice Conversation
//=========================================================================================

/// Who wrote a message in the practice transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sender", rename_all = "snake_case")]
pub enum Sender {
    User {
        #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
        user_id: Option<Uuid>,
    },
    Assistant,
}

/// One entry in the practice transcript. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    #[serde(flatten)]
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_from_assistant(&self) -> bool {
        matches!(self.sender, Sender::Assistant)
    }
}
