//! crates/nihongo_core/src/store.rs
//!
//! The session store: current learner, authentication state and the practice
//! transcript, plus read access to the lesson catalog.
//!
//! Every mutation takes the write lock once, so the user and the auth state
//! change together and readers never see one without the other. No lock is
//! held across an `.await`; concurrent logins resolve last-write-wins.

use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::domain::{
    AuthState, Lesson, LessonId, Message, MessageId, Registration, Sender, User, UserStats,
    UserUpdate,
};
use crate::ports::{Delay, PortError, PortResult, TutorResponseService};

/// Logging in with this identifier always fails.
pub const FAILING_IDENTIFIER: &str = "fail@test.com";
/// Logging in with this password always fails.
pub const FAILING_PASSWORD: &str = "wrong";
/// Registering this email always fails as a duplicate.
pub const DUPLICATE_EMAIL: &str = "duplicate@test.com";

const WELCOME_MESSAGE: &str = "Kon'nichiwa! こんにちは！ Welcome to your AI practice session. Ask me anything about Japanese grammar, vocabulary, or conversation. What would you like to practice today?";

/// Simulated round-trip time of the mock auth endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLatency {
    pub login: Duration,
    pub register: Duration,
}

impl Default for StoreLatency {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(500),
            register: Duration::from_millis(1000),
        }
    }
}

struct SessionState {
    user: Option<User>,
    auth: AuthState,
    conversation: Vec<Message>,
    last_message_id: MessageId,
}

impl SessionState {
    fn next_message_id(&mut self) -> MessageId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = now.max(self.last_message_id + 1);
        self.last_message_id = id;
        id
    }

    fn push(&mut self, sender: Sender, text: String) -> Message {
        let message = Message {
            id: self.next_message_id(),
            sender,
            text,
            created_at: Utc::now(),
        };
        self.conversation.push(message.clone());
        message
    }
}

pub struct SessionStore {
    state: RwLock<SessionState>,
    catalog: Arc<Catalog>,
    tutor: Arc<dyn TutorResponseService>,
    delay: Arc<dyn Delay>,
    latency: StoreLatency,
}

impl SessionStore {
    /// Creates a logged-out store whose transcript holds only the welcome message.
    pub fn new(
        catalog: Arc<Catalog>,
        tutor: Arc<dyn TutorResponseService>,
        delay: Arc<dyn Delay>,
    ) -> Self {
        let mut state = SessionState {
            user: None,
            auth: AuthState::Anonymous,
            conversation: Vec::new(),
            last_message_id: 0,
        };
        state.push(Sender::Assistant, WELCOME_MESSAGE.to_string());

        Self {
            state: RwLock::new(state),
            catalog,
            tutor,
            delay,
            latency: StoreLatency::default(),
        }
    }

    pub fn with_latency(mut self, latency: StoreLatency) -> Self {
        self.latency = latency;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the user and the auth state in one critical section.
    fn install(&self, user: User, token: String) {
        let mut state = self.write();
        state.user = Some(user);
        state.auth = AuthState::Authenticated { token };
    }

    //=====================================================================================
    // Commands
    //=====================================================================================

    pub async fn login(&self, identifier: &str, password: &str) -> PortResult<User> {
        self.delay.wait(self.latency.login).await;

        if identifier == FAILING_IDENTIFIER || password == FAILING_PASSWORD {
            warn!("Rejected login for '{}'", identifier);
            return Err(PortError::InvalidCredentials);
        }

        let token = generate_token("mock_login_token");
        let (name, email) = match identifier.split_once('@') {
            Some((local, _)) => (local.to_string(), identifier.to_string()),
            None => (identifier.to_string(), format!("{}@example.com", identifier)),
        };

        let user = User {
            email: Some(email),
            native_language: Some("English".to_string()),
            learning_goal: Some("General Conversation".to_string()),
            ..User::new_learner(name, token.clone())
        };

        self.install(user.clone(), token);
        info!("User {} logged in as '{}'", user.id, user.name);
        Ok(user)
    }

    pub async fn register(&self, registration: Registration) -> PortResult<User> {
        self.delay.wait(self.latency.register).await;

        if registration.email.as_deref() == Some(DUPLICATE_EMAIL) {
            warn!("Rejected registration for duplicate email '{}'", DUPLICATE_EMAIL);
            return Err(PortError::DuplicateAccount);
        }

        let token = generate_token("mock_register_token");
        let name = registration.display_name();
        let user = User {
            email: registration.email,
            phone: registration.phone,
            native_language: registration.native_language,
            learning_goal: registration.learning_goal,
            ..User::new_learner(name, token.clone())
        };

        self.install(user.clone(), token);
        info!("Registered user {} ('{}')", user.id, user.name);
        Ok(user)
    }

    /// Installs a session authenticated elsewhere, e.g. a federated login callback.
    pub fn login_success(&self, mut user: User) -> User {
        if user.id.is_nil() {
            user.id = Uuid::new_v4();
        }
        let token = match user.auth_token.as_deref() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => generate_token("mock_token"),
        };
        user.auth_token = Some(token.clone());

        self.install(user.clone(), token);
        info!("External login accepted for user {}", user.id);
        user
    }

    /// Clears the session. Calling it while logged out changes nothing.
    pub fn logout(&self) {
        let mut state = self.write();
        if let Some(user) = state.user.take() {
            info!("User {} logged out", user.id);
        }
        state.auth = AuthState::Anonymous;
    }

    /// Appends a message as-is.
    pub fn add_message(&self, message: Message) {
        let mut state = self.write();
        state.last_message_id = state.last_message_id.max(message.id);
        state.conversation.push(message);
    }

    /// Records the learner's message. Does not ask the tutor for a reply.
    pub fn send_message(&self, text: &str, user_id: Option<Uuid>) -> Message {
        self.write()
            .push(Sender::User { user_id }, text.to_string())
    }

    pub async fn get_ai_response(
        &self,
        user_input: &str,
        context: &str,
        conversation_history: &[Message],
    ) -> String {
        self.tutor
            .generate_response(user_input, context, conversation_history)
            .await
    }

    /// One practice turn: records the learner's message, asks the tutor with
    /// the transcript that preceded it, and records the reply.
    pub async fn practice(
        &self,
        text: &str,
        user_id: Option<Uuid>,
        context: &str,
    ) -> (Message, Message) {
        let history = self.conversation();
        let question = self.send_message(text, user_id);
        let reply = self.get_ai_response(text, context, &history).await;
        let answer = self.write().push(Sender::Assistant, reply);
        (question, answer)
    }

    /// Counts a lesson as completed. Repeated completions are counted again.
    pub fn complete_lesson(&self, lesson_id: LessonId) {
        let mut state = self.write();
        let Some(user) = state.user.as_mut() else {
            debug!("Ignoring completion of lesson {}: no user", lesson_id);
            return;
        };
        if !self.catalog.contains(lesson_id) {
            debug!("Ignoring completion of unknown lesson {}", lesson_id);
            return;
        }
        match user.completed_lessons.checked_add(1) {
            Some(count) => user.completed_lessons = count,
            None => warn!("Completed-lesson counter for user {} is saturated", user.id),
        }
    }

    /// Shallow-merges `update` into the current user, creating a bare user if none exists.
    pub fn update_user(&self, update: UserUpdate) {
        let mut state = self.write();
        let user = state.user.get_or_insert_with(User::default);
        update.apply_to(user);
    }

    //=====================================================================================
    // Queries
    //=====================================================================================

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().auth.is_authenticated()
    }

    /// True only when the flag is set and a user is present.
    pub fn has_session(&self) -> bool {
        let state = self.read();
        state.auth.is_authenticated() && state.user.is_some()
    }

    pub fn auth_token(&self) -> Option<String> {
        self.read().auth.token().map(str::to_string)
    }

    /// Whether `token` is the token of the active session.
    pub fn verify_token(&self, token: &str) -> bool {
        self.read().auth.token() == Some(token)
    }

    /// The id of the current user if `token` belongs to the active session.
    /// Token and user are read under the same lock.
    pub fn session_user_id(&self, token: &str) -> Option<Uuid> {
        let state = self.read();
        if state.auth.token() != Some(token) {
            return None;
        }
        state.user.as_ref().map(|user| user.id)
    }

    pub fn lessons(&self) -> &[Lesson] {
        self.catalog.lessons()
    }

    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.catalog.get(id)
    }

    pub fn conversation(&self) -> Vec<Message> {
        self.read().conversation.clone()
    }

    pub fn user_stats(&self) -> UserStats {
        UserStats::for_user(self.read().user.as_ref())
    }

    pub fn is_tutor_configured(&self) -> bool {
        self.tutor.is_configured()
    }
}

fn generate_token(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
