pub mod chat;
pub mod course;
pub mod enrollment;
pub mod flashcard;
pub mod goal;
pub mod insight;
pub mod message;
pub mod note;
pub mod quiz;
pub mod session;
pub mod task;
pub mod user;

pub use chat::{ChatEntry, ChatRole, NewChatEntryRequest, AssistantChatRequest};
pub use course::{Course, CourseStatus, NewCourseRequest, SyllabusWeek, UpdateCourseRequest};
pub use enrollment::{Enrollment, EnrollmentStatus, NewEnrollmentRequest, UpdateEnrollmentRequest};
pub use flashcard::{Flashcard, NewFlashcardRequest, ReviewFlashcardRequest, UpdateFlashcardRequest};
pub use goal::{GoalStatus, NewStudyGoalRequest, StudyGoal, UpdateStudyGoalRequest};
pub use insight::{
    CourseProgress, DayTotal, Priority, ProgressReport, Recommendation, RecommendationKind,
    StudyStats, StudyStreak,
};
pub use message::{
    ConversationSummary, MarkReadRequest, Message, NewMessageRequest, UpdateMessageRequest,
};
pub use note::{NewNoteRequest, Note, UpdateNoteRequest};
pub use quiz::{
    AttemptAnswer, NewQuizRequest, Question, Quiz, QuizAttempt, SubmitAttemptRequest,
    SubmittedAnswer, UpdateQuizRequest,
};
pub use session::{NewStudySessionRequest, SessionStatus, StudySession, UpdateStudySessionRequest};
pub use task::{NewTaskRequest, Task, TaskPriority, TaskStatus, UpdateTaskRequest};
pub use user::{
    Achievement, LoginRequest, NotificationSettings, PreferredStudyTime, RegisterRequest,
    StudyPreferences, UpdateProfileRequest, UpdateUserRequest, User, UserProfile, UserRole,
};
