pub mod quiz;
pub mod results;
pub mod search;
pub mod session;
pub mod state;

// Re-export the controllers so the binary and the integration tests can
// reach them without spelling out the module paths.
pub use quiz::{QuizFlow, SubmittedQuiz};
pub use results::ResultReader;
pub use search::{SearchController, SearchOutcome, SearchSnapshot};
pub use session::SessionHolder;
pub use state::AppState;

#[cfg(test)]
pub(crate) mod testing;
