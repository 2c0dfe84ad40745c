pub mod todo;
pub mod user;

pub use todo::{
    CompletedFilter, MAX_TITLE_LEN, TitleError, TodoChanges, TodoDraft, TodoItem, validate_title,
};
pub use user::User;
