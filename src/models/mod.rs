pub mod comments;
pub mod filters;
pub mod users;
