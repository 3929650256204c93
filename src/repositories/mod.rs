pub mod comments;
pub mod users;
