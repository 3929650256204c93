pub mod filter_state;
pub mod list_cache;
pub mod maintenance;
pub mod translations;
