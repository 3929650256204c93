pub mod comments;
#[cfg(test)]
pub mod memory;
pub mod render;
pub mod select;
