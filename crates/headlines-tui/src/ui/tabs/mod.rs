pub mod articles;
pub mod bookmarks;
pub mod breaking;
pub mod search;
