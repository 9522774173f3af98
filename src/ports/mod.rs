pub mod library;
pub mod playlists;
pub mod process;
pub mod users;
