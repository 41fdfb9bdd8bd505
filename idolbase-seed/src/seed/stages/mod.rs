//! The five seed stages, in dependency order

pub mod albums;
pub mod eras;
pub mod members;
pub mod music_videos;
pub mod songs;

pub use albums::AlbumsStage;
pub use eras::ErasStage;
pub use members::MembersStage;
pub use music_videos::MusicVideosStage;
pub use songs::SongsStage;
