//! Entity persistence for the seed pipeline
//!
//! One module per entity kind, each with its entity struct, insert functions
//! (including join-table rows), and the natural-key index used to rebuild
//! resolver bindings from an already populated table.

pub mod albums;
pub mod eras;
pub mod members;
pub mod music_videos;
pub mod songs;
