//! Poster handling.
//!
//! Posters travel from the poster sources to the metadata sink as
//! [`PosterArtwork`]; this module owns their formats, the optional JPEG
//! conversion and the fallback poster.

mod poster;
mod storage;

pub use poster::{Poster, PosterArtwork, PosterFormat};
pub use storage::{encode_for_storage, to_jpeg, DefaultImage};
