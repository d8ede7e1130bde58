//! Discovery of analysable audio files beneath a root folder.

mod audio_support;
mod discovery;

pub use audio_support::{SUPPORTED_AUDIO_EXTENSIONS, is_supported_audio};
pub use discovery::{ScanError, discover_audio_files};
