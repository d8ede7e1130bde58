use std::path::Path;

/// Supported audio extensions (lowercase, without dots).
pub const SUPPORTED_AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "ogg", "m4a", "flac"];

/// Return true if the path has a supported audio extension, ignoring case.
pub fn is_supported_audio(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    SUPPORTED_AUDIO_EXTENSIONS
        .iter()
        .any(|supported| ext.eq_ignore_ascii_case(supported))
}
