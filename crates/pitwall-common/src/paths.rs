//! Path utilities and the on-disk layout of a season directory.
//!
//! ```text
//! <base>/<season-dir>/<video>                     recording
//! <base>/<season-dir>/<video-stem>.<ext>          round metadata
//! <base>/<season-dir>/metadata/<video-stem>.<img> round poster
//! <base>/<season-dir>/folder.<img>                season poster
//! <base>/<season-dir>/season.<ext>                season metadata
//! ```

use std::path::{Path, PathBuf};

/// Subdirectory holding round posters.
pub const ARTWORK_DIR: &str = "metadata";

/// Stem of the season metadata file.
pub const SEASON_METADATA_STEM: &str = "season";

/// Stem of the season poster.
pub const SEASON_POSTER_STEM: &str = "folder";

/// List of supported image file extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Check if a path has an image file extension.
pub fn is_image_file(path: &Path) -> bool {
    has_extension_in(path, IMAGE_EXTENSIONS)
}

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Filename without its final extension, `"a.b.mkv"` → `"a.b"`.
pub fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Strip a leading dot so `".nfo"` and `"nfo"` mean the same extension.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// Where metadata for one season directory lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonLayout {
    dir: PathBuf,
    metadata_ext: String,
}

impl SeasonLayout {
    pub fn new(dir: impl Into<PathBuf>, metadata_ext: &str) -> Self {
        Self {
            dir: dir.into(),
            metadata_ext: normalize_extension(metadata_ext),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Last path component of the season directory, e.g. `"2024"`.
    pub fn dir_name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn metadata_ext(&self) -> &str {
        &self.metadata_ext
    }

    /// Whether `file_name` is a metadata file by extension.
    pub fn is_metadata_file(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.metadata_ext))
            .unwrap_or(false)
    }

    /// Whether `file_name` can be a recording: anything that is neither
    /// metadata, artwork nor a hidden file.
    ///
    /// # Examples
    ///
    /// ```
    /// use pitwall_common::SeasonLayout;
    ///
    /// let layout = SeasonLayout::new("/f1/2024", "nfo");
    /// assert!(layout.is_candidate("Formula 1 - s2024e05 - Sprint.m2ts"));
    /// assert!(!layout.is_candidate("season.nfo"));
    /// assert!(!layout.is_candidate("folder.jpg"));
    /// assert!(!layout.is_candidate(".DS_Store"));
    /// ```
    pub fn is_candidate(&self, file_name: &str) -> bool {
        !file_name.starts_with('.')
            && !self.is_metadata_file(file_name)
            && !is_image_file(Path::new(file_name))
    }

    /// Whether `file_name` is the season poster, `folder.<img>` in any case.
    pub fn is_season_poster(&self, file_name: &str) -> bool {
        is_image_file(Path::new(file_name))
            && file_stem(file_name).eq_ignore_ascii_case(SEASON_POSTER_STEM)
    }

    /// `<stem>.<ext>`: the marker that a recording has been processed.
    pub fn metadata_file_name(&self, video_stem: &str) -> String {
        format!("{}.{}", video_stem, self.metadata_ext)
    }

    pub fn round_metadata_path(&self, video_stem: &str) -> PathBuf {
        self.dir.join(self.metadata_file_name(video_stem))
    }

    pub fn artwork_dir(&self) -> PathBuf {
        self.dir.join(ARTWORK_DIR)
    }

    pub fn round_poster_path(&self, video_stem: &str, image_ext: &str) -> PathBuf {
        self.artwork_dir()
            .join(format!("{}.{}", video_stem, normalize_extension(image_ext)))
    }

    pub fn season_metadata_name(&self) -> String {
        self.metadata_file_name(SEASON_METADATA_STEM)
    }

    pub fn season_metadata_path(&self) -> PathBuf {
        self.dir.join(self.season_metadata_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates() {
        let layout = SeasonLayout::new("/f1/2024", "nfo");
        assert!(layout.is_candidate("race.mkv"));
        assert!(layout.is_candidate("race.MPG"));
        assert!(layout.is_candidate("no_extension"));
        assert!(!layout.is_candidate("race.NFO"));
        assert!(!layout.is_candidate("Folder.PNG"));
        assert!(!layout.is_candidate(".hidden.mkv"));
    }

    #[test]
    fn test_is_season_poster() {
        let layout = SeasonLayout::new("/f1/2024", "nfo");
        assert!(layout.is_season_poster("folder.jpg"));
        assert!(layout.is_season_poster("Folder.WEBP"));
        assert!(!layout.is_season_poster("folder.nfo"));
        assert!(!layout.is_season_poster("poster.jpg"));
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("folder.jpg")));
        assert!(is_image_file(Path::new("poster.WEBP")));
        assert!(!is_image_file(Path::new("race.mkv")));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(
            file_stem("Formula 1 - s2024e05 - Sprint.abc.mkv"),
            "Formula 1 - s2024e05 - Sprint.abc"
        );
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_layout_paths() {
        let layout = SeasonLayout::new("/f1/2024", ".nfo");
        assert_eq!(layout.metadata_ext(), "nfo");
        assert_eq!(layout.dir_name(), "2024");
        assert_eq!(
            layout.round_metadata_path("race"),
            PathBuf::from("/f1/2024/race.nfo")
        );
        assert_eq!(
            layout.round_poster_path("race", "webp"),
            PathBuf::from("/f1/2024/metadata/race.webp")
        );
        assert_eq!(
            layout.season_metadata_path(),
            PathBuf::from("/f1/2024/season.nfo")
        );
    }

    #[test]
    fn test_is_metadata_file() {
        let layout = SeasonLayout::new("/f1/2024", "nfo");
        assert!(layout.is_metadata_file("race.nfo"));
        assert!(layout.is_metadata_file("season.NFO"));
        assert!(!layout.is_metadata_file("race.mkv"));
        assert!(!layout.is_metadata_file("nfo"));
    }
}
