//! Path utilities for segment output files

use std::path::{Component, Path, PathBuf};

/// Path helpers for writing segments
pub struct PathUtils;

impl PathUtils {
    /// Reduce an untrusted name to a bare file name.
    ///
    /// Falls back to `part{n}.mp4` when nothing usable remains.
    pub fn safe_file_name(name: &str, part_number: u32) -> String {
        let normalized = name.replace('\\', "/");
        let candidate = Path::new(&normalized)
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .last()
            .unwrap_or_default();

        let cleaned: String = candidate
            .chars()
            .filter(|c| !c.is_control() && !matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*'))
            .collect();
        let cleaned = cleaned.trim().trim_matches('.').to_string();

        if cleaned.is_empty() {
            format!("part{}.mp4", part_number)
        } else {
            cleaned
        }
    }

    /// Tag a file name with its part index, before the extension
    pub fn indexed_file_name(name: &str, index: usize) -> String {
        match name.rfind('.') {
            Some(pos) if pos > 0 => format!("{}_part{}{}", &name[..pos], index, &name[pos..]),
            _ => format!("{}_part{}", name, index),
        }
    }

    /// Destination path for a segment inside `dir`
    pub fn output_path(dir: &Path, segment_name: &str, index: usize) -> PathBuf {
        dir.join(Self::safe_file_name(segment_name, index as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_name_strips_directories() {
        assert_eq!(PathUtils::safe_file_name("clip_part1.mp4", 1), "clip_part1.mp4");
        assert_eq!(PathUtils::safe_file_name("../../etc/passwd", 1), "passwd");
        assert_eq!(PathUtils::safe_file_name("C:\\temp\\a.mp4", 1), "a.mp4");
        assert_eq!(PathUtils::safe_file_name("/abs/b.mp4", 2), "b.mp4");
    }

    #[test]
    fn test_safe_file_name_fallback() {
        assert_eq!(PathUtils::safe_file_name("", 3), "part3.mp4");
        assert_eq!(PathUtils::safe_file_name("..", 4), "part4.mp4");
        assert_eq!(PathUtils::safe_file_name("???", 5), "part5.mp4");
    }

    #[test]
    fn test_indexed_file_name() {
        assert_eq!(PathUtils::indexed_file_name("clip.mp4", 2), "clip_part2.mp4");
        assert_eq!(PathUtils::indexed_file_name("clip", 3), "clip_part3");
        assert_eq!(PathUtils::indexed_file_name(".hidden", 1), ".hidden_part1");
    }

    #[test]
    fn test_output_path() {
        let path = PathUtils::output_path(Path::new("/out"), "x_part2.mp4", 2);
        assert_eq!(path, PathBuf::from("/out/x_part2.mp4"));
    }
}
