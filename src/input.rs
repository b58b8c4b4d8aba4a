use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::domain::models::TitleEntry;

/// Reads the title list, trimming whitespace and dropping blank lines.
/// Positions number the surviving titles 1.., which is also the numbering the
/// checkpoint file uses.
pub fn load_titles(path: &Path) -> Result<Vec<TitleEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read title list {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, title)| TitleEntry {
            position: i as u64 + 1,
            title: title.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_list(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("titles.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_blank_lines_are_skipped_and_positions_stay_contiguous() {
        let dir = TempDir::new().unwrap();
        let path = write_list(&dir, "Breaking Bad\n\n  \nThe Office\n  The Wire  \n");

        let entries = load_titles(&path).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].position, 1);
        assert_eq!(entries[0].title, "Breaking Bad");
        assert_eq!(entries[1].position, 2);
        assert_eq!(entries[1].title, "The Office");
        assert_eq!(entries[2].position, 3);
        assert_eq!(entries[2].title, "The Wire");
    }

    #[test]
    fn test_empty_file_yields_no_entries() {
        let dir = TempDir::new().unwrap();
        let path = write_list(&dir, "\n\n");
        assert!(load_titles(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_titles(&dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("cannot read title list"));
    }
}
