// crosscheck-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes a rendered report so that readers never observe a half-written file:
/// content goes to a sibling temp file which is then renamed over the target.
/// Missing parent directories are created.
pub fn write_report<P: AsRef<Path>>(path: P, content: &str) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    staged.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        staged.write_all(b"\n")?;
    }
    staged.persist(path).map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_write_report_creates_parents_and_terminates_line() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reports/nested/run.csv");

        write_report(&path, "CDE,Rule,Key")?;
        assert_eq!(fs::read_to_string(&path)?, "CDE,Rule,Key\n");
        Ok(())
    }

    #[test]
    fn test_write_report_replaces_previous_content() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("summary.txt");

        write_report(&path, "first run\n")?;
        write_report(&path, "second run\n")?;
        assert_eq!(fs::read_to_string(&path)?, "second run\n");
        Ok(())
    }
}
