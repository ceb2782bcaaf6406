//! [`TestProfileDir`] builder for browser profile test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory standing in for a browser profile.
///
/// # Example
///
/// ```rust,no_run
/// use hardfox_test_utils::TestProfileDir;
///
/// let profile = TestProfileDir::new()
///     .with_marker()
///     .with_file("prefs.js", "user_pref(\"keep.me\", 1);\n");
/// profile.assert_file_contains("prefs.js", "keep.me");
/// ```
pub struct TestProfileDir {
    temp_dir: TempDir,
}

impl Default for TestProfileDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProfileDir {
    /// An empty directory with no profile markers.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("TestProfileDir::new: failed to create temp dir"),
        }
    }

    /// Add `times.json` so the directory is recognised as a browser profile.
    pub fn with_marker(self) -> Self {
        self.with_file("times.json", "{\"created\": 0}\n")
    }

    /// Write `content` to `name` under the root.
    pub fn with_file(self, name: &str, content: &str) -> Self {
        self.write(name, content);
        self
    }

    pub fn write(&self, name: &str, content: &str) {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Read `name` as UTF-8.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, name: &str) -> String {
        let path = self.path(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    pub fn read_bytes(&self, name: &str) -> Vec<u8> {
        let path = self.path(name);
        fs::read(&path).unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// File names in the root that start with `<name>.backup_`, sorted.
    pub fn backups_of(&self, name: &str) -> Vec<String> {
        let prefix = format!("{name}.backup_");
        let mut found: Vec<String> = fs::read_dir(self.root())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(&prefix))
            .collect();
        found.sort();
        found
    }

    /// Every file name in the root, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.root())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, name: &str) {
        let path = self.path(name);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, name: &str) {
        let path = self.path(name);
        assert!(
            !path.exists(),
            "Expected file NOT to exist: {}",
            path.display()
        );
    }

    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, name: &str, content: &str) {
        let actual = self.read(name);
        assert!(
            actual.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            name,
            content,
            actual
        );
    }
}
