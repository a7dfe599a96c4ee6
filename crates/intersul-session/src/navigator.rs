//! Navigation seam.
//!
//! Library code never decides how a page change happens; it asks a
//! [`Navigator`]. A terminal front end prints a hint, a test records the path.

use parking_lot::Mutex;

/// Performs navigation to an application path such as `/login`.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that remembers every request.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths navigated to, oldest first.
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.paths.lock().iter().filter(|p| *p == path).count()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_paths() {
        let nav = RecordingNavigator::new();
        nav.navigate("/login");
        nav.navigate("/clients");
        nav.navigate("/login");

        assert_eq!(nav.paths(), vec!["/login", "/clients", "/login"]);
        assert_eq!(nav.count("/login"), 2);
    }
}
