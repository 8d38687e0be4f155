use std::collections::HashMap;

use fractoscope_core::EngineError;

/// In-memory file store the engine writes its output into.
#[derive(Debug, Clone, Default)]
pub struct VirtualFs {
    files: HashMap<String, Vec<u8>>,
}

impl VirtualFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite `name`.
    pub fn write(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    pub fn read(&self, name: &str) -> crate::Result<&[u8]> {
        self.files
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::FileNotFound(name.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// File names in sorted order.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.files.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let mut fs = VirtualFs::new();
        fs.write("image.bmp", vec![1, 2, 3]);
        assert_eq!(fs.read("image.bmp").unwrap(), &[1, 2, 3]);
        assert!(fs.contains("image.bmp"));
    }

    #[test]
    fn overwrite_replaces_contents() {
        let mut fs = VirtualFs::new();
        fs.write("a", vec![1]);
        fs.write("a", vec![2, 2]);
        assert_eq!(fs.read("a").unwrap(), &[2, 2]);
        assert_eq!(fs.list(), vec!["a"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let fs = VirtualFs::new();
        assert!(matches!(fs.read("nope"), Err(EngineError::FileNotFound(n)) if n == "nope"));
    }

    #[test]
    fn remove_and_list() {
        let mut fs = VirtualFs::new();
        fs.write("b", vec![]);
        fs.write("a", vec![]);
        assert_eq!(fs.list(), vec!["a", "b"]);
        assert_eq!(fs.remove("a"), Some(vec![]));
        assert_eq!(fs.list(), vec!["b"]);
    }
}
