//! File access capability used by the analyzers.
//!
//! Analysis never touches the file system directly.  Everything goes through `FileAccess`,
//! so that an editor can substitute its own buffers for files that are open but not saved.
//! `LocalFiles` is the host implementation, `VirtualFiles` holds documents in memory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use lsp_types as lsp;
use super::Error;

pub trait FileAccess: Send + Sync {
    /// Read the whole file as a string.
    fn read_whole_file(&self, uri: &lsp::Url) -> Result<String,Error>;
    /// Is there a file or directory at this location
    fn exists(&self, uri: &lsp::Url) -> bool;
    fn is_directory(&self, uri: &lsp::Url) -> bool;
    /// Immediate children of a directory, empty if `dir` is not a directory.
    fn list_children(&self, dir: &lsp::Url) -> Vec<lsp::Url>;
    /// Read the file as an ordered sequence of lines, without terminators.
    fn read_lines(&self, uri: &lsp::Url) -> Result<Vec<String>,Error> {
        Ok(self.read_whole_file(uri)?.lines().map(|s| s.to_string()).collect())
    }
    /// Resolve a path written in a source file against a base directory.
    /// Absolute paths ignore the base.  Returns None if the result cannot form a URL,
    /// existence is not checked.
    fn resolve_relative(&self, base_dir: &lsp::Url, rel: &str) -> Option<lsp::Url> {
        join_path(base_dir,rel)
    }
}

/// Directory containing the file, as a URL that ends with a separator.
pub fn parent_dir(uri: &lsp::Url) -> Option<lsp::Url> {
    uri.join(".").ok()
}

/// Force a trailing separator so the URL is treated as a directory by `join`.
pub fn as_directory(uri: &lsp::Url) -> lsp::Url {
    let mut ans = uri.clone();
    if !ans.path().ends_with('/') {
        let path = format!("{}/",ans.path());
        ans.set_path(&path);
    }
    ans
}

/// Join a source-level path to a base directory.  Backslashes are accepted as separators.
pub fn join_path(base_dir: &lsp::Url, rel: &str) -> Option<lsp::Url> {
    let rel = rel.trim().replace('\\',"/");
    if rel.len() == 0 {
        return Some(as_directory(base_dir));
    }
    if Path::new(&rel).is_absolute() {
        return lsp::Url::from_file_path(&rel).ok();
    }
    as_directory(base_dir).join(&rel).ok()
}

/// Is `uri` located somewhere below the directory `dir`
pub fn is_within(uri: &lsp::Url, dir: &lsp::Url) -> bool {
    let dir = as_directory(dir);
    uri.scheme() == dir.scheme() && uri.as_str().starts_with(dir.as_str())
}

/// Access to the host file system.  Only `file:` URLs are supported.
pub struct LocalFiles;

impl LocalFiles {
    pub fn new() -> Self {
        Self
    }
}

impl FileAccess for LocalFiles {
    fn read_whole_file(&self, uri: &lsp::Url) -> Result<String,Error> {
        let path = super::pathbuf_from_uri(uri)?;
        match std::fs::read_to_string(&path) {
            Ok(txt) => Ok(txt),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound(uri.to_string())),
            Err(e) => Err(Error::Io(e))
        }
    }
    fn exists(&self, uri: &lsp::Url) -> bool {
        match uri.to_file_path() {
            Ok(p) => p.exists(),
            Err(_) => false
        }
    }
    fn is_directory(&self, uri: &lsp::Url) -> bool {
        match uri.to_file_path() {
            Ok(p) => p.is_dir(),
            Err(_) => false
        }
    }
    fn list_children(&self, dir: &lsp::Url) -> Vec<lsp::Url> {
        let mut ans = Vec::new();
        let path = match dir.to_file_path() {
            Ok(p) => p,
            Err(_) => return ans
        };
        if let Ok(entries) = std::fs::read_dir(&path) {
            for entry in entries.flatten() {
                if let Ok(uri) = lsp::Url::from_file_path(entry.path()) {
                    ans.push(uri);
                }
            }
        }
        ans.sort();
        ans
    }
}

/// Documents held in memory, keyed by URL.  Directories exist implicitly
/// whenever some document lies below them.
pub struct VirtualFiles {
    docs: RwLock<HashMap<String,String>>
}

impl VirtualFiles {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new())
        }
    }
    /// Add or replace a document
    pub fn insert(&self, uri: &lsp::Url, text: &str) {
        if let Ok(mut docs) = self.docs.write() {
            docs.insert(uri.to_string(),text.to_string());
        }
    }
    pub fn remove(&self, uri: &lsp::Url) {
        if let Ok(mut docs) = self.docs.write() {
            docs.remove(uri.as_str());
        }
    }
}

impl FileAccess for VirtualFiles {
    fn read_whole_file(&self, uri: &lsp::Url) -> Result<String,Error> {
        match self.docs.read() {
            Ok(docs) => match docs.get(uri.as_str()) {
                Some(txt) => Ok(txt.clone()),
                None => Err(Error::NotFound(uri.to_string()))
            },
            Err(_) => Err(Error::NotFound(uri.to_string()))
        }
    }
    fn exists(&self, uri: &lsp::Url) -> bool {
        let is_doc = match self.docs.read() {
            Ok(docs) => docs.contains_key(uri.as_str()),
            Err(_) => false
        };
        is_doc || self.is_directory(uri)
    }
    fn is_directory(&self, uri: &lsp::Url) -> bool {
        let prefix = as_directory(uri).to_string();
        match self.docs.read() {
            Ok(docs) => docs.keys().any(|k| k.starts_with(&prefix)),
            Err(_) => false
        }
    }
    fn list_children(&self, dir: &lsp::Url) -> Vec<lsp::Url> {
        let prefix = as_directory(dir).to_string();
        let mut names = Vec::new();
        if let Ok(docs) = self.docs.read() {
            for key in docs.keys() {
                if let Some(rest) = key.strip_prefix(&prefix) {
                    let child = match rest.find('/') {
                        Some(i) => &rest[0..i],
                        None => rest
                    };
                    if child.len() > 0 && !names.contains(&child.to_string()) {
                        names.push(child.to_string());
                    }
                }
            }
        }
        names.sort();
        names.iter().filter_map(|n| lsp::Url::parse(&format!("{}{}",prefix,n)).ok()).collect()
    }
}
