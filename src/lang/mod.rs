//! # Language Module
//!
//! Language-neutral pieces shared by the analyzers: the error taxonomy, documents,
//! and range arithmetic.  File system access is in `files`.
//! Dialect specific operations such as line parsing are in the submodules.

pub mod files;
pub mod m68k;

use lsp_types as lsp;
use thiserror::Error;

#[derive(Error,Debug)]
pub enum Error {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not convert between URL and path")]
    BadUrl,
    #[error("value out of range")]
    OutOfRange,
    #[error("syntax error")]
    Syntax
}

/// A document identified by its URL, with optional editor version.
#[derive(Clone)]
pub struct Document {
    pub uri: lsp::Url,
    pub version: Option<i32>,
    pub text: String
}

impl Document {
    pub fn new(uri: lsp::Url, text: String) -> Self {
        Self {
            uri,
            version: None,
            text
        }
    }
    /// Create a document from a path on the host file system.
    pub fn from_file_path(path: &std::path::Path) -> Result<Self,Error> {
        let text = std::fs::read_to_string(path)?;
        match lsp::Url::from_file_path(path) {
            Ok(uri) => Ok(Self::new(uri,text)),
            Err(_) => Err(Error::BadUrl)
        }
    }
}

/// Create a single-line range from byte columns.
pub fn lsp_range(row: u32, start: usize, end: usize) -> lsp::Range {
    lsp::Range::new(
        lsp::Position::new(row,start as u32),
        lsp::Position::new(row,end as u32)
    )
}

/// Is `pos` inside `rng`, end inclusive so that a cursor just past a word still counts.
pub fn range_contains_pos(rng: &lsp::Range, pos: &lsp::Position) -> bool {
    if pos.line < rng.start.line || pos.line > rng.end.line {
        return false;
    }
    if pos.line == rng.start.line && pos.character < rng.start.character {
        return false;
    }
    if pos.line == rng.end.line && pos.character > rng.end.character {
        return false;
    }
    true
}

/// Does `outer` cover all of `inner`
pub fn range_contains_range(outer: &lsp::Range, inner: &lsp::Range) -> bool {
    range_contains_pos(outer,&inner.start) && range_contains_pos(outer,&inner.end)
}

/// Smallest range covering both arguments.
pub fn range_union(a: &lsp::Range, b: &lsp::Range) -> lsp::Range {
    let start = match (a.start.line,a.start.character) <= (b.start.line,b.start.character) {
        true => a.start,
        false => b.start
    };
    let end = match (a.end.line,a.end.character) >= (b.end.line,b.end.character) {
        true => a.end,
        false => b.end
    };
    lsp::Range::new(start,end)
}

/// Try to update a bool from a serde `Value` presumed to be an object.
/// If there is any error do not change the value.
pub fn update_json_bool(maybe_obj: &serde_json::Value, key: &str, curr: &mut bool) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            if let Some(b) = x.as_bool() {
                *curr = b;
            }
        }
    }
}

/// Try to update a non-negative integer from a serde `Value` presumed to be an object.
/// If there is any error do not change the value.
pub fn update_json_usize(maybe_obj: &serde_json::Value, key: &str, curr: &mut usize) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            if let Some(n) = x.as_u64() {
                *curr = n as usize;
            }
        }
    }
}

/// Try to update a string list from a serde `Value` presumed to be an object.
/// If any element is not a string do not change the value.
pub fn update_json_vec_str(maybe_obj: &serde_json::Value, key: &str, curr: &mut Vec<String>) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            let mut ans = Vec::new();
            if let Some(a) = x.as_array() {
                for v in a {
                    match v.as_str() {
                        Some(s) => ans.push(s.to_string()),
                        None => return
                    }
                }
                *curr = ans;
            }
        }
    }
}

/// Convert a URL to a path buffer, Err if the URL is not a file URL.
pub fn pathbuf_from_uri(uri: &lsp::Url) -> Result<std::path::PathBuf,Error> {
    match uri.to_file_path() {
        Ok(p) => Ok(p),
        Err(_) => Err(Error::BadUrl)
    }
}
