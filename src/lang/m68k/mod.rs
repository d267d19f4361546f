//! # 68000 assembly analysis
//!
//! This module is used by both the CLI and editor integrations.
//! Sources are analyzed one line at a time by a hand written parser, there is no grammar.
//! The dialect is the common ground of Devpac, vasm (mot syntax), and AsmOne:
//!
//! * labels start in column 0 or, when indented, end with `:` or `::`; local labels start with `.`
//! * instructions take an optional size suffix such as `.w`
//! * comments start with `;` anywhere outside a string, or `*` in an empty field
//! * `include` and `incdir` connect files, `macro` defines macros
//!
//! Local labels are stored as written.  Their global context is remembered so that the
//! resolution key (e.g. `FOO.bar`) can be formed when searching, see `resolution_key`.

use lsp_types as lsp;
use serde::Serialize;

pub mod parser;
pub mod symbol_file;
pub mod subroutines;
pub mod registry;
pub mod resolver;
pub mod query;
pub mod settings;

#[cfg(test)]
mod tests;

/// instructions that call a subroutine, the operand is the target
pub const CALL_OPS: [&str;2] = ["jsr","bsr"];
/// instructions that return from a subroutine
pub const RETURN_OPS: [&str;4] = ["rts","rte","rtr","rtd"];
/// data and storage directives, the preceding label owns the data
pub const DATA_OPS: [&str;5] = ["dc","dcb","ds","blk","incbin"];
/// assignment directives, including the bare `=`
pub const EQUATE_OPS: [&str;6] = ["=","equ","set","equr","reg","fequ"];
pub const MACRO_OP: &str = "macro";
pub const INCLUDE_OP: &str = "include";
pub const INCDIR_OP: &str = "incdir";

/// What a symbol is, with anything that only applies to that kind.
#[derive(Clone,Debug,PartialEq,Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SymbolKind {
    /// Code or data label.  For a local label, `scope` is the global label
    /// that preceded it, if there was one.
    Label { scope: Option<String> },
    /// Assigned symbol, `value` is the right hand side as written
    Variable { value: String },
    Macro,
    /// File named by an `include` directive
    Include,
    /// Identifier or mnemonic used on a line that defines nothing
    Reference
}

/// Kinds of symbols that can be searched for
#[derive(Clone,Copy,Debug,PartialEq)]
pub enum QueryKind {
    Label,
    Variable,
    Macro
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Symbol {
    label: String,
    file: lsp::Url,
    range: lsp::Range,
    #[serde(flatten)]
    kind: SymbolKind,
    /// enclosing subroutine, or the label itself
    parent: String
}

/// Form the key used to search for a label.  Local labels (leading `.`) are prefixed
/// with their global scope, anything else is its own key.
pub fn resolution_key(scope: Option<&str>, raw: &str) -> String {
    match scope {
        Some(glob) if raw.starts_with('.') => [glob,raw].concat(),
        _ => raw.to_string()
    }
}

pub fn is_local(raw: &str) -> bool {
    raw.starts_with('.')
}

impl Symbol {
    pub fn new(label: &str, file: &lsp::Url, range: lsp::Range, kind: SymbolKind) -> Self {
        Self {
            label: label.to_string(),
            file: file.clone(),
            range,
            kind,
            parent: label.to_string()
        }
    }
    /// text of the symbol as written, local labels keep the leading `.`
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn file(&self) -> &lsp::Url {
        &self.file
    }
    pub fn range(&self) -> &lsp::Range {
        &self.range
    }
    pub fn location(&self) -> lsp::Location {
        lsp::Location::new(self.file.clone(),self.range)
    }
    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }
    pub fn parent(&self) -> &str {
        &self.parent
    }
    /// right hand side of an assignment
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            SymbolKind::Variable { value } => Some(value),
            _ => None
        }
    }
    pub fn is_local(&self) -> bool {
        is_local(&self.label)
    }
    /// global label in effect where this label was defined
    pub fn scope(&self) -> Option<&str> {
        match &self.kind {
            SymbolKind::Label { scope } => scope.as_deref(),
            _ => None
        }
    }
    /// name used for searching and display, e.g. `FOO.bar` for local `.bar` under `FOO`
    pub fn resolved_name(&self) -> String {
        resolution_key(self.scope(),&self.label)
    }
    pub(crate) fn set_parent(&mut self, parent: &str) {
        self.parent = parent.to_string();
    }
    pub(crate) fn set_range(&mut self, range: lsp::Range) {
        self.range = range;
    }
}
