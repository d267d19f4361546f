//! Cross-file resolver
//!
//! Searches the symbol files in a registry for symbols whose key starts with a prefix.
//! Labels are matched on their resolution key, so `FOO.b` finds local `.bar` under `FOO`.
//! Building the key for a cursor position is up to the caller, see `SymbolFile::scope_at`.
//!
//! Matching is case sensitive.  Results are ordered by file URL, then source order,
//! and duplicates across files are all returned.
//!
//! Include paths that do not resolve are not errors.  A missing include is skipped, and
//! an include directory that does not exist means the search is not restricted.

use std::collections::HashSet;
use std::sync::Arc;
use lsp_types as lsp;
use super::{Symbol,QueryKind};
use super::symbol_file::SymbolFile;
use super::registry::SymbolRegistry;
use crate::lang::files::{self,FileAccess};

/// Which files a search draws from
#[derive(Clone,Debug,PartialEq)]
pub enum SearchScope {
    /// every file in the registry
    Workspace,
    /// the root and every file reachable from it through `include`
    IncludeGraph(lsp::Url),
    /// the root and the files below the root's include directory
    IncludeDirectory(lsp::Url)
}

/// A match along with where it came from
#[derive(Clone,Debug)]
pub struct Resolved {
    /// resolution key, e.g. `FOO.bar`
    pub name: String,
    pub symbol: Symbol,
    pub file: Arc<SymbolFile>
}

pub struct Resolver<'a> {
    registry: &'a SymbolRegistry,
    files: Arc<dyn FileAccess>
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a SymbolRegistry) -> Self {
        Self {
            registry,
            files: registry.file_access()
        }
    }
    /// Resolve the `incdir` of `file` to an existing directory.
    /// Relative paths are taken relative to the directory containing `file`.
    pub fn include_dir_uri(&self, file: &SymbolFile) -> Option<lsp::Url> {
        let dir = file.include_dir()?;
        let base = files::parent_dir(file.uri())?;
        let ans = self.files.resolve_relative(&base,dir)?;
        match self.files.is_directory(&ans) {
            true => Some(files::as_directory(&ans)),
            false => {
                log::debug!("include directory {} not found",ans.as_str());
                None
            }
        }
    }
    /// Find the file named by an `include` in `from`.  An absolute name is used as is,
    /// otherwise the include directory is tried first, then the directory of `from`.
    pub fn resolve_include(&self, from: &SymbolFile, name: &str) -> Option<lsp::Url> {
        let mut bases = Vec::new();
        if let Some(dir) = self.include_dir_uri(from) {
            bases.push(dir);
        }
        if let Some(dir) = files::parent_dir(from.uri()) {
            bases.push(dir);
        }
        for base in bases {
            if let Some(uri) = self.files.resolve_relative(&base,name) {
                if self.files.exists(&uri) && !self.files.is_directory(&uri) {
                    return Some(uri);
                }
            }
        }
        log::debug!("could not resolve include {} from {}",name,from.uri().as_str());
        None
    }
    /// The root and every file it includes, transitively, parsing as needed.
    /// Files that cannot be read are skipped.
    pub fn include_graph(&self, root: &lsp::Url) -> Vec<Arc<SymbolFile>> {
        let mut ans = Vec::new();
        let mut visited: HashSet<lsp::Url> = HashSet::new();
        let mut pending = vec![root.clone()];
        while let Some(uri) = pending.pop() {
            if !visited.insert(uri.clone()) {
                continue;
            }
            let file = match self.registry.get_or_parse(&uri) {
                Ok(f) => f,
                Err(e) => {
                    log::warn!("{}: {}",uri.as_str(),e);
                    continue;
                }
            };
            for inc in file.included_files().iter().rev() {
                if let Some(child) = self.resolve_include(&file,inc.label()) {
                    pending.push(child);
                }
            }
            ans.push(file);
        }
        ans
    }
    /// Files a search in `scope` draws from, sorted by URL
    pub fn candidates(&self, scope: &SearchScope) -> Vec<Arc<SymbolFile>> {
        let mut ans = match scope {
            SearchScope::Workspace => self.registry.files(),
            SearchScope::IncludeGraph(root) => self.include_graph(root),
            SearchScope::IncludeDirectory(root) => {
                let root_file = match self.registry.get_or_parse(root) {
                    Ok(f) => f,
                    Err(e) => {
                        log::warn!("{}: {}",root.as_str(),e);
                        return self.registry.files();
                    }
                };
                let dir = match self.include_dir_uri(&root_file) {
                    Some(d) => d,
                    None => return self.registry.files()
                };
                let mut ans = self.include_graph(root);
                ans.append(&mut self.registry.files());
                ans.retain(|f| f.uri() == root || files::is_within(f.uri(),&dir));
                ans
            }
        };
        ans.sort_by(|a,b| a.uri().cmp(b.uri()));
        ans.dedup_by(|a,b| a.uri() == b.uri());
        ans
    }
    /// Symbols of `kind` whose key satisfies `matches`
    pub fn find_matching<F>(&self, kind: QueryKind, scope: &SearchScope, matches: F) -> Vec<Resolved>
    where F: Fn(&str) -> bool {
        let mut ans = Vec::new();
        for file in self.candidates(scope) {
            let pool = match kind {
                QueryKind::Label => file.labels(),
                QueryKind::Variable => file.variables(),
                QueryKind::Macro => file.macros()
            };
            for sym in pool {
                let name = sym.resolved_name();
                if matches(&name) {
                    ans.push(Resolved {
                        name,
                        symbol: sym.clone(),
                        file: Arc::clone(&file)
                    });
                }
            }
        }
        log::debug!("{} matches for {:?} in {:?}",ans.len(),kind,scope);
        ans
    }
    /// Symbols of `kind` whose key starts with `prefix`
    pub fn find_starting_with(&self, prefix: &str, kind: QueryKind, scope: &SearchScope) -> Vec<Resolved> {
        self.find_matching(kind,scope,|name| name.starts_with(prefix))
    }
}
