//! Query façade
//!
//! `Project` bundles a registry with settings and answers the questions an editor asks.
//! Case folding is applied here when `caseSensitive` is off, the resolver itself
//! always compares exactly.
//!
//! Where a query takes a `row`, it is used to find the global label that a local label
//! typed on that row would belong to.

use std::sync::Arc;
use lsp_types as lsp;
use super::{Symbol,QueryKind,resolution_key,is_local};
use super::symbol_file::SymbolFile;
use super::registry::SymbolRegistry;
use super::resolver::{Resolver,Resolved,SearchScope};
use super::settings::{Settings,IncludeScope};
use crate::lang::{Document,Error,lsp_range};
use crate::lang::files::FileAccess;

pub struct Project {
    registry: Arc<SymbolRegistry>,
    settings: Settings
}

/// Range of just the name, a subroutine entry's range may have been widened
/// to cover its whole body.
fn name_range(sym: &Symbol) -> lsp::Range {
    let start = sym.range().start;
    lsp_range(start.line,start.character as usize,start.character as usize + sym.label().len())
}

/// Add a completion unless one with the same label is already there
fn push_item(ans: &mut Vec<lsp::CompletionItem>, label: String, kind: lsp::CompletionItemKind, detail: String) {
    if ans.iter().any(|item| item.label == label) {
        return;
    }
    ans.push(lsp::CompletionItem {
        label,
        kind: Some(kind),
        detail: Some(detail),
        ..Default::default()
    });
}

#[allow(deprecated)]
fn create_symbol(name: &str, detail: Option<String>, kind: lsp::SymbolKind, rng: &lsp::Range, sel: &lsp::Range) -> lsp::DocumentSymbol {
    lsp::DocumentSymbol {
        name: name.to_string(),
        detail,
        kind,
        range: rng.clone(),
        selection_range: sel.clone(),
        tags: None,
        children: None,
        deprecated: None
    }
}

impl Project {
    pub fn new(files: Arc<dyn FileAccess>, settings: Settings) -> Self {
        Self {
            registry: Arc::new(SymbolRegistry::new(files)),
            settings
        }
    }
    /// Share an existing registry
    pub fn with_registry(registry: Arc<SymbolRegistry>, settings: Settings) -> Self {
        Self {
            registry,
            settings
        }
    }
    pub fn registry(&self) -> Arc<SymbolRegistry> {
        Arc::clone(&self.registry)
    }
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }
    /// Parse every source below the workspace folders
    pub fn gather(&self, dirs: &[lsp::Url]) -> Result<usize,Error> {
        self.registry.gather(dirs,&self.settings)
    }
    /// Take in text from an editor buffer
    pub fn update_document(&self, doc: &Document) -> Arc<SymbolFile> {
        self.registry.update_document(doc)
    }
    /// Search scope for a query made from `from`, per the settings.
    /// Without a current file the whole workspace is searched.
    pub fn scope_for(&self, from: Option<&lsp::Url>) -> SearchScope {
        match (from,self.settings.include_scope) {
            (None,_) | (_,IncludeScope::Workspace) => SearchScope::Workspace,
            (Some(uri),IncludeScope::Includes) => SearchScope::IncludeGraph(uri.clone()),
            (Some(uri),IncludeScope::IncludeDir) => SearchScope::IncludeDirectory(uri.clone())
        }
    }
    fn find(&self, prefix: &str, kind: QueryKind, from: Option<&lsp::Url>) -> Vec<Resolved> {
        let resolver = Resolver::new(&self.registry);
        let scope = self.scope_for(from);
        match self.settings.case_sensitive {
            true => resolver.find_starting_with(prefix,kind,&scope),
            false => {
                let prefix = prefix.to_lowercase();
                resolver.find_matching(kind,&scope,|name| name.to_lowercase().starts_with(&prefix))
            }
        }
    }
    fn find_exact(&self, key: &str, kind: QueryKind, from: Option<&lsp::Url>) -> Vec<Resolved> {
        let resolver = Resolver::new(&self.registry);
        let scope = self.scope_for(from);
        match self.settings.case_sensitive {
            true => resolver.find_matching(kind,&scope,|name| name == key),
            false => resolver.find_matching(kind,&scope,|name| name.eq_ignore_ascii_case(key))
        }
    }
    /// Labels whose resolution key starts with `prefix`.  For a local label the caller
    /// supplies the full key, e.g. `FOO.b`.
    pub fn find_label_starting_with(&self, prefix: &str, from: Option<&lsp::Url>) -> Vec<Resolved> {
        self.find(prefix,QueryKind::Label,from)
    }
    pub fn find_variable_starting_with(&self, prefix: &str, from: Option<&lsp::Url>) -> Vec<Resolved> {
        self.find(prefix,QueryKind::Variable,from)
    }
    pub fn find_macro_starting_with(&self, prefix: &str, from: Option<&lsp::Url>) -> Vec<Resolved> {
        self.find(prefix,QueryKind::Macro,from)
    }
    /// The `incdir` of the file, parsing it if necessary.  None if the file cannot be read.
    pub fn get_include_dir(&self, uri: &lsp::Url) -> Option<String> {
        match self.registry.get_or_parse(uri) {
            Ok(file) => file.include_dir().map(|s| s.to_string()),
            Err(e) => {
                log::debug!("{}: {}",uri.as_str(),e);
                None
            }
        }
    }
    /// Symbols of the file, parsing it if necessary
    pub fn get_symbol_file(&self, uri: &lsp::Url) -> Result<Arc<SymbolFile>,Error> {
        self.registry.get_or_parse(uri)
    }
    /// Resolution key for `word` as typed on `row` of `uri`
    pub fn search_key(&self, uri: &lsp::Url, row: u32, word: &str) -> String {
        if !is_local(word) {
            return word.to_string();
        }
        match self.registry.get_or_parse(uri) {
            Ok(file) => resolution_key(file.scope_at(row),word),
            Err(_) => word.to_string()
        }
    }
    /// Completions for the partial `word` on `row`.  A local label is completed as written,
    /// anything else by its full name.
    pub fn completions(&self, uri: &lsp::Url, row: u32, word: &str) -> Vec<lsp::CompletionItem> {
        let mut ans: Vec<lsp::CompletionItem> = Vec::new();
        let key = self.search_key(uri,row,word);
        for res in self.find_label_starting_with(&key,Some(uri)) {
            let label = match is_local(word) {
                true => res.symbol.label().to_string(),
                false => res.name.clone()
            };
            let (kind,detail) = match res.file.is_subroutine(&res.name) {
                true => (lsp::CompletionItemKind::FUNCTION,"subroutine".to_string()),
                false => (lsp::CompletionItemKind::CONSTANT,"label".to_string())
            };
            push_item(&mut ans,label,kind,detail);
        }
        if is_local(word) {
            return ans;
        }
        for res in self.find_variable_starting_with(&key,Some(uri)) {
            let detail = res.symbol.value().unwrap_or("").to_string();
            push_item(&mut ans,res.name,lsp::CompletionItemKind::VARIABLE,detail);
        }
        for res in self.find_macro_starting_with(&key,Some(uri)) {
            push_item(&mut ans,res.name,lsp::CompletionItemKind::FUNCTION,"macro".to_string());
        }
        ans
    }
    /// Every definition of `word` as typed on `row`
    pub fn definition(&self, uri: &lsp::Url, row: u32, word: &str) -> Vec<lsp::Location> {
        let key = self.search_key(uri,row,word);
        let mut ans = Vec::new();
        for kind in [QueryKind::Label,QueryKind::Variable,QueryKind::Macro] {
            for res in self.find_exact(&key,kind,Some(uri)) {
                ans.push(lsp::Location::new(res.file.uri().clone(),name_range(&res.symbol)));
            }
        }
        ans
    }
    /// Describe the first definition of `word` as typed on `row`
    pub fn hover(&self, uri: &lsp::Url, row: u32, word: &str) -> Option<lsp::Hover> {
        let key = self.search_key(uri,row,word);
        for kind in [QueryKind::Label,QueryKind::Variable,QueryKind::Macro] {
            if let Some(res) = self.find_exact(&key,kind,Some(uri)).first() {
                let sym = &res.symbol;
                let mut value = match kind {
                    QueryKind::Label if res.file.is_subroutine(&res.name) => format!("subroutine `{}`",res.name),
                    QueryKind::Label => format!("label `{}`",res.name),
                    QueryKind::Variable => format!("variable `{}` = `{}`",res.name,sym.value().unwrap_or("")),
                    QueryKind::Macro => format!("macro `{}`",res.name)
                };
                if kind == QueryKind::Label && sym.parent() != sym.label() {
                    value += &format!("\n\nin subroutine `{}`",sym.parent());
                }
                value += &format!("\n\ndefined in {} line {}",res.file.uri().as_str(),sym.range().start.line + 1);
                return Some(lsp::Hover {
                    contents: lsp::HoverContents::Markup(lsp::MarkupContent {
                        kind: lsp::MarkupKind::Markdown,
                        value
                    }),
                    range: None
                });
            }
        }
        None
    }
    /// Outline of one file.  Subroutines are functions with their member labels as children.
    pub fn document_symbols(&self, uri: &lsp::Url) -> Result<Vec<lsp::DocumentSymbol>,Error> {
        let file = self.registry.get_or_parse(uri)?;
        let mut ans = Vec::new();
        for sym in file.labels() {
            if sym.parent() != sym.label() {
                continue;
            }
            let sel = name_range(sym);
            let key = sym.resolved_name();
            if file.is_subroutine(&key) {
                let mut outer = create_symbol(&key,Some("subroutine".to_string()),lsp::SymbolKind::FUNCTION,sym.range(),&sel);
                let children: Vec<lsp::DocumentSymbol> = file.subroutine_members(&key).iter()
                    .map(|m| create_symbol(&m.resolved_name(),None,lsp::SymbolKind::CONSTANT,m.range(),m.range()))
                    .collect();
                if children.len() > 0 {
                    outer.children = Some(children);
                }
                ans.push(outer);
            } else {
                ans.push(create_symbol(&sym.resolved_name(),None,lsp::SymbolKind::CONSTANT,sym.range(),&sel));
            }
        }
        for sym in file.variables() {
            ans.push(create_symbol(sym.label(),sym.value().map(|s| s.to_string()),lsp::SymbolKind::VARIABLE,sym.range(),sym.range()));
        }
        for sym in file.macros() {
            ans.push(create_symbol(sym.label(),Some("macro".to_string()),lsp::SymbolKind::FUNCTION,sym.range(),sym.range()));
        }
        Ok(ans)
    }
}
