//! Per-file symbol extraction
//!
//! `Extractor` consumes parsed lines in source order and accumulates the symbol sets of
//! one file.  The state that depends on earlier lines (the global label in effect, the most
//! recent label of any kind) lives in the extractor, never in the `SymbolFile`.
//! When the last line has been pushed, `finish` runs the subroutine boundary inference,
//! which needs the complete set of call targets.

use std::collections::BTreeMap;
use regex::Regex;
use lsp_types as lsp;
use super::parser::{self,ParsedLine,Span};
use super::{resolution_key,Symbol,SymbolKind,CALL_OPS,RETURN_OPS,DATA_OPS,MACRO_OP,INCLUDE_OP,INCDIR_OP};
use crate::lang::lsp_range;

const RCH: &str = "unreachable was reached";
/// register names, optionally with an index size, are never reported as references
const REGISTER_PATT: &str = r"(?i)^(d[0-7]|a[0-7]|sp|ssp|usp|pc|sr|ccr)(\.[wl])?$";

/// Symbol sets of one source file.
#[derive(Clone,Debug,PartialEq)]
pub struct SymbolFile {
    uri: lsp::Url,
    generation: u64,
    defined_symbols: Vec<Symbol>,
    referred_symbols: Vec<Symbol>,
    variables: Vec<Symbol>,
    labels: Vec<Symbol>,
    macros: Vec<Symbol>,
    subroutine_names: Vec<String>,
    data_definition_owners: Vec<Symbol>,
    include_dir: Option<String>,
    included_files: Vec<Symbol>,
    /// map from label index to the first return instruction that follows it
    returns: BTreeMap<usize,lsp::Range>
}

/// Accumulates a `SymbolFile` one line at a time.
pub struct Extractor {
    file: SymbolFile,
    last_global: Option<String>,
    /// index into `labels` of the most recent label of any kind
    last_label: Option<usize>,
    /// for each label, its index in `defined_symbols`
    label_slots: Vec<usize>,
    /// indices into `labels`, in order of first data directive
    owner_slots: Vec<usize>,
    register_patt: Regex
}

/// Remove surrounding quotes or angle brackets from a path argument.
pub fn strip_quotes(txt: &str) -> String {
    let t = txt.trim();
    for (open,close) in [('"','"'),('\'','\''),('<','>')] {
        if t.len() >= 2 && t.starts_with(open) && t.ends_with(close) {
            return t[1..t.len()-1].trim().to_string();
        }
    }
    t.replace('"',"")
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'.'
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || c == b'$'
}

/// Find identifier-like tokens in the span.  Numbers, strings, registers,
/// and size suffixes are skipped.
fn scan_identifiers<'a>(raw: &'a str, span: Span, row: u32, register_patt: &Regex) -> Vec<(&'a str,lsp::Range)> {
    let b = raw.as_bytes();
    let end = span.end.min(b.len());
    let mut ans = Vec::new();
    let mut i = span.start;
    while i < end {
        let c = b[i];
        if c == b'"' || c == b'\'' {
            i += 1;
            while i < end && b[i] != c {
                i += 1;
            }
            i += 1;
        } else if c.is_ascii_digit() || c == b'$' || c == b'%' || c == b'@' {
            i += 1;
            while i < end && (b[i].is_ascii_alphanumeric() || b[i] == b'_') {
                i += 1;
            }
            if i + 1 < end && b[i] == b'.' && parser::is_size_letter(b[i+1]) && (i + 2 == end || !is_ident_char(b[i+2])) {
                i += 2;
            }
        } else if is_ident_start(c) {
            let start = i;
            while i < end && is_ident_char(b[i]) {
                i += 1;
            }
            let mut stop = i;
            // `label.w` is the label with an absolute short size
            if stop - start > 2 && b[stop-2] == b'.' && parser::is_size_letter(b[stop-1]) {
                stop -= 2;
            }
            let tok = &raw[start..stop];
            if tok.len() > 1 || !tok.starts_with('.') {
                if !register_patt.is_match(tok) {
                    ans.push((tok,lsp_range(row,start,stop)));
                }
            }
        } else {
            i += 1;
        }
    }
    ans
}

impl SymbolFile {
    /// Create an empty symbol file
    pub fn new(uri: &lsp::Url) -> Self {
        Self {
            uri: uri.clone(),
            generation: 0,
            defined_symbols: Vec::new(),
            referred_symbols: Vec::new(),
            variables: Vec::new(),
            labels: Vec::new(),
            macros: Vec::new(),
            subroutine_names: Vec::new(),
            data_definition_owners: Vec::new(),
            include_dir: None,
            included_files: Vec::new(),
            returns: BTreeMap::new()
        }
    }
    /// Clear all symbols and repopulate from `text`.  The URI and generation are kept.
    pub fn read_document(&mut self, text: &str) {
        let generation = self.generation;
        *self = extract(&self.uri,text);
        self.generation = generation;
    }
    pub fn uri(&self) -> &lsp::Url {
        &self.uri
    }
    /// Counter assigned by the registry when this file was installed
    pub fn generation(&self) -> u64 {
        self.generation
    }
    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }
    /// labels, variables, macros, and include files, in source order
    pub fn defined_symbols(&self) -> &[Symbol] {
        &self.defined_symbols
    }
    /// identifiers and mnemonics used on lines that define nothing
    pub fn referred_symbols(&self) -> &[Symbol] {
        &self.referred_symbols
    }
    pub fn variables(&self) -> &[Symbol] {
        &self.variables
    }
    /// global and local labels in source order, parents already inferred
    pub fn labels(&self) -> &[Symbol] {
        &self.labels
    }
    pub fn macros(&self) -> &[Symbol] {
        &self.macros
    }
    /// resolution keys of the targets of call instructions, e.g. `Main.loop` for `bsr .loop`
    pub fn subroutine_names(&self) -> &[String] {
        &self.subroutine_names
    }
    /// labels that precede a data, storage, or binary include directive
    pub fn data_definition_owners(&self) -> &[Symbol] {
        &self.data_definition_owners
    }
    /// the last `incdir` argument, quotes removed
    pub fn include_dir(&self) -> Option<&str> {
        self.include_dir.as_deref()
    }
    pub fn included_files(&self) -> &[Symbol] {
        &self.included_files
    }
    /// Is the label with this resolution key the entry point of a subroutine
    pub fn is_subroutine(&self, key: &str) -> bool {
        self.subroutine_names.iter().any(|s| s == key)
    }
    /// Labels whose inferred parent is the entry with resolution key `entry`,
    /// not counting the entry itself
    pub fn subroutine_members(&self, entry: &str) -> Vec<&Symbol> {
        self.labels.iter().filter(|s| s.parent() == entry && s.resolved_name() != entry).collect()
    }
    /// Nearest global label defined on or before `row`.
    /// This is the scope that a local label typed at `row` would belong to.
    pub fn scope_at(&self, row: u32) -> Option<&str> {
        let mut ans = None;
        for sym in &self.labels {
            if sym.range().start.line > row {
                break;
            }
            if !sym.is_local() {
                ans = Some(sym.label());
            }
        }
        ans
    }
}

impl Extractor {
    pub fn new(uri: &lsp::Url) -> Self {
        Self {
            file: SymbolFile::new(uri),
            last_global: None,
            last_label: None,
            label_slots: Vec::new(),
            owner_slots: Vec::new(),
            register_patt: Regex::new(REGISTER_PATT).expect(RCH)
        }
    }
    fn define(&mut self, sym: Symbol) {
        log::trace!("define {}",sym.label());
        self.file.defined_symbols.push(sym);
    }
    fn push_label(&mut self, line: &ParsedLine) {
        let txt = line.label();
        let scope = match super::is_local(txt) {
            true => self.last_global.clone(),
            false => None
        };
        let sym = Symbol::new(txt,&self.file.uri,line.label_range(),SymbolKind::Label { scope });
        self.label_slots.push(self.file.defined_symbols.len());
        self.define(sym.clone());
        self.file.labels.push(sym);
        self.last_label = Some(self.file.labels.len() - 1);
        if !super::is_local(txt) {
            self.last_global = Some(txt.to_string());
        }
    }
    /// Accumulate the symbols on one line.  Lines must arrive in source order.
    pub fn push_line(&mut self, line: &ParsedLine) {
        let uri = self.file.uri.clone();
        let op = line.instruction().to_lowercase();
        let mut defines = false;

        if line.variable().len() > 0 {
            let value = line.value().to_string();
            let sym = Symbol::new(line.variable(),&uri,line.variable_range(),SymbolKind::Variable { value });
            self.define(sym.clone());
            self.file.variables.push(sym);
            defines = true;
        } else if line.label().len() > 0 {
            if op == MACRO_OP {
                let sym = Symbol::new(line.label(),&uri,line.label_range(),SymbolKind::Macro);
                self.define(sym.clone());
                self.file.macros.push(sym);
            } else {
                self.push_label(line);
            }
            defines = true;
        } else if op == MACRO_OP && line.data().len() > 0 {
            // alternate header, `macro NAME`
            let d = line.data();
            let name_len = d.find(|c: char| c.is_whitespace() || c == ',').unwrap_or(d.len());
            let start = line.data_span().start;
            let sym = Symbol::new(&d[0..name_len],&uri,lsp_range(line.row(),start,start+name_len),SymbolKind::Macro);
            self.define(sym.clone());
            self.file.macros.push(sym);
            defines = true;
        }

        if op == INCLUDE_OP {
            let name = strip_quotes(line.data());
            if name.len() > 0 {
                log::debug!("{}: include {}",line.row(),name);
                let sym = Symbol::new(&name,&uri,line.data_range(),SymbolKind::Include);
                self.define(sym.clone());
                self.file.included_files.push(sym);
            }
            defines = true;
        } else if op == INCDIR_OP {
            let dir = strip_quotes(line.data());
            log::debug!("{}: include directory {}",line.row(),dir);
            self.file.include_dir = Some(dir);
            defines = true;
        }

        if !defines {
            for (tok,rng) in scan_identifiers(line.raw(),line.data_span(),line.row(),&self.register_patt) {
                self.file.referred_symbols.push(Symbol::new(tok,&uri,rng,SymbolKind::Reference));
            }
            if line.instruction().len() > 0 {
                self.file.referred_symbols.push(Symbol::new(line.instruction(),&uri,line.instruction_range(),SymbolKind::Reference));
            }
        }

        if CALL_OPS.contains(&op.as_str()) {
            let target = line.data().split(|c: char| c.is_whitespace() || c == '(').next().unwrap_or("");
            let key = resolution_key(self.last_global.as_deref(),target);
            if target.len() > 0 && !self.file.subroutine_names.contains(&key) {
                log::trace!("{}: call target {}",line.row(),key);
                self.file.subroutine_names.push(key);
            }
        } else if RETURN_OPS.contains(&op.as_str()) {
            if let Some(idx) = self.last_label {
                self.file.returns.entry(idx).or_insert(line.instruction_range());
            }
        } else if DATA_OPS.contains(&op.as_str()) {
            if let Some(idx) = self.last_label {
                if !self.owner_slots.contains(&idx) {
                    self.owner_slots.push(idx);
                }
            }
        }
    }
    /// Run boundary inference and hand over the completed file.
    pub fn finish(mut self) -> SymbolFile {
        super::subroutines::infer(&mut self.file.labels,&self.file.subroutine_names,&self.file.returns);
        for (idx,slot) in self.label_slots.iter().enumerate() {
            self.file.defined_symbols[*slot] = self.file.labels[idx].clone();
        }
        for idx in &self.owner_slots {
            let owner = self.file.labels[*idx].clone();
            self.file.data_definition_owners.push(owner);
        }
        log::info!("{}: {} labels, {} variables, {} macros, {} includes",
            self.file.uri.as_str(),
            self.file.labels.len(),
            self.file.variables.len(),
            self.file.macros.len(),
            self.file.included_files.len());
        self.file
    }
}

/// Parse every line of `text` and extract the symbols.
pub fn extract(uri: &lsp::Url, text: &str) -> SymbolFile {
    let mut extractor = Extractor::new(uri);
    for (row,line) in text.lines().enumerate() {
        extractor.push_line(&parser::parse(line,row as u32));
    }
    extractor.finish()
}

/// Extract from lines that were already parsed, e.g. by an editor that keeps them.
pub fn extract_lines<'a,I>(uri: &lsp::Url, lines: I) -> SymbolFile
where I: IntoIterator<Item = ParsedLine<'a>> {
    let mut extractor = Extractor::new(uri);
    for line in lines {
        extractor.push_line(&line);
    }
    extractor.finish()
}
