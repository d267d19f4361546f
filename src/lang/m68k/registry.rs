//! Symbol file registry
//!
//! Caches the most recent `SymbolFile` for each file.  A file is always rebuilt whole:
//! the new `SymbolFile` is built off to the side and swapped in atomically when complete,
//! so that readers see either the old version or the new one, and never wait on a build.
//! Builds of the same file are serialized by a per-file lock, builds of different files
//! proceed independently.
//!
//! The registry is `Sync`.  Share it between threads with `Arc<SymbolRegistry>`.

use std::collections::HashMap;
use std::sync::{Arc,Mutex,MutexGuard,RwLock,RwLockReadGuard,RwLockWriteGuard};
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64,Ordering};
use lsp_types as lsp;
use super::symbol_file::{self,SymbolFile};
use super::settings::Settings;
use crate::lang::{Document,Error};
use crate::lang::files::FileAccess;

/// Cache entry for one file
struct Slot {
    /// held for the duration of a build
    build: Mutex<()>,
    current: ArcSwapOption<SymbolFile>
}

pub struct SymbolRegistry {
    files: Arc<dyn FileAccess>,
    slots: RwLock<HashMap<lsp::Url,Arc<Slot>>>,
    generation: AtomicU64
}

// A panic while holding one of these locks cannot leave a half-built file behind,
// the file is swapped in only when complete, so poisoning is ignored.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_,T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}
fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_,T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
fn acquire(lock: &Mutex<()>) -> MutexGuard<'_,()> {
    lock.lock().unwrap_or_else(|e| e.into_inner())
}

impl Slot {
    fn new() -> Self {
        Self {
            build: Mutex::new(()),
            current: ArcSwapOption::empty()
        }
    }
    fn current(&self) -> Option<Arc<SymbolFile>> {
        self.current.load_full()
    }
}

impl SymbolRegistry {
    pub fn new(files: Arc<dyn FileAccess>) -> Self {
        Self {
            files,
            slots: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0)
        }
    }
    /// The file access capability the registry reads through
    pub fn file_access(&self) -> Arc<dyn FileAccess> {
        Arc::clone(&self.files)
    }
    /// Get the slot for `uri`, creating it if necessary
    fn slot(&self, uri: &lsp::Url) -> Arc<Slot> {
        if let Some(slot) = read(&self.slots).get(uri) {
            return Arc::clone(slot);
        }
        let mut slots = write(&self.slots);
        Arc::clone(slots.entry(uri.clone()).or_insert_with(|| Arc::new(Slot::new())))
    }
    /// Stamp the file and swap it in.  Caller must hold the slot's build lock.
    fn install(&self, slot: &Slot, mut file: SymbolFile) -> Arc<SymbolFile> {
        let generation = self.generation.fetch_add(1,Ordering::SeqCst) + 1;
        file.set_generation(generation);
        log::debug!("install {} generation {}",file.uri().as_str(),generation);
        let ans = Arc::new(file);
        slot.current.store(Some(Arc::clone(&ans)));
        ans
    }
    fn build(&self, uri: &lsp::Url) -> Result<SymbolFile,Error> {
        let text = self.files.read_whole_file(uri)?;
        Ok(symbol_file::extract(uri,&text))
    }
    /// Cached symbols for `uri`, parsing the file if there are none.
    /// If the file cannot be read the error is returned and nothing is cached.
    pub fn get_or_parse(&self, uri: &lsp::Url) -> Result<Arc<SymbolFile>,Error> {
        let slot = self.slot(uri);
        if let Some(ans) = slot.current() {
            return Ok(ans);
        }
        let _guard = acquire(&slot.build);
        // someone else may have finished while we waited
        if let Some(ans) = slot.current() {
            return Ok(ans);
        }
        let file = self.build(uri)?;
        Ok(self.install(&slot,file))
    }
    /// Cached symbols for `uri`, never parses
    pub fn get(&self, uri: &lsp::Url) -> Option<Arc<SymbolFile>> {
        match read(&self.slots).get(uri) {
            Some(slot) => slot.current(),
            None => None
        }
    }
    /// Read the file again and replace whatever is cached.
    /// On failure the cached version is left alone.
    pub fn reparse(&self, uri: &lsp::Url) -> Result<Arc<SymbolFile>,Error> {
        let slot = self.slot(uri);
        let _guard = acquire(&slot.build);
        let file = self.build(uri)?;
        Ok(self.install(&slot,file))
    }
    /// Replace the cached symbols using text supplied by an editor, which may differ
    /// from what is on disk.
    pub fn update_document(&self, doc: &Document) -> Arc<SymbolFile> {
        let slot = self.slot(&doc.uri);
        let _guard = acquire(&slot.build);
        let file = symbol_file::extract(&doc.uri,&doc.text);
        self.install(&slot,file)
    }
    /// Forget the cached symbols for `uri`.  The next `get_or_parse` reads the file again.
    pub fn invalidate(&self, uri: &lsp::Url) {
        if let Some(slot) = read(&self.slots).get(uri) {
            let _guard = acquire(&slot.build);
            log::debug!("invalidate {}",uri.as_str());
            slot.current.store(None);
        }
    }
    /// Forget everything
    pub fn clear(&self) {
        write(&self.slots).clear();
    }
    /// Every cached file, sorted by URL
    pub fn files(&self) -> Vec<Arc<SymbolFile>> {
        let mut ans: Vec<Arc<SymbolFile>> = read(&self.slots).values().filter_map(|s| s.current()).collect();
        ans.sort_by(|a,b| a.uri().cmp(b.uri()));
        ans
    }
    /// URLs of every cached file, sorted
    pub fn uris(&self) -> Vec<lsp::Url> {
        self.files().iter().map(|f| f.uri().clone()).collect()
    }
    /// Parse every source file found below any of `dirs`, replacing what is cached.
    /// Sources are recognized by the extensions in `settings`.  Returns the number of
    /// files parsed, or `OutOfRange` if there are more than `settings.max_files`.
    pub fn gather(&self, dirs: &[lsp::Url], settings: &Settings) -> Result<usize,Error> {
        let mut builder = globset::GlobSetBuilder::new();
        for ext in &settings.source_extensions {
            let patt = format!("*.{}",ext);
            match globset::GlobBuilder::new(&patt).case_insensitive(true).build() {
                Ok(g) => { builder.add(g); },
                Err(e) => log::warn!("bad extension {}: {}",ext,e)
            }
        }
        let filter = match builder.build() {
            Ok(f) => f,
            Err(_) => return Err(Error::Syntax)
        };
        let opt = glob::MatchOptions {
            case_sensitive: false,
            require_literal_leading_dot: false,
            require_literal_separator: false
        };
        let mut count = 0;
        for dir in dirs {
            let base = crate::lang::pathbuf_from_uri(dir)?;
            log::debug!("scanning {}",dir.as_str());
            let patt = base.join("**").join("*");
            let globable = match patt.as_os_str().to_str() {
                Some(s) => s.to_string(),
                None => {
                    log::warn!("directory {} could not be globbed",dir.as_str());
                    continue;
                }
            };
            let paths = match glob::glob_with(&globable,opt) {
                Ok(p) => p,
                Err(_) => return Err(Error::Syntax)
            };
            for path in paths.flatten() {
                let is_source = match path.file_name() {
                    Some(name) => filter.is_match(name),
                    None => false
                };
                if !is_source || !path.is_file() {
                    continue;
                }
                count += 1;
                if count > settings.max_files {
                    return Err(Error::OutOfRange);
                }
                match lsp::Url::from_file_path(&path) {
                    Ok(uri) => match self.reparse(&uri) {
                        Ok(_) => log::trace!("{}",uri.as_str()),
                        Err(e) => log::warn!("skipping {}: {}",uri.as_str(),e)
                    },
                    Err(_) => log::warn!("skipping {}",path.display())
                }
            }
        }
        log::info!("there were {} sources in the workspace",count);
        Ok(count)
    }
}
