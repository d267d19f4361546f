//! Parse settings string sent by any client.
//!
//! Keys that are not recognized are ignored, and a value of the wrong type
//! leaves the default in place.

use serde_json;
use crate::DYNERR;
use crate::lang::{update_json_bool,update_json_usize,update_json_vec_str};

/// Which files a symbol search may draw from
#[derive(Clone,Copy,Debug,PartialEq)]
pub enum IncludeScope {
    /// every file in the registry
    Workspace,
    /// the current file and whatever it includes, transitively
    Includes,
    /// the current file and files under its include directory
    IncludeDir
}

#[derive(Clone)]
pub struct Settings {
    /// file extensions picked up when gathering a workspace
    pub source_extensions: Vec<String>,
    pub max_files: usize,
    pub case_sensitive: bool,
    pub include_scope: IncludeScope
}

impl Settings {
    pub fn new() -> Self {
        Self {
            source_extensions: vec!["s".to_string(),"asm".to_string(),"i".to_string()],
            max_files: 1000,
            case_sensitive: false,
            include_scope: IncludeScope::Workspace
        }
    }
}

pub fn parse(json: &str) -> Result<Settings,DYNERR> {
    let mut ans = Settings::new();
    let root = serde_json::from_str::<serde_json::Value>(json)?;
    if let Some(obj) = root.as_object() {
        update_json_vec_str(&root,"sourceExtensions",&mut ans.source_extensions);
        update_json_usize(&root,"maxFiles",&mut ans.max_files);
        update_json_bool(&root,"caseSensitive",&mut ans.case_sensitive);
        if let Some(val) = obj.get("includeScope") {
            match val.as_str() {
                Some("workspace") => ans.include_scope = IncludeScope::Workspace,
                Some("includes") => ans.include_scope = IncludeScope::Includes,
                Some("includeDir") => ans.include_scope = IncludeScope::IncludeDir,
                _ => log::warn!("unknown include scope {}",val)
            }
        }
    }
    Ok(ans)
}
