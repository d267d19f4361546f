//! Test of cross-file resolution.

use std::sync::Arc;
use lsp_types as lsp;
use super::super::QueryKind;
use super::super::registry::SymbolRegistry;
use super::super::resolver::{Resolver,Resolved,SearchScope};
use crate::lang::files::VirtualFiles;

#[cfg(test)]
fn url(s: &str) -> lsp::Url {
    lsp::Url::parse(s).expect("bad url")
}

/// Put the documents in a registry and parse them all
#[cfg(test)]
fn registry_with(docs: &[(&str,&str)]) -> SymbolRegistry {
    let files = Arc::new(VirtualFiles::new());
    for (uri,text) in docs {
        files.insert(&url(uri),text);
    }
    let registry = SymbolRegistry::new(files);
    for (uri,_) in docs {
        registry.get_or_parse(&url(uri)).expect("parse failed");
    }
    registry
}

#[cfg(test)]
fn names(results: &[Resolved]) -> Vec<String> {
    results.iter().map(|r| r.name.clone()).collect()
}

#[cfg(test)]
fn project_docs() -> Vec<(&'static str,&'static str)> {
    vec![
        ("file:///ws/main.s","    incdir \"inc\"\n    include \"b.asm\"\nMYLABEL:\n    bsr OTHERLABEL\n"),
        ("file:///ws/inc/b.asm","OTHERLABEL:\n    rts\nOTHER_VAR equ 4\n"),
        ("file:///ws/other/c.s","OTHERTHING:\n")
    ]
}

#[test]
fn local_label_key() {
    let registry = registry_with(&[("file:///ws/a.s","FOO:\n.bar:\n.baz:\nBAR:\n.bar:\n")]);
    let resolver = Resolver::new(&registry);
    let results = resolver.find_starting_with("FOO.b",QueryKind::Label,&SearchScope::Workspace);
    assert_eq!(names(&results),vec!["FOO.bar","FOO.baz"]);
    assert_eq!(results[0].symbol.label(),".bar");
    assert_eq!(results[0].symbol.scope(),Some("FOO"));
    assert_eq!(results[0].file.uri().as_str(),"file:///ws/a.s");
    let results = resolver.find_starting_with("BAR.",QueryKind::Label,&SearchScope::Workspace);
    assert_eq!(results.len(),1);
    assert_eq!(results[0].symbol.range().start.line,4);
    assert_eq!(resolver.find_starting_with(".bar",QueryKind::Label,&SearchScope::Workspace).len(),0);
}

#[test]
fn kinds_and_case() {
    let registry = registry_with(&[("file:///ws/a.s","Count = 1\nCounter:\nCountUp macro\n    endm\n")]);
    let resolver = Resolver::new(&registry);
    let scope = SearchScope::Workspace;
    assert_eq!(names(&resolver.find_starting_with("Count",QueryKind::Label,&scope)),vec!["Counter"]);
    assert_eq!(names(&resolver.find_starting_with("Count",QueryKind::Variable,&scope)),vec!["Count"]);
    assert_eq!(names(&resolver.find_starting_with("Count",QueryKind::Macro,&scope)),vec!["CountUp"]);
    assert_eq!(resolver.find_starting_with("count",QueryKind::Label,&scope).len(),0);
}

#[test]
fn duplicates_across_files() {
    let registry = registry_with(&[
        ("file:///ws/z.s","Init:\n"),
        ("file:///ws/a.s","Init:\n")
    ]);
    let resolver = Resolver::new(&registry);
    let results = resolver.find_starting_with("In",QueryKind::Label,&SearchScope::Workspace);
    assert_eq!(results.len(),2);
    assert_eq!(results[0].file.uri().as_str(),"file:///ws/a.s");
    assert_eq!(results[1].file.uri().as_str(),"file:///ws/z.s");
}

#[test]
fn include_directory_scope() {
    let registry = registry_with(&project_docs());
    let resolver = Resolver::new(&registry);
    let main = url("file:///ws/main.s");
    let all = resolver.find_starting_with("OTHER",QueryKind::Label,&SearchScope::Workspace);
    assert_eq!(names(&all),vec!["OTHERLABEL","OTHERTHING"]);
    let scoped = resolver.find_starting_with("OTHER",QueryKind::Label,&SearchScope::IncludeDirectory(main.clone()));
    assert_eq!(names(&scoped),vec!["OTHERLABEL"]);
    assert_eq!(scoped[0].file.uri().as_str(),"file:///ws/inc/b.asm");
    // the root itself is always searched
    let own = resolver.find_starting_with("MY",QueryKind::Label,&SearchScope::IncludeDirectory(main));
    assert_eq!(names(&own),vec!["MYLABEL"]);
}

#[test]
fn include_graph_scope() {
    let registry = registry_with(&project_docs());
    let resolver = Resolver::new(&registry);
    let main = url("file:///ws/main.s");
    let scope = SearchScope::IncludeGraph(main.clone());
    let files: Vec<String> = resolver.candidates(&scope).iter().map(|f| f.uri().to_string()).collect();
    assert_eq!(files,vec!["file:///ws/inc/b.asm","file:///ws/main.s"]);
    assert_eq!(names(&resolver.find_starting_with("OTHER",QueryKind::Variable,&scope)),vec!["OTHER_VAR"]);
    assert_eq!(resolver.resolve_include(&registry.get(&main).expect("not cached"),"b.asm"),Some(url("file:///ws/inc/b.asm")));
}

#[test]
fn include_graph_parses_on_demand() {
    let files = Arc::new(VirtualFiles::new());
    let main = url("file:///ws/main.s");
    files.insert(&main,"    include \"lib/util.i\"\n");
    files.insert(&url("file:///ws/lib/util.i"),"    include \"more.i\"\nUtil:\n");
    files.insert(&url("file:///ws/more.i"),"    include \"main.s\"\nMore:\n");
    let registry = SymbolRegistry::new(files);
    let resolver = Resolver::new(&registry);
    let scope = SearchScope::IncludeGraph(main.clone());
    // util.i names more.i relative to itself, which does not exist, so more.i is not reached
    assert_eq!(names(&resolver.find_starting_with("",QueryKind::Label,&scope)),vec!["Util"]);
    assert_eq!(registry.files().len(),2);
}

#[test]
fn include_cycle_terminates() {
    let registry = registry_with(&[
        ("file:///ws/a.s","    include \"b.s\"\nA:\n"),
        ("file:///ws/b.s","    include 'a.s'\nB:\n")
    ]);
    let resolver = Resolver::new(&registry);
    let scope = SearchScope::IncludeGraph(url("file:///ws/a.s"));
    assert_eq!(names(&resolver.find_starting_with("",QueryKind::Label,&scope)),vec!["A","B"]);
}

#[test]
fn unresolved_paths_are_not_errors() {
    let registry = registry_with(&[
        ("file:///ws/main.s","    incdir \"nowhere\"\n    include \"missing.i\"\nM:\n"),
        ("file:///ws/x.s","X:\n")
    ]);
    let resolver = Resolver::new(&registry);
    let main = url("file:///ws/main.s");
    assert_eq!(resolver.include_dir_uri(&registry.get(&main).expect("not cached")),None);
    // no include directory means no restriction
    let scope = SearchScope::IncludeDirectory(main.clone());
    assert_eq!(names(&resolver.find_starting_with("",QueryKind::Label,&scope)),vec!["M","X"]);
    // missing include is skipped
    let scope = SearchScope::IncludeGraph(main);
    assert_eq!(names(&resolver.find_starting_with("",QueryKind::Label,&scope)),vec!["M"]);
    // unknown root
    let scope = SearchScope::IncludeGraph(url("file:///ws/gone.s"));
    assert_eq!(resolver.find_starting_with("",QueryKind::Label,&scope).len(),0);
}
