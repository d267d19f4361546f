//! Test of subroutine boundary inference.

use std::collections::BTreeMap;
use lsp_types as lsp;
use super::super::symbol_file::{extract,SymbolFile};
use super::super::subroutines;
use super::super::{Symbol,SymbolKind};
use crate::lang::{lsp_range,range_contains_range};

#[cfg(test)]
fn test_file(src: &str) -> SymbolFile {
    let uri = lsp::Url::parse("file:///work/sub.s").expect("bad url");
    extract(&uri,src)
}

#[cfg(test)]
fn label<'a>(file: &'a SymbolFile, name: &str) -> &'a Symbol {
    file.labels().iter().find(|s| s.label() == name).expect("label not found")
}

#[test]
fn member_attributed_to_call_target() {
    let file = test_file("    bsr SUB
    rts
SUB:
    nop
label2:
    nop
    rts
");
    let sub = label(&file,"SUB");
    let member = label(&file,"label2");
    assert_eq!(member.parent(),"SUB");
    assert_eq!(sub.parent(),"SUB");
    assert!(range_contains_range(sub.range(),member.range()));
    // widened through the closing rts
    assert_eq!(sub.range().end,lsp::Position::new(6,7));
    assert_eq!(file.subroutine_members("SUB").len(),1);
}

#[test]
fn return_closes_subroutine() {
    let file = test_file("Main:
    jsr Work(pc)
    rts
Work:
.inner:
    rts
After:
    nop
");
    assert_eq!(file.subroutine_names(),&["Work".to_string()]);
    assert_eq!(label(&file,".inner").parent(),"Work");
    assert_eq!(label(&file,"After").parent(),"After");
    assert_eq!(label(&file,"Main").parent(),"Main");
    assert!(!range_contains_range(label(&file,"Work").range(),label(&file,"After").range()));
}

#[test]
fn nested_target_keeps_parent() {
    let file = test_file("A:
    bsr B
B:
    nop
C:
    rts
D:
    rts
    bsr A
");
    assert_eq!(label(&file,"B").parent(),"A");
    assert_eq!(label(&file,"C").parent(),"A");
    assert_eq!(label(&file,"D").parent(),"D");
    assert_eq!(label(&file,"A").range().end.line,5);
}

#[test]
fn target_defined_before_call() {
    let file = test_file("Helper:
    moveq #1,d0
.x:
    rts
Entry:
    bsr Helper
    rts
");
    assert_eq!(label(&file,".x").parent(),"Helper");
    assert_eq!(label(&file,"Entry").parent(),"Entry");
}

#[test]
fn unclosed_subroutine_runs_to_end() {
    let file = test_file("    bsr Loop
Loop:
.a:
.b:
    bra .a
");
    assert_eq!(label(&file,".a").parent(),"Loop");
    assert_eq!(label(&file,".b").parent(),"Loop");
    assert_eq!(label(&file,"Loop").range().end.line,3);
}

#[test]
fn infer_directly() {
    let uri = lsp::Url::parse("file:///work/x.s").expect("bad url");
    let kind = SymbolKind::Label { scope: None };
    let mut labels = vec![
        Symbol::new("P",&uri,lsp_range(0,0,1),kind.clone()),
        Symbol::new("Q",&uri,lsp_range(2,0,1),kind.clone()),
        Symbol::new("R",&uri,lsp_range(5,0,1),kind)
    ];
    let mut returns = BTreeMap::new();
    returns.insert(1,lsp_range(3,4,7));
    subroutines::infer(&mut labels,&["P".to_string()],&returns);
    assert_eq!(labels[1].parent(),"P");
    assert_eq!(labels[2].parent(),"R");
    assert_eq!(*labels[0].range(),lsp::Range::new(lsp::Position::new(0,0),lsp::Position::new(3,7)));
}

#[test]
fn indented_call_target() {
    let file = test_file("    bsr Start
    Start:
    nop
.x:
    rts
After:
");
    assert_eq!(file.labels().len(),3);
    assert_eq!(label(&file,"Start").range().start.character,4);
    assert_eq!(label(&file,".x").parent(),"Start");
    assert_eq!(label(&file,"After").parent(),"After");
    assert!(file.referred_symbols().iter().all(|s| s.label() != "Start:"));
}

#[test]
fn double_colon_entry_returns() {
    let file = test_file("    bsr Foo
Foo:: rts
Bar:
    nop
");
    assert_eq!(label(&file,"Foo").range().end,lsp::Position::new(1,9));
    assert_eq!(label(&file,"Bar").parent(),"Bar");
}

#[test]
fn local_call_target_is_scoped() {
    let file = test_file("Init:
.loop:
    rts
Main:
    bsr .loop
    rts
.loop:
    nop
.more:
    rts
");
    assert_eq!(file.subroutine_names(),&["Main.loop".to_string()]);
    assert!(file.is_subroutine("Main.loop"));
    assert!(!file.is_subroutine("Init.loop"));
    let labels = file.labels();
    assert_eq!(labels[1].parent(),".loop");
    assert_eq!(labels[4].label(),".more");
    assert_eq!(labels[4].parent(),"Main.loop");
    assert_eq!(file.subroutine_members("Main.loop").len(),1);
    assert_eq!(labels[3].range().end.line,9);
}
