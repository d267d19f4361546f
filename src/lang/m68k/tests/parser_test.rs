//! Test of the line parser.

use super::super::parser::{parse,LineKind,ParsedLine};

#[cfg(test)]
fn test_fields(line: &ParsedLine, expected: [&str;5]) {
    assert_eq!(line.label(),expected[0]);
    assert_eq!(line.instruction(),expected[1]);
    assert_eq!(line.size(),expected[2]);
    assert_eq!(line.data(),expected[3]);
    assert_eq!(line.comment(),expected[4]);
}

#[cfg(test)]
fn test_ordered(line: &ParsedLine) {
    let spans = line.spans();
    for i in 1..spans.len() {
        assert!(spans[i-1].end <= spans[i].start,"span {} overlaps span {}",i-1,i);
    }
    assert!(spans[4].end <= line.raw().len());
}

mod fields {
    use super::*;
    #[test]
    fn full_statement() {
        let line = parse("LABEL: MOVE.W D0,D1 ; comment",3);
        test_fields(&line,["LABEL","MOVE","W","D0,D1","; comment"]);
        test_ordered(&line);
        assert_eq!(line.kind(),LineKind::Statement);
        let rng = line.data_range();
        assert_eq!((rng.start.line,rng.start.character,rng.end.character),(3,14,19));
        assert_eq!(line.comment_range().end.character,29);
    }
    #[test]
    fn label_without_colon() {
        let line = parse("loop\tdbf d7,loop",0);
        test_fields(&line,["loop","dbf","","d7,loop",""]);
        test_ordered(&line);
    }
    #[test]
    fn local_label() {
        let line = parse(".next:  addq.l #1,a0",0);
        test_fields(&line,[".next","addq","l","#1,a0",""]);
    }
    #[test]
    fn label_only() {
        let line = parse("Start:",0);
        test_fields(&line,["Start","","","",""]);
        assert_eq!(line.kind(),LineKind::Statement);
        test_ordered(&line);
    }
    #[test]
    fn no_label() {
        let line = parse("    rts",0);
        test_fields(&line,["","rts","","",""]);
        assert_eq!(line.instruction_range().start.character,4);
        assert_eq!(line.label_range().start.character,0);
    }
    #[test]
    fn indented_label_with_colon() {
        let line = parse("    Start:",0);
        test_fields(&line,["Start","","","",""]);
        assert_eq!(line.label_range().start.character,4);
        assert_eq!(line.kind(),LineKind::Statement);
        test_ordered(&line);
        let line = parse("\t.loop: dbf d0,.loop ; again",0);
        test_fields(&line,[".loop","dbf","","d0,.loop","; again"]);
        test_ordered(&line);
        let line = parse("  Depth: equ 3",0);
        assert_eq!(line.variable(),"Depth");
        assert_eq!(line.value(),"3");
    }
    #[test]
    fn indented_instruction_is_not_a_label() {
        let line = parse("    move.l (a0)+,d0",0);
        test_fields(&line,["","move","l","(a0)+,d0",""]);
        let line = parse("    dc.b \"a:b\"",0);
        test_fields(&line,["","dc","b","\"a:b\"",""]);
    }
    #[test]
    fn double_colon_label() {
        let line = parse("Foo:: rts",0);
        test_fields(&line,["Foo","rts","","",""]);
        test_ordered(&line);
        let line = parse("  Bar::",0);
        test_fields(&line,["Bar","","","",""]);
    }
    #[test]
    fn size_on_directive() {
        let line = parse("table\tdc.l\t$1000,$2000",0);
        test_fields(&line,["table","dc","l","$1000,$2000",""]);
    }
}

mod empty_fields {
    use super::*;
    #[test]
    fn blank_line() {
        let line = parse("   \t ",7);
        test_fields(&line,["","","","",""]);
        assert_eq!(line.kind(),LineKind::Empty);
        test_ordered(&line);
        assert_eq!(line.data_range().start.line,7);
    }
    #[test]
    fn zero_length() {
        let line = parse("",0);
        test_fields(&line,["","","","",""]);
        assert_eq!(line.kind(),LineKind::Empty);
    }
    #[test]
    fn empty_data_positioned_after_instruction() {
        let line = parse("  nop  ",0);
        assert_eq!(line.data(),"");
        assert_eq!(line.data_range().start.character,7);
        assert_eq!(line.size_range().start.character,5);
    }
    #[test]
    fn garbage_does_not_panic() {
        for raw in [":::",".",";",";;\"","\"unterminated ; x","\t=","é label ;ü","  .w"] {
            let line = parse(raw,0);
            test_ordered(&line);
        }
    }
}

mod comments {
    use super::*;
    #[test]
    fn semicolon_in_string() {
        let line = parse("  DC.B \"a;b\"",0);
        test_fields(&line,["","DC","B","\"a;b\"",""]);
    }
    #[test]
    fn semicolon_in_single_quotes() {
        let line = parse("msg dc.b 'x;y',0 ; text",0);
        test_fields(&line,["msg","dc","b","'x;y',0","; text"]);
    }
    #[test]
    fn whole_line_star() {
        let line = parse("* header comment",0);
        test_fields(&line,["","","","","* header comment"]);
        assert_eq!(line.kind(),LineKind::Comment);
    }
    #[test]
    fn indented_semicolon() {
        let line = parse("\t; indented",0);
        assert_eq!(line.comment(),"; indented");
        assert_eq!(line.kind(),LineKind::Comment);
    }
    #[test]
    fn star_in_empty_data_field() {
        let line = parse("    rts     * done",0);
        test_fields(&line,["","rts","","","* done"]);
    }
    #[test]
    fn star_as_operator() {
        let line = parse("    move.w #4*2,d0",0);
        test_fields(&line,["","move","w","#4*2,d0",""]);
        let line = parse("    lea    buf+4 * 2,a0",0);
        assert_eq!(line.data(),"buf+4 * 2,a0");
        assert_eq!(line.comment(),"");
    }
    #[test]
    fn star_after_label() {
        let line = parse("here * comment",0);
        test_fields(&line,["here","","","","* comment"]);
    }
}

mod assignments {
    use super::*;
    #[test]
    fn equ_with_label() {
        let line = parse("SCREEN_W equ 320 ; pixels",0);
        assert_eq!(line.kind(),LineKind::Assignment);
        assert_eq!(line.variable(),"SCREEN_W");
        assert_eq!(line.value(),"320");
    }
    #[test]
    fn equals_no_space() {
        let line = parse("Count=5",0);
        assert_eq!(line.variable(),"Count");
        assert_eq!(line.instruction(),"=");
        assert_eq!(line.value(),"5");
    }
    #[test]
    fn colon_then_set() {
        let line = parse("Depth: SET Depth+1",0);
        assert_eq!(line.variable(),"Depth");
        assert_eq!(line.value(),"Depth+1");
    }
    #[test]
    fn indented_equals() {
        let line = parse("  BAR = 7",2);
        assert_eq!(line.variable(),"BAR");
        assert_eq!(line.value(),"7");
        let rng = line.variable_range();
        assert_eq!((rng.start.line,rng.start.character,rng.end.character),(2,2,5));
    }
    #[test]
    fn indented_equ() {
        let line = parse("\tcolor0 equ $dff180",0);
        assert_eq!(line.variable(),"color0");
        assert_eq!(line.value(),"$dff180");
    }
    #[test]
    fn not_an_assignment() {
        let line = parse("    move.l d0,d1",0);
        assert_eq!(line.kind(),LineKind::Statement);
        assert_eq!(line.variable(),"");
        assert_eq!(line.value(),"");
    }
}
