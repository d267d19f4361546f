//! Line parser
//!
//! Splits a single line of 68000 source into fields.  The parser is total: any input,
//! however malformed, produces a `ParsedLine`, at worst with every field empty.
//! Lines are independent, nothing is carried from one line to the next.
//!
//! Field layout, left to right:
//!
//! ```text
//! label:  move.w  d0,d1   ; comment
//! |---|   |--| |  |---|   |-------|
//! label   inst size data  comment
//! ```
//!
//! Every field has a span even when it is absent.  An absent field is an empty span placed
//! where the field would have started, so that callers can always position a completion.
//! Spans are byte offsets into the line and never overlap.

use lsp_types as lsp;
use super::EQUATE_OPS;
use crate::lang::lsp_range;

/// size suffix letters that can follow a `.`
const SIZE_LETTERS: [u8;8] = [b'b',b'w',b'l',b's',b'd',b'x',b'p',b'q'];

/// Half open span of bytes within a line
#[derive(Clone,Copy,Debug,PartialEq,Default)]
pub struct Span {
    pub start: usize,
    pub end: usize
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub enum LineKind {
    /// nothing but whitespace
    Empty,
    /// a comment and nothing else
    Comment,
    /// a symbol is assigned a value
    Assignment,
    /// anything else, label only lines included
    Statement
}

/// Fields of one line of source, borrowing the line text.
#[derive(Clone,Debug)]
pub struct ParsedLine<'a> {
    raw: &'a str,
    row: u32,
    label: Span,
    instruction: Span,
    size: Span,
    data: Span,
    comment: Span,
    variable: Span,
    value: Span
}

impl Span {
    fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
    fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

pub(crate) fn is_size_letter(c: u8) -> bool {
    SIZE_LETTERS.contains(&c.to_ascii_lowercase())
}

fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\r' || b == b'\n'
}

fn skip_ws(b: &[u8], mut pos: usize) -> usize {
    while pos < b.len() && is_ws(b[pos]) {
        pos += 1;
    }
    pos
}

/// Does a size suffix such as `.w` start at `pos`.  The suffix must be a single
/// letter followed by a delimiter, so that `.bar` is not mistaken for a size.
fn size_suffix_at(b: &[u8], pos: usize) -> bool {
    if pos + 1 >= b.len() || b[pos] != b'.' {
        return false;
    }
    if !is_size_letter(b[pos+1]) {
        return false;
    }
    pos + 2 == b.len() || is_ws(b[pos+2]) || b[pos+2] == b':' || b[pos+2] == b';'
}

/// Find the start of a comment at or after `start`, honoring quotes.
/// Only `;` is considered, `*` in the middle of data is an operator or the location counter.
fn find_comment(b: &[u8], start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for i in start..b.len() {
        match (quote,b[i]) {
            (Some(q),c) if c == q => quote = None,
            (Some(_),_) => {},
            (None,b'"') | (None,b'\'') => quote = Some(b[i]),
            (None,b';') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Step over the `:` or `::` that ends a label
fn skip_colons(b: &[u8], mut pos: usize) -> usize {
    for _ in 0..2 {
        if pos < b.len() && b[pos] == b':' {
            pos += 1;
        }
    }
    pos
}

/// End of an indented label such as `    Start:`.  Without the colon the first
/// token of an indented line is the instruction.
fn indented_label_end(b: &[u8], first: usize) -> Option<usize> {
    let mut end = first;
    while end < b.len() && !is_ws(b[end]) && b[end] != b':' && b[end] != b'=' && b[end] != b';' {
        end += 1;
    }
    match end > first && end < b.len() && b[end] == b':' {
        true => Some(end),
        false => None
    }
}

fn trim_end(b: &[u8], start: usize, mut end: usize) -> usize {
    while end > start && is_ws(b[end-1]) {
        end -= 1;
    }
    end
}

/// Parse one line.  `row` is the 0-based line index used to form ranges.
pub fn parse(raw: &str, row: u32) -> ParsedLine<'_> {
    let b = raw.as_bytes();
    let n = b.len();
    let mut ans = ParsedLine {
        raw,
        row,
        label: Span::empty(0),
        instruction: Span::empty(n),
        size: Span::empty(n),
        data: Span::empty(n),
        comment: Span::empty(n),
        variable: Span::empty(0),
        value: Span::empty(n)
    };
    let first = skip_ws(b,0);
    if first == n {
        log::trace!("{}: empty line",row);
        return ans;
    }
    if b[first] == b';' || b[first] == b'*' {
        ans.instruction = Span::empty(first);
        ans.size = Span::empty(first);
        ans.data = Span::empty(first);
        ans.comment = Span::new(first,n);
        return ans;
    }

    // label, in column 0 or indented with a colon
    let mut pos = 0;
    if first == 0 {
        let mut end = 0;
        while end < n && !is_ws(b[end]) && b[end] != b':' && b[end] != b'=' && b[end] != b';' {
            if end > 0 && size_suffix_at(b,end) {
                break;
            }
            end += 1;
        }
        ans.label = Span::new(0,end);
        pos = end;
        if size_suffix_at(b,pos) {
            pos += 2;
        }
        pos = skip_colons(b,pos);
    } else if let Some(end) = indented_label_end(b,first) {
        ans.label = Span::new(first,end);
        pos = skip_colons(b,end);
    }

    // instruction and size
    pos = skip_ws(b,pos);
    ans.instruction = Span::empty(pos);
    ans.size = Span::empty(pos);
    if pos < n && (b[pos] == b';' || b[pos] == b'*') {
        ans.data = Span::empty(pos);
        ans.comment = Span::new(pos,n);
        return ans.finish();
    }
    if pos < n && b[pos] == b'=' {
        ans.instruction = Span::new(pos,pos+1);
        ans.size = Span::empty(pos+1);
        pos += 1;
    } else if pos < n {
        let start = pos;
        while pos < n && !is_ws(b[pos]) && b[pos] != b';' && b[pos] != b'=' {
            pos += 1;
        }
        match b[start+1..pos].iter().position(|c| *c == b'.') {
            Some(rel) => {
                let dot = start + 1 + rel;
                ans.instruction = Span::new(start,dot);
                ans.size = Span::new(dot+1,pos);
            },
            None => {
                ans.instruction = Span::new(start,pos);
                ans.size = Span::empty(pos);
            }
        }
    }

    // data and comment
    pos = skip_ws(b,pos);
    ans.data = Span::empty(pos);
    if pos < n && (b[pos] == b';' || b[pos] == b'*') {
        ans.comment = Span::new(pos,n);
        return ans.finish();
    }
    match find_comment(b,pos) {
        Some(c) => {
            ans.data = Span::new(pos,trim_end(b,pos,c));
            ans.comment = Span::new(c,n);
        },
        None => {
            ans.data = Span::new(pos,trim_end(b,pos,n));
        }
    }
    ans.finish()
}

impl<'a> ParsedLine<'a> {
    /// Look for an assignment once the fields are split.
    fn finish(mut self) -> Self {
        self.value = Span::empty(self.data.start);
        self.variable = Span::empty(self.label.start);
        let op = self.instruction().to_lowercase();
        if self.label.len() > 0 && self.instruction.len() > 0 && EQUATE_OPS.contains(&op.as_str()) {
            // LABEL equ value
            self.variable = self.label;
            self.value = self.data;
            return self;
        }
        if self.label.len() > 0 || self.instruction.len() == 0 {
            return self;
        }
        // indented forms, `NAME = value` or `NAME equ value`
        let raw = self.raw;
        let b = raw.as_bytes();
        let d = self.data;
        let after_keyword = if d.len() > 0 && b[d.start] == b'=' {
            Some(d.start + 1)
        } else {
            let mut end = d.start;
            while end < d.end && !is_ws(b[end]) {
                end += 1;
            }
            let word = raw[d.start..end].to_lowercase();
            match word.len() > 0 && word != "=" && EQUATE_OPS.contains(&word.as_str()) {
                true => Some(end),
                false => None
            }
        };
        if let Some(start) = after_keyword {
            let start = skip_ws(b,start).min(d.end);
            self.variable = Span::new(self.instruction.start,self.size.end.max(self.instruction.end));
            self.value = Span::new(start,d.end);
        }
        self
    }
    fn text(&self, span: &Span) -> &'a str {
        match self.raw.get(span.start..span.end) {
            Some(s) => s,
            None => ""
        }
    }
    fn range(&self, span: &Span) -> lsp::Range {
        lsp_range(self.row,span.start,span.end)
    }
    pub fn raw(&self) -> &'a str {
        self.raw
    }
    pub fn row(&self) -> u32 {
        self.row
    }
    pub fn kind(&self) -> LineKind {
        if self.variable.len() > 0 {
            LineKind::Assignment
        } else if self.label.len() > 0 || self.instruction.len() > 0 {
            LineKind::Statement
        } else if self.comment.len() > 0 {
            LineKind::Comment
        } else {
            LineKind::Empty
        }
    }
    /// Range of the whole line
    pub fn line_range(&self) -> lsp::Range {
        lsp_range(self.row,0,self.raw.len())
    }
    /// label as written, without the trailing `:`
    pub fn label(&self) -> &'a str {
        self.text(&self.label)
    }
    pub fn label_range(&self) -> lsp::Range {
        self.range(&self.label)
    }
    /// instruction, directive, or macro name, without size
    pub fn instruction(&self) -> &'a str {
        self.text(&self.instruction)
    }
    pub fn instruction_range(&self) -> lsp::Range {
        self.range(&self.instruction)
    }
    /// size suffix without the `.`, e.g. `w`
    pub fn size(&self) -> &'a str {
        self.text(&self.size)
    }
    pub fn size_range(&self) -> lsp::Range {
        self.range(&self.size)
    }
    /// operands or directive arguments, trailing whitespace removed
    pub fn data(&self) -> &'a str {
        self.text(&self.data)
    }
    pub fn data_range(&self) -> lsp::Range {
        self.range(&self.data)
    }
    pub fn data_span(&self) -> Span {
        self.data
    }
    /// comment including its `;` or `*`
    pub fn comment(&self) -> &'a str {
        self.text(&self.comment)
    }
    pub fn comment_range(&self) -> lsp::Range {
        self.range(&self.comment)
    }
    /// name being assigned, empty unless this is an assignment
    pub fn variable(&self) -> &'a str {
        self.text(&self.variable)
    }
    pub fn variable_range(&self) -> lsp::Range {
        self.range(&self.variable)
    }
    /// right hand side of an assignment
    pub fn value(&self) -> &'a str {
        self.text(&self.value)
    }
    pub fn value_range(&self) -> lsp::Range {
        self.range(&self.value)
    }
    /// Spans in order: label, instruction, size, data, comment
    pub fn spans(&self) -> [Span;5] {
        [self.label,self.instruction,self.size,self.data,self.comment]
    }
}
