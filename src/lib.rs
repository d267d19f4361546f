//! # `m68kit` main library
//!
//! This library analyzes Motorola 68000 assembly sources, with emphasis on the dialect
//! accepted by the Amiga assemblers (Devpac, vasm, AsmOne).
//! It is meant to sit underneath an editor integration, which supplies the documents and
//! consumes completions, hovers, and definitions.
//!
//! ## Architecture
//!
//! Analysis is layered, leaf-first:
//! * `lang::m68k::parser` splits one line into label, instruction, size, data, and comment fields
//! * `lang::m68k::symbol_file` accumulates the symbols of one file in a single pass
//! * `lang::m68k::subroutines` attributes labels to the subroutine that contains them
//! * `lang::m68k::registry` caches the most recent `SymbolFile` for every known file
//! * `lang::m68k::resolver` searches the cached files for symbols starting with a prefix
//! * `lang::m68k::query` is the interface consumed by the editor layer
//!
//! File system access is abstracted by `lang::files::FileAccess`, so that the same analysis
//! can run on the host file system, or on unsaved documents held by an editor.

pub mod lang;

type DYNERR = Box<dyn std::error::Error>;
