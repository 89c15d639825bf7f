//! Template front end for San components: tokenizer, ANode tree and APack.
//!
//! This crate is the template-AST utility used by `san-compiler-sfc` when a
//! template is compiled ahead of time.

use std::ops::Range;

#[cfg(feature = "serde")]
use serde::Serialize;

pub mod anode;
pub mod error;
pub mod pack;
pub mod tokenizer;
pub mod util;

pub use anode::{
    parse_component_template, parse_template, ANode, ComponentTemplate, SanTemplateAst,
    TemplateAst, TemplateOption, TrimWhitespace,
};
pub use pack::{pack, APack, PackItem};

// use plain &str here for now
pub type Name<'a> = &'a str;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Position {
    /// the 0-indexed byte offset in the source str
    pub offset: usize,
    /// the 1-indexed line number in the source code
    pub line: usize,
    /// the 1-indexed column number in the source code, counted in chars
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Position {
    /// Moves the position over `consumed`, which must be the text
    /// immediately following the current offset.
    pub fn advance(&mut self, consumed: &str) {
        self.offset += consumed.len();
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

#[derive(Default, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset <= self.end.offset
    }
    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }
}

impl From<SourceLocation> for Range<usize> {
    fn from(location: SourceLocation) -> Self {
        location.range()
    }
}

#[cfg(test)]
#[macro_export]
macro_rules! cast {
    ($target: expr, $pat: path) => {{
        if let $pat(a) = $target {
            a
        } else {
            panic!("mismatch variant when cast to {}", stringify!($pat));
        }
    }};
}
