//! San template tokenization.
//! The canonical parsing strategy should adhere to the spec below.
//! https://html.spec.whatwg.org/multipage/parsing.html#tokenization
//!
//! Text is never entity-decoded: both the SFC block scanner and the ANode
//! builder need the raw source slices.

use super::{
    error::{CompilationError, CompilationErrorKind as ErrorKind, ErrorHandler},
    Name, Position, SourceLocation,
};
use rustc_hash::FxHashSet;
#[cfg(feature = "serde")]
use serde::Serialize;
use std::{iter::FusedIterator, str::Chars};

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Attribute<'a> {
    pub name: Name<'a>,
    pub value: Option<&'a str>,
    /// from the first char of the name to the end of the value (quote included)
    pub location: SourceLocation,
}

/// Tag is used only for start tag since end tag is bare
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Tag<'a> {
    pub name: Name<'a>,
    pub attributes: Vec<Attribute<'a>>,
    pub self_closing: bool,
}

/// html token definition is tailored for convenience.
/// https://html.spec.whatwg.org/multipage/parsing.html#tokenization
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Token<'a> {
    StartTag(Tag<'a>),
    EndTag(Name<'a>), // with no attrs or self_closing flag
    Text(&'a str),    // merges chars to one str
    Comment(&'a str),
    Interpolation(&'a str), // San specific token, delimiters included
}

/// TextMode represents different text scanning strategy.
/// e.g. Scanning in script/textarea/div are different.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TextMode {
    //         | Elements | Interpolation | End sign              | Inside of
    // DATA    | ✔        | ✔             | End tags of ancestors |
    // RCDATA  | ✘        | ✔             | End tag of the parent | <textarea>
    // RAWTEXT | ✘        | ✘             | End tag of the parent | <style>,<script>
    Data,
    RcData,
    RawText,
}

/// TokenizeOption defined a list of methods used in scanning
#[derive(Clone)]
pub struct TokenizeOption {
    pub delimiters: (String, String),
    pub get_text_mode: fn(&str) -> TextMode,
}

impl Default for TokenizeOption {
    fn default() -> Self {
        Self {
            delimiters: ("{{".into(), "}}".into()),
            get_text_mode: |_| TextMode::Data,
        }
    }
}

/// This trait produces a compiler's current position and selects a range.
pub trait Locatable {
    /// Returns the tokenizer's current position in the source.
    fn current_position(&self) -> Position;
    /// Returns the position where the last yielded token starts.
    fn last_position(&self) -> Position;
    /// Returns the tokenizer's source location from the start position.
    fn get_location_from(&self, start: Position) -> SourceLocation;
}

pub struct Tokenizer {
    option: TokenizeOption,
    delimiter_first_char: Option<char>,
}

// builder methods
impl Tokenizer {
    pub fn new(option: TokenizeOption) -> Self {
        // an empty open delimiter disables interpolation scanning
        let delimiter_first_char = option.delimiters.0.chars().next();
        Self {
            option,
            delimiter_first_char,
        }
    }
    pub fn scan<'a, E>(&self, source: &'a str, err_handle: E) -> Tokens<'a, E>
    where
        E: ErrorHandler,
    {
        Tokens {
            source,
            err_handle,
            position: Default::default(),
            last_pos: Default::default(),
            mode: TextMode::Data,
            option: self.option.clone(),
            last_start_tag_name: None,
            delimiter_first_char: self.delimiter_first_char,
        }
    }
}

pub struct Tokens<'a, E: ErrorHandler> {
    source: &'a str,
    err_handle: E,
    position: Position,
    last_pos: Position,
    mode: TextMode,
    pub option: TokenizeOption,
    // following fields are implementation details

    //  appropriate end tag token needs last start tag, if any
    // https://html.spec.whatwg.org/multipage/parsing.html#appropriate-end-tag-token
    last_start_tag_name: Option<&'a str>,
    delimiter_first_char: Option<char>,
}

// scanning methods
// NB: When storing self.source to a name, prefer using a ref.
// because Rust ownership can help us to prevent invalid state.
// e.g. `let src = self.source` causes a stale src after [`move_by`].
// while `let src= &self.source` forbids any src usage after a mut call.
impl<'a, C: ErrorHandler> Tokens<'a, C> {
    // https://html.spec.whatwg.org/multipage/parsing.html#data-state
    fn scan_data(&mut self) -> Token<'a> {
        debug_assert!(self.mode == TextMode::Data);
        let index = match self.delimiter_first_char {
            Some(d) => self.source.find(&['<', d][..]),
            None => self.source.find('<'),
        };
        let i = match index {
            // no tag or interpolation found
            None => return self.scan_text(self.source.len()),
            Some(i) => i,
        };
        if i != 0 {
            return self.scan_text(i);
        }
        if self.starts_with_open_delimiter() {
            return self.scan_interpolation();
        }
        if !self.source.starts_with('<') {
            // a delimiter's first char that does not open an interpolation
            let skip = self.source.chars().next().map_or(1, char::len_utf8);
            let rest = &self.source[skip..];
            let next = match self.delimiter_first_char {
                Some(d) => rest.find(&['<', d][..]),
                None => rest.find('<'),
            };
            let len = next.map_or(self.source.len(), |n| n + skip);
            return self.scan_text(len);
        }
        self.scan_tag_open()
    }

    fn starts_with_open_delimiter(&self) -> bool {
        let open = &self.option.delimiters.0;
        !open.is_empty() && self.source.starts_with(open.as_str())
    }

    fn scan_text(&mut self, size: usize) -> Token<'a> {
        debug_assert!(matches!(self.mode, TextMode::Data | TextMode::RcData));
        Token::Text(self.move_by(size))
    }

    fn scan_interpolation(&mut self) -> Token<'a> {
        let (open, close) = &self.option.delimiters;
        debug_assert!(self.source.starts_with(open.as_str()));
        let index = self.source[open.len()..].find(close.as_str());
        let step = match index {
            Some(i) => open.len() + i + close.len(),
            None => {
                let src = self.move_by(self.source.len());
                self.emit_error(ErrorKind::MissingInterpolationEnd);
                return Token::Interpolation(src);
            }
        };
        Token::Interpolation(self.move_by(step))
    }

    // https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state
    fn scan_tag_open(&mut self) -> Token<'a> {
        // use a ref to &str to ensure source is always valid
        // that is, source cannot be used after move_by
        let source = &self.source;
        if source.starts_with("</") {
            self.scan_end_tag_open()
        } else if source.starts_with("<!") {
            self.scan_comment_and_like()
        } else if source.starts_with("<?") {
            self.emit_error(ErrorKind::UnexpectedQuestionMarkInsteadOfTagName);
            self.scan_bogus_comment()
        } else if source.len() == 1 {
            self.emit_error(ErrorKind::EofBeforeTagName);
            Token::Text(self.move_by(1))
        } else if !source[1..].starts_with(ascii_alpha) {
            // we can indeed merge this standalone < char into surrounding text
            // but optimization for error is not worth the candle
            self.emit_error(ErrorKind::InvalidFirstCharacterOfTagName);
            Token::Text(self.move_by(1))
        } else {
            self.scan_start_tag()
        }
    }

    // https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state
    fn scan_start_tag(&mut self) -> Token<'a> {
        debug_assert!(self.source.starts_with('<'));
        self.move_by(1);
        let tag = self.scan_tag_name();
        // https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text
        // Parsing algorithms are always invoked in response to a start tag token.
        if tag.self_closing {
            return Token::StartTag(tag);
        }
        let parsing_algorithm = self.option.get_text_mode;
        self.mode = parsing_algorithm(tag.name);
        if self.mode != TextMode::Data {
            self.last_start_tag_name.replace(tag.name);
        }
        Token::StartTag(tag)
    }
    fn scan_tag_name(&mut self) -> Tag<'a> {
        debug_assert!(self.source.starts_with(ascii_alpha));
        let l = scan_tag_name_length(self.source.chars());
        debug_assert!(l > 0);
        let name = self.move_by(l);
        let attributes = self.scan_attributes();
        let self_closing = if self.source.is_empty() {
            self.emit_error(ErrorKind::EofInTag);
            false
        } else {
            self.scan_close_start_tag()
        };
        Tag {
            name,
            attributes,
            self_closing,
        }
    }
    // https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state
    fn scan_attributes(&mut self) -> Vec<Attribute<'a>> {
        let mut attrs = vec![];
        let mut set = FxHashSet::default();
        loop {
            self.skip_whitespace();
            if self.is_about_to_close_tag() {
                return attrs;
            }
            if self.did_skip_slash_in_tag() {
                continue;
            }
            let attr = self.scan_attribute();
            if set.contains(attr.name) {
                // new attribute must be removed from the token.
                self.emit_error(ErrorKind::DuplicateAttribute);
                continue;
            }
            set.insert(attr.name);
            attrs.push(attr);
        }
    }
    // https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state
    fn scan_attribute(&mut self) -> Attribute<'a> {
        debug_assert!(!self.source.is_empty());
        let start = self.current_position();
        let name = self.scan_attr_name();
        let name_end = self.current_position();
        // 13.2.5.34 After attribute name state, ignore white spaces
        self.skip_whitespace();
        if self.is_about_to_close_tag()
            || self.did_skip_slash_in_tag()
            || !self.source.starts_with('=')
        {
            return Attribute {
                name,
                value: None,
                location: SourceLocation {
                    start,
                    end: name_end,
                },
            };
        }
        self.move_by(1); // equal sign
        let (value, end) = self.scan_attr_value();
        Attribute {
            name,
            value,
            location: SourceLocation { start, end },
        }
    }
    fn is_about_to_close_tag(&self) -> bool {
        let source = &self.source; // must get fresh source
        source.is_empty() || source.starts_with("/>") || source.starts_with('>')
    }
    fn did_skip_slash_in_tag(&mut self) -> bool {
        debug_assert!(!self.source.is_empty());
        if self.source.starts_with('/') {
            self.move_by(1);
            self.emit_error(ErrorKind::UnexpectedSolidusInTag);
            true
        } else {
            false
        }
    }
    // https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state
    fn scan_attr_name(&mut self) -> &'a str {
        debug_assert!(self.source.starts_with(is_valid_name_char));
        // case like <tag =="value"/>
        if self.source.starts_with('=') {
            let s = self.move_by(1);
            self.emit_error(ErrorKind::UnexpectedEqualsSignBeforeAttributeName);
            return s;
        }
        let len = self
            .source
            .find(|c| !semi_valid_attr_name(c))
            .unwrap_or(self.source.len());
        let src = self.move_by(len);
        if src.contains(&['<', '"', '\''][..]) {
            self.emit_error(ErrorKind::UnexpectedCharacterInAttributeName);
        }
        src
    }
    // https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state
    // returns the value and where it ends, before any trailing whitespace
    fn scan_attr_value(&mut self) -> (Option<&'a str>, Position) {
        let equal_end = self.current_position();
        self.skip_whitespace();
        if self.source.starts_with('>') {
            self.emit_error(ErrorKind::MissingAttributeValue);
            return (None, equal_end);
        }
        if self.source.starts_with('"') {
            let (val, end) = self.scan_quoted_attr_value('"');
            return (Some(val), end);
        }
        if self.source.starts_with('\'') {
            let (val, end) = self.scan_quoted_attr_value('\'');
            return (Some(val), end);
        }
        let val = self.scan_unquoted_attr_value();
        (val, self.current_position())
    }
    // https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state
    // https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state
    fn scan_quoted_attr_value(&mut self, quote: char) -> (&'a str, Position) {
        debug_assert!(self.source.starts_with(quote));
        self.move_by(1);
        let src = match self.source.find(quote) {
            Some(0) => {
                self.move_by(1);
                ""
            }
            Some(i) => {
                let val = self.move_by(i);
                self.move_by(1); // consume quote char
                val
            }
            None if self.source.is_empty() => "",
            None => self.move_by(self.source.len()),
        };
        let end = self.current_position();
        // https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state
        if !self.is_about_to_close_tag()
            && !self.did_skip_slash_in_tag()
            && self.skip_whitespace() == 0
        {
            self.emit_error(ErrorKind::MissingWhitespaceBetweenAttributes);
        }
        (src, end)
    }
    // https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state
    fn scan_unquoted_attr_value(&mut self) -> Option<&'a str> {
        let val_len = self
            .source
            .find(|c| !semi_valid_unquoted_attr_value(c))
            .unwrap_or(self.source.len());
        // unexpected EOF: <tag attr=
        if val_len == 0 {
            // whitespace or > is precluded in scan_attribute
            // so empty value must implies EOF
            debug_assert!(self.source.is_empty());
            return None;
        }
        let src = self.move_by(val_len);
        if src.contains(&['"', '\'', '<', '=', '`'][..]) {
            self.emit_error(ErrorKind::UnexpectedCharacterInUnquotedAttributeValue);
        }
        Some(src)
    }

    fn scan_close_start_tag(&mut self) -> bool {
        debug_assert!(!self.source.is_empty());
        if self.source.starts_with("/>") {
            self.move_by(2);
            true
        } else {
            debug_assert!(self.source.starts_with('>'));
            self.move_by(1);
            false
        }
    }
    // https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state
    fn scan_end_tag_open(&mut self) -> Token<'a> {
        debug_assert!(self.source.starts_with("</"));
        let source = &self.source;
        if source.len() == 2 {
            self.emit_error(ErrorKind::EofBeforeTagName);
            Token::Text(self.move_by(2))
        } else if source.starts_with("</>") {
            self.emit_error(ErrorKind::MissingEndTagName);
            self.move_by(3);
            Token::Comment("")
        } else if !self.source[2..].starts_with(ascii_alpha) {
            self.emit_error(ErrorKind::InvalidFirstCharacterOfTagName);
            self.scan_bogus_comment()
        } else {
            self.scan_end_tag()
        }
    }
    // errors emit here is defined at the top of the tokenization spec
    fn scan_end_tag(&mut self) -> Token<'a> {
        debug_assert!(self.source.starts_with("</"));
        self.move_by(2);
        // indeed in end tag collecting attributes is useless
        // but, no, I don't want to opt for ill-formed input
        let tag = self.scan_tag_name();
        // When an end tag token is emitted with attributes
        if !tag.attributes.is_empty() {
            self.emit_error(ErrorKind::EndTagWithAttributes);
        }
        // When an end tag token is emitted with its self-closing flag set
        if tag.self_closing {
            self.emit_error(ErrorKind::EndTagWithTrailingSolidus);
        }
        // reset text mode after tag close
        self.mode = TextMode::Data;
        Token::EndTag(tag.name)
    }

    // https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state
    fn scan_comment_and_like(&mut self) -> Token<'a> {
        let s = &self.source;
        if s.starts_with("<!--") {
            self.scan_comment()
        } else if s.starts_with("<!DOCTYPE") || s.starts_with("<!doctype") {
            self.scan_bogus_comment()
        } else if s.starts_with("<![CDATA[") {
            // templates are always in html namespace
            self.emit_error(ErrorKind::CDataInHtmlContent);
            self.scan_bogus_comment()
        } else {
            self.emit_error(ErrorKind::IncorrectlyOpenedComment);
            self.scan_bogus_comment()
        }
    }
    // https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state
    fn scan_comment(&mut self) -> Token<'a> {
        debug_assert!(self.source.starts_with("<!--"));
        let comment_text = self.scan_comment_text();
        if self.source.is_empty() {
            self.emit_error(ErrorKind::EofInComment);
        } else if self.source.starts_with("--!>") {
            self.emit_error(ErrorKind::IncorrectlyClosedComment);
            self.move_by(4);
        } else {
            debug_assert!(self.source.starts_with("-->"));
            self.move_by(3);
        };
        Token::Comment(comment_text)
    }
    fn scan_comment_text(&mut self) -> &'a str {
        debug_assert!(self.source.starts_with("<!--"));
        let comment_end = self.source.find("--!>").or_else(|| self.source.find("-->"));
        // NB: we take &str here since we will call move_by later
        let text = if let Some(end) = comment_end {
            debug_assert!(end >= 2, "first two chars must be <!");
            // <!---> or <!-->
            if end <= 3 {
                self.emit_error(ErrorKind::AbruptClosingOfEmptyComment);
                self.move_by(end);
                return "";
            }
            self.move_by(4); // skip <!--
            &self.source[..end - 4] // must be exclusive
        } else {
            // no closing comment
            self.move_by(4);
            self.source
        };

        // report nested comment error
        let mut s = text;
        while let Some(i) = s.find("<!--") {
            self.move_by(i + 4);
            // spec does not emit the NestedComment error when EOF is met
            // #13.2.5.49 Comment less-than sign bang dash dash state
            if !self.source.is_empty() {
                self.emit_error(ErrorKind::NestedComment);
            }
            s = &s[i + 4..];
        }
        // consume remaining comment
        if !s.is_empty() {
            self.move_by(s.len());
        }
        text
    }
    #[cold]
    #[inline(never)]
    fn scan_bogus_comment(&mut self) -> Token<'a> {
        let s = &self.source;
        let start = if s.starts_with("<?") { 1 } else { 2 };
        let text = if let Some(end) = s.find('>') {
            let t = &s[start..end];
            self.move_by(end + 1);
            t
        } else {
            let len = s.len();
            &self.move_by(len)[start..]
        };
        Token::Comment(text)
    }

    // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state
    fn scan_rawtext(&mut self) -> Token<'a> {
        debug_assert!(self.mode == TextMode::RawText);
        let end = self.find_appropriate_end();
        self.mode = TextMode::Data;
        if end == 0 {
            // empty body, the end tag follows immediately
            return self.scan_data();
        }
        Token::Text(self.move_by(end))
    }

    fn scan_rcdata(&mut self) -> Token<'a> {
        debug_assert!(self.mode == TextMode::RcData);
        if self.starts_with_open_delimiter() {
            return self.scan_interpolation();
        }
        let end = self.find_appropriate_end();
        if end == 0 {
            self.mode = TextMode::Data;
            return self.scan_data();
        }
        let delimiter = &self.option.delimiters.0;
        let interpolation_start = if delimiter.is_empty() {
            end
        } else {
            self.source.find(delimiter.as_str()).unwrap_or(end)
        };
        if interpolation_start < end {
            return self.scan_text(interpolation_start);
        }
        let ret = self.scan_text(end);
        self.mode = TextMode::Data;
        ret
    }

    /// find first </{last_start_tag_name}
    fn find_appropriate_end(&self) -> usize {
        let tag_name = match self.last_start_tag_name {
            Some(name) => name,
            None => return self.source.len(),
        };
        let len = tag_name.len();
        let source = self.source; // no mut self, need no &&str
        for (i, _) in source.match_indices("</") {
            //  match point     non letter separator
            //      ￬   </  style ￬
            let e = i + 2 + len;
            // emit text without error per spec
            if e > source.len() {
                break;
            }
            // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state
            let is_appropriate_end = source
                .get(i + 2..e)
                .map_or(false, |name| name.eq_ignore_ascii_case(tag_name));
            if is_appropriate_end && !source[e..].starts_with(is_valid_name_char) {
                // found!
                return i;
            }
        }
        source.len()
    }
}

// utility methods
impl<'a, C: ErrorHandler> Tokens<'a, C> {
    fn emit_error(&self, error_kind: ErrorKind) {
        let start = self.current_position();
        let loc = self.get_location_from(start);
        let err = CompilationError::new(error_kind).with_location(loc);
        self.err_handle.on_error(err);
    }

    /// move tokenizer's internal position forward and return &str
    /// tokenizer's line/column are also updated in the method
    /// NB: it only moves forward, not backward
    /// `advance_to` is a better name but it collides with iter
    fn move_by(&mut self, size: usize) -> &'a str {
        debug_assert!(size > 0, "tokenizer must move forward");
        let (consumed, rest) = self.source.split_at(size);
        self.source = rest;
        self.position.advance(consumed);
        consumed
    }

    fn skip_whitespace(&mut self) -> usize {
        let idx = self.source.find(non_whitespace);
        let len = idx.unwrap_or(self.source.len());
        if len != 0 {
            self.move_by(len);
        }
        len
    }
}

#[inline]
fn ascii_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

// `< ' "` are not valid but counted as semi valid
// to leniently recover from a parsing error
#[inline]
fn semi_valid_attr_name(c: char) -> bool {
    is_valid_name_char(c) && c != '='
}

// only whitespace and > terminates unquoted attr value
// other special char only emits error
#[inline]
fn semi_valid_unquoted_attr_value(c: char) -> bool {
    !c.is_ascii_whitespace() && c != '>'
}

#[inline]
fn is_valid_name_char(c: char) -> bool {
    !c.is_ascii_whitespace() && c != '/' && c != '>'
}

fn non_whitespace(c: char) -> bool {
    !c.is_ascii_whitespace()
}

// tag name should begin with [a-zA-Z]
// followed by chars except whitespace, / or >
fn scan_tag_name_length(mut chars: Chars<'_>) -> usize {
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    let l: usize = chars
        .take_while(|&c| is_valid_name_char(c))
        .map(char::len_utf8)
        .sum();
    l + 1
}

impl<'a, C: ErrorHandler> Iterator for Tokens<'a, C> {
    type Item = Token<'a>;
    // https://html.spec.whatwg.org/multipage/parsing.html#concept-frag-parse-context
    fn next(&mut self) -> Option<Self::Item> {
        if self.source.is_empty() {
            return None;
        }
        self.last_pos = self.current_position();
        Some(match self.mode {
            TextMode::Data => self.scan_data(),
            TextMode::RcData => self.scan_rcdata(),
            TextMode::RawText => self.scan_rawtext(),
        })
    }
}

// Builders require Tokens always yield None when exhausted.
impl<'a, C: ErrorHandler> FusedIterator for Tokens<'a, C> {}

impl<'a, C: ErrorHandler> Locatable for Tokens<'a, C> {
    fn current_position(&self) -> Position {
        self.position
    }
    fn last_position(&self) -> Position {
        debug_assert! {
            self.position.offset == 0 ||
            self.last_pos.offset < self.position.offset
        };
        self.last_pos
    }
    fn get_location_from(&self, start: Position) -> SourceLocation {
        let end = self.current_position();
        SourceLocation { start, end }
    }
}

pub trait TokenSource<'a>: FusedIterator<Item = Token<'a>> + Locatable {}
impl<'a, C> TokenSource<'a> for Tokens<'a, C> where C: ErrorHandler {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cast;
    use crate::error::{test::TestErrorHandler, VecErrorHandler};

    fn scan(s: &str) -> Vec<Token<'_>> {
        let tokenizer = Tokenizer::new(TokenizeOption::default());
        tokenizer.scan(s, TestErrorHandler).collect()
    }

    fn raw_text_mode(tag: &str) -> TextMode {
        match tag {
            "script" | "style" => TextMode::RawText,
            "textarea" => TextMode::RcData,
            _ => TextMode::Data,
        }
    }

    #[test]
    fn test_scan_attributes() {
        let tokens = scan(r#"<a test="value" b c='d'>...</a>"#);
        assert_eq!(tokens.len(), 3);
        let tag = cast!(&tokens[0], Token::StartTag);
        assert_eq!(tag.name, "a");
        let attrs: Vec<_> = tag.attributes.iter().map(|a| (a.name, a.value)).collect();
        assert_eq!(
            attrs,
            vec![("test", Some("value")), ("b", None), ("c", Some("d"))]
        );
        assert_eq!(tag.attributes[0].location.start.offset, 3);
        assert_eq!(tag.attributes[0].location.end.offset, 15);
        assert_eq!(tag.attributes[1].location.range(), 16..17);
        assert_eq!(tag.attributes[2].location.range(), 18..23);
        assert_eq!(cast!(&tokens[2], Token::EndTag), &"a");
    }

    #[test]
    fn test_attribute_span_stops_at_value() {
        let src = "<a x = 'y'   z=w  >";
        let tokens = scan(src);
        let tag = cast!(&tokens[0], Token::StartTag);
        let spans: Vec<_> = tag
            .attributes
            .iter()
            .map(|a| &src[a.location.range()])
            .collect();
        assert_eq!(spans, vec!["x = 'y'", "z=w"]);
    }

    #[test]
    fn test_scan_empty_quoted_value() {
        let tokens = scan(r#"<a b="">"#);
        let tag = cast!(&tokens[0], Token::StartTag);
        assert_eq!(tag.attributes[0].value, Some(""));
    }

    #[test]
    fn test_scan_interpolation() {
        let tokens = scan("Hello {{name}}!");
        assert_eq!(cast!(&tokens[0], Token::Text), &"Hello ");
        assert_eq!(cast!(&tokens[1], Token::Interpolation), &"{{name}}");
        assert_eq!(cast!(&tokens[2], Token::Text), &"!");
    }

    #[test]
    fn test_custom_delimiters() {
        let tokenizer = Tokenizer::new(TokenizeOption {
            delimiters: ("${".into(), "}".into()),
            ..Default::default()
        });
        let tokens: Vec<_> = tokenizer.scan("a ${b} $c", TestErrorHandler).collect();
        assert_eq!(cast!(&tokens[1], Token::Interpolation), &"${b}");
        let rest: String = tokens[2..]
            .iter()
            .map(|t| *cast!(t, Token::Text))
            .collect();
        assert_eq!(rest, " $c");
    }

    #[test]
    fn test_raw_text_stops_at_first_end_tag() {
        let tokenizer = Tokenizer::new(TokenizeOption {
            get_text_mode: raw_text_mode,
            ..Default::default()
        });
        let src = "<script>var a = '<div>';</script><p></p>";
        let tokens: Vec<_> = tokenizer.scan(src, TestErrorHandler).collect();
        assert_eq!(cast!(&tokens[1], Token::Text), &"var a = '<div>';");
        assert_eq!(cast!(&tokens[2], Token::EndTag), &"script");
        assert_eq!(cast!(&tokens[3], Token::StartTag).name, "p");
    }

    #[test]
    fn test_raw_text_empty_body() {
        let tokenizer = Tokenizer::new(TokenizeOption {
            get_text_mode: raw_text_mode,
            ..Default::default()
        });
        let tokens: Vec<_> = tokenizer
            .scan("<style></style>", TestErrorHandler)
            .collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(cast!(&tokens[1], Token::EndTag), &"style");
    }

    #[test]
    fn test_duplicate_attribute_error() {
        let eh = VecErrorHandler::default();
        let tokenizer = Tokenizer::new(TokenizeOption::default());
        let _: Vec<_> = tokenizer.scan(r#"<a b="1" b="2">"#, eh.clone()).collect();
        let errors = eh.take_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::DuplicateAttribute);
    }

    #[test]
    fn test_positions() {
        let tokenizer = Tokenizer::new(TokenizeOption::default());
        let mut tokens = tokenizer.scan("\n  <b>x</b>", TestErrorHandler);
        tokens.next();
        tokens.next();
        let start = tokens.last_position();
        assert_eq!((start.offset, start.line, start.column), (3, 2, 3));
        let end = tokens.current_position();
        assert_eq!((end.offset, end.line, end.column), (6, 2, 6));
    }
}
