//! ANode: the intermediate tree of a San template.
//!
//! The tree keeps expressions as raw source strings. Interpolations are
//! split into expression and filters, `s-for` is split into its parts, and
//! everything else is left for the runtime to evaluate.

use super::{
    error::{CompilationError, CompilationErrorKind as ErrorKind, ErrorHandler, VecErrorHandler},
    pack::{pack, APack},
    tokenizer::{Attribute, Locatable, Tag, TextMode, Token, TokenizeOption, Tokenizer},
    util::{is_all_whitespace, is_void_tag, split_filters, strip_delimiters},
    Position, SourceLocation,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TrimWhitespace {
    /// keep every text node
    None,
    /// drop whitespace-only text nodes
    Blank,
    /// drop whitespace-only text nodes and trim the others
    All,
}

impl Default for TrimWhitespace {
    fn default() -> Self {
        TrimWhitespace::None
    }
}

#[derive(Debug, Clone)]
pub struct TemplateOption {
    pub trim_whitespace: TrimWhitespace,
    pub delimiters: (String, String),
}

impl Default for TemplateOption {
    fn default() -> Self {
        Self {
            trim_whitespace: TrimWhitespace::None,
            delimiters: ("{{".into(), "}}".into()),
        }
    }
}

/// The configuration surface of a component handed to
/// [`parse_component_template`]. Built per call, never shared.
#[derive(Debug, Clone, Copy)]
pub struct ComponentTemplate<'a> {
    pub template: &'a str,
    pub trim_whitespace: TrimWhitespace,
    pub delimiters: (&'a str, &'a str),
    pub auto_fill_style_and_id: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum Expr {
    String { value: String },
    Bool { value: bool },
    Interp { expr: String, filters: Vec<String> },
    Text { segs: Vec<Expr> },
    Raw { code: String },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AProp {
    pub name: String,
    pub expr: Expr,
    /// the prop merges with the value passed by the parent component
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "is_false"))]
    pub x: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AEvent {
    pub name: String,
    pub expr: Expr,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct ADirective {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub value: Option<Expr>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub item: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub index: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub track_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct ANode {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub tag_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub text_expr: Option<Expr>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub props: Vec<AProp>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub events: Vec<AEvent>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "BTreeMap::is_empty"))]
    pub directives: BTreeMap<String, ADirective>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<ANode>,
}

#[cfg(feature = "serde")]
fn is_false(b: &bool) -> bool {
    !*b
}

impl ANode {
    pub fn element(tag_name: &str) -> Self {
        Self {
            tag_name: Some(tag_name.to_owned()),
            ..Default::default()
        }
    }
    pub fn text(expr: Expr) -> Self {
        Self {
            text_expr: Some(expr),
            ..Default::default()
        }
    }
    pub fn is_text(&self) -> bool {
        self.text_expr.is_some()
    }
    pub fn prop(&self, name: &str) -> Option<&AProp> {
        self.props.iter().find(|p| p.name == name)
    }
    fn is_blank_text(&self) -> bool {
        matches!(&self.text_expr, Some(Expr::String { value }) if is_all_whitespace(value))
    }
}

/// The contract the SFC extractor relies on to compile a template ahead.
pub trait TemplateAst {
    /// Parses the template of a component and returns the component's root
    /// element, with class/style/id filled when requested.
    fn parse_component_template(
        &self,
        component: &ComponentTemplate<'_>,
    ) -> Result<ANode, CompilationError>;
    /// Parses raw markup with default options and returns a root node
    /// holding the top level nodes as children.
    fn parse_template(&self, source: &str) -> Result<ANode, CompilationError>;
    fn pack(&self, node: &ANode) -> APack;
}

/// Default [`TemplateAst`]: any template error fails the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanTemplateAst;

impl TemplateAst for SanTemplateAst {
    fn parse_component_template(
        &self,
        component: &ComponentTemplate<'_>,
    ) -> Result<ANode, CompilationError> {
        let eh = VecErrorHandler::default();
        let node = parse_component_template(component, eh.clone());
        first_error(eh).map_or(Ok(node), Err)
    }
    fn parse_template(&self, source: &str) -> Result<ANode, CompilationError> {
        let eh = VecErrorHandler::default();
        let node = parse_template(source, &TemplateOption::default(), eh.clone());
        first_error(eh).map_or(Ok(node), Err)
    }
    fn pack(&self, node: &ANode) -> APack {
        pack(node)
    }
}

fn first_error(eh: VecErrorHandler) -> Option<CompilationError> {
    eh.take_errors().into_iter().next()
}

// props filled on a component root so the parent can pass them down
const AUTO_FILL_PROPS: [(&str, Option<&str>); 3] = [
    ("class", Some("_xclass")),
    ("style", Some("_xstyle")),
    ("id", None),
];

fn get_text_mode(tag: &str) -> TextMode {
    match tag {
        "script" | "style" => TextMode::RawText,
        "textarea" => TextMode::RcData,
        _ => TextMode::Data,
    }
}

pub fn parse_template<E: ErrorHandler>(source: &str, option: &TemplateOption, eh: E) -> ANode {
    let tokenizer = Tokenizer::new(TokenizeOption {
        delimiters: option.delimiters.clone(),
        get_text_mode,
    });
    let tokens = tokenizer.scan(source, eh.clone());
    let mut children = TreeBuilder {
        tokens,
        err_handle: eh,
        option,
        open_elems: vec![],
        root_children: vec![],
        pending_text: vec![],
    }
    .build();
    // whitespace around the top level nodes is never significant
    while children.first().map_or(false, ANode::is_blank_text) {
        children.remove(0);
    }
    while children.last().map_or(false, ANode::is_blank_text) {
        children.pop();
    }
    ANode {
        children,
        ..Default::default()
    }
}

pub fn parse_component_template<E: ErrorHandler>(component: &ComponentTemplate<'_>, eh: E) -> ANode {
    let option = TemplateOption {
        trim_whitespace: component.trim_whitespace,
        delimiters: (
            component.delimiters.0.to_owned(),
            component.delimiters.1.to_owned(),
        ),
    };
    let root = parse_template(component.template, &option, eh);
    if root.children.len() > 1 {
        log::warn!(
            "component template should have exactly one root element, found {} nodes",
            root.children.len()
        );
    }
    let mut node = match root.children.into_iter().next() {
        Some(first) if !first.is_text() => first,
        _ => ANode::element("div"),
    };
    if node.tag_name.as_deref() == Some("template") {
        node.tag_name = None;
    }
    if component.auto_fill_style_and_id {
        fill_style_and_id(&mut node);
    }
    node
}

fn fill_style_and_id(node: &mut ANode) {
    for &(name, filter) in AUTO_FILL_PROPS.iter() {
        if let Some(prop) = node.props.iter_mut().find(|p| p.name == name) {
            prop.x = true;
            continue;
        }
        node.props.push(AProp {
            name: name.to_owned(),
            expr: Expr::Interp {
                expr: name.to_owned(),
                filters: filter.map(str::to_owned).into_iter().collect(),
            },
            x: false,
        });
    }
}

enum TextPiece<'a> {
    Text(&'a str),
    Interp(&'a str),
}

struct OpenElement<'a> {
    name: &'a str,
    node: ANode,
    start: Position,
}

struct TreeBuilder<'a, 'o, Ts, Eh>
where
    Ts: Iterator<Item = Token<'a>> + Locatable,
    Eh: ErrorHandler,
{
    tokens: Ts,
    err_handle: Eh,
    option: &'o TemplateOption,
    open_elems: Vec<OpenElement<'a>>,
    root_children: Vec<ANode>,
    pending_text: Vec<TextPiece<'a>>,
}

impl<'a, 'o, Ts, Eh> TreeBuilder<'a, 'o, Ts, Eh>
where
    Ts: Iterator<Item = Token<'a>> + Locatable,
    Eh: ErrorHandler,
{
    fn build(mut self) -> Vec<ANode> {
        while let Some(token) = self.tokens.next() {
            match token {
                Token::StartTag(tag) => {
                    self.flush_text();
                    self.open_element(tag);
                }
                Token::EndTag(name) => {
                    self.flush_text();
                    self.close_element(name);
                }
                Token::Text(text) => self.pending_text.push(TextPiece::Text(text)),
                Token::Interpolation(src) => self.pending_text.push(TextPiece::Interp(src)),
                // comments never reach the runtime
                Token::Comment(_) => {}
            }
        }
        self.flush_text();
        while let Some(elem) = self.open_elems.pop() {
            self.emit_error(ErrorKind::MissingEndTag, elem.start);
            self.append(elem.node, elem.start);
        }
        self.root_children
    }

    fn children(&mut self) -> &mut Vec<ANode> {
        match self.open_elems.last_mut() {
            Some(elem) => &mut elem.node.children,
            None => &mut self.root_children,
        }
    }

    fn append(&mut self, node: ANode, start: Position) {
        let is_else = node.directives.contains_key("else") || node.directives.contains_key("elif");
        if is_else {
            let has_if = self
                .children()
                .iter()
                .rev()
                .find(|n| !n.is_blank_text())
                .map_or(false, |n| {
                    n.directives.contains_key("if") || n.directives.contains_key("elif")
                });
            if !has_if {
                self.emit_error(ErrorKind::SElseNoAdjacentIf, start);
            }
        }
        self.children().push(node);
    }

    fn open_element(&mut self, tag: Tag<'a>) {
        let start = self.tokens.last_position();
        let node = self.convert_element(&tag);
        if tag.self_closing || is_void_tag(&tag.name.to_ascii_lowercase()) {
            self.append(node, start);
        } else {
            self.open_elems.push(OpenElement {
                name: tag.name,
                node,
                start,
            });
        }
    }

    fn close_element(&mut self, name: &str) {
        let found = self
            .open_elems
            .iter()
            .rposition(|e| e.name.eq_ignore_ascii_case(name));
        let index = match found {
            Some(i) => i,
            None => {
                let start = self.tokens.last_position();
                self.emit_error(ErrorKind::InvalidEndTag, start);
                return;
            }
        };
        while self.open_elems.len() > index {
            let elem = match self.open_elems.pop() {
                Some(elem) => elem,
                None => break,
            };
            if self.open_elems.len() > index {
                self.emit_error(ErrorKind::MissingEndTag, elem.start);
            }
            self.append(elem.node, elem.start);
        }
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let mut pieces = std::mem::take(&mut self.pending_text);
        let blank = pieces.iter().all(|p| match p {
            TextPiece::Text(t) => is_all_whitespace(t),
            TextPiece::Interp(_) => false,
        });
        let trim = self.option.trim_whitespace;
        if blank && trim != TrimWhitespace::None {
            return;
        }
        if trim == TrimWhitespace::All {
            if let Some(TextPiece::Text(t)) = pieces.first_mut() {
                *t = t.trim_start();
            }
            if let Some(TextPiece::Text(t)) = pieces.last_mut() {
                *t = t.trim_end();
            }
        }
        let expr = build_text_expr(pieces, &self.option.delimiters);
        let start = self.tokens.last_position();
        self.append(ANode::text(expr), start);
    }

    fn convert_element(&mut self, tag: &Tag<'a>) -> ANode {
        let mut node = ANode::element(tag.name);
        for attr in &tag.attributes {
            if let Some(dir) = attr.name.strip_prefix("s-") {
                let directive = self.convert_directive(dir, attr);
                node.directives.insert(dir.to_owned(), directive);
            } else if let Some(event) = attr.name.strip_prefix("on-") {
                node.events.push(convert_event(event, attr.value.unwrap_or("")));
            } else {
                let expr = match attr.value {
                    None => Expr::Bool { value: true },
                    Some(v) => parse_text(v, &self.option.delimiters),
                };
                node.props.push(AProp {
                    name: attr.name.to_owned(),
                    expr,
                    x: false,
                });
            }
        }
        node
    }

    fn convert_directive(&mut self, name: &str, attr: &Attribute<'a>) -> ADirective {
        let value = attr.value.map(str::trim).filter(|v| !v.is_empty());
        match (name, value) {
            ("for", Some(v)) => parse_for(v).unwrap_or_else(|| {
                self.emit_error_at(ErrorKind::SForMalformedExpression, attr.location);
                ADirective::default()
            }),
            ("for", None) => {
                self.emit_error_at(ErrorKind::SForNoExpression, attr.location);
                ADirective::default()
            }
            ("if", None) | ("elif", None) => {
                self.emit_error_at(ErrorKind::SIfNoExpression, attr.location);
                ADirective::default()
            }
            (_, value) => ADirective {
                value: value.map(|v| Expr::Raw { code: v.to_owned() }),
                ..Default::default()
            },
        }
    }

    fn emit_error(&self, kind: ErrorKind, start: Position) {
        let location = self.tokens.get_location_from(start);
        self.emit_error_at(kind, location);
    }

    fn emit_error_at(&self, kind: ErrorKind, location: SourceLocation) {
        let err = CompilationError::new(kind).with_location(location);
        self.err_handle.on_error(err);
    }
}

// on-click="native:handler($event)"
fn convert_event(name: &str, value: &str) -> AEvent {
    let mut modifiers = vec![];
    let mut code = value.trim();
    for modifier in ["native", "capture"].iter() {
        if let Some(rest) = code.strip_prefix(modifier).and_then(|r| r.strip_prefix(':')) {
            modifiers.push((*modifier).to_owned());
            code = rest.trim_start();
        }
    }
    AEvent {
        name: name.to_owned(),
        expr: Expr::Raw {
            code: code.to_owned(),
        },
        modifiers,
    }
}

// item, index in list trackBy item.id
fn parse_for(value: &str) -> Option<ADirective> {
    let (lhs, rhs) = value.split_once(" in ")?;
    let (list, track_by) = match rhs.split_once(" trackBy ") {
        Some((list, track)) => (list.trim(), Some(track.trim().to_owned())),
        None => (rhs.trim(), None),
    };
    let (item, index) = match lhs.split_once(',') {
        Some((item, index)) => (item.trim(), Some(index.trim())),
        None => (lhs.trim(), None),
    };
    let is_ident = |s: &str| {
        !s.is_empty()
            && !s.starts_with(|c: char| c.is_ascii_digit())
            && s.chars().all(|c| c == '$' || c == '_' || c.is_alphanumeric())
    };
    if !is_ident(item) || !index.map_or(true, is_ident) || list.is_empty() {
        return None;
    }
    Some(ADirective {
        value: Some(Expr::Raw {
            code: list.to_owned(),
        }),
        item: Some(item.to_owned()),
        index: index.map(str::to_owned),
        track_by,
    })
}

/// Splits an attribute value into text and interpolation pieces.
fn parse_text(text: &str, delimiters: &(String, String)) -> Expr {
    let (open, close) = (delimiters.0.as_str(), delimiters.1.as_str());
    let mut pieces = vec![];
    let mut rest = text;
    while let Some(i) = (!open.is_empty()).then(|| rest.find(open)).flatten() {
        if i > 0 {
            pieces.push(TextPiece::Text(&rest[..i]));
        }
        let end = rest[i + open.len()..]
            .find(close)
            .map_or(rest.len(), |e| i + open.len() + e + close.len());
        pieces.push(TextPiece::Interp(&rest[i..end]));
        rest = &rest[end..];
    }
    if !rest.is_empty() || pieces.is_empty() {
        pieces.push(TextPiece::Text(rest));
    }
    build_text_expr(pieces, delimiters)
}

fn build_text_expr(pieces: Vec<TextPiece<'_>>, delimiters: &(String, String)) -> Expr {
    let mut segs: Vec<Expr> = vec![];
    for piece in pieces {
        match piece {
            TextPiece::Text("") => {}
            TextPiece::Text(t) => match segs.last_mut() {
                Some(Expr::String { value }) => value.push_str(t),
                _ => segs.push(Expr::String {
                    value: t.to_owned(),
                }),
            },
            TextPiece::Interp(src) => {
                let inner = strip_delimiters(src, delimiters);
                let mut parts = split_filters(inner).into_iter();
                let expr = parts.next().unwrap_or_default();
                segs.push(Expr::Interp {
                    expr,
                    filters: parts.collect(),
                });
            }
        }
    }
    match segs.len() {
        0 => Expr::String {
            value: String::new(),
        },
        1 => segs.remove(0),
        _ => Expr::Text { segs },
    }
}
