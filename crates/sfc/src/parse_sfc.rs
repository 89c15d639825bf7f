use crate::descriptor::{
    BlockAttr, BlockKind, BlockKinds, BlockRecord, Descriptor, DocNode, Document,
};
use crate::error::{SfcError, SfcResult};
use compiler::{
    error::VecErrorHandler,
    tokenizer::{Locatable, Tag, TextMode, Token, TokenSource, TokenizeOption, Tokenizer},
    util::is_void_tag,
    Position, SourceLocation,
};
use rustc_hash::FxHashSet;
use std::borrow::Cow;

/// Inserted when a component has no script block.
pub const SCRIPT_PLACEHOLDER: &str = "\n<script></script>";

pub struct SfcParseOptions {
    pub filename: String,
    /// block kinds treated as blocks, other top level elements are skipped
    pub kinds: BlockKinds,
    pub auto_add_script_tag: bool,
}

impl Default for SfcParseOptions {
    fn default() -> Self {
        Self {
            filename: "anonymous.san".into(),
            kinds: BlockKinds::all(),
            auto_add_script_tag: true,
        }
    }
}

pub struct SfcParseResult<'a> {
    pub descriptor: Descriptor,
    pub document: Document,
    /// The source every location refers to: the input itself, or a copy
    /// with the placeholder script inserted.
    pub source: Cow<'a, str>,
}

impl SfcParseResult<'_> {
    pub fn source(&self) -> &str {
        &self.source
    }
}

pub fn parse_sfc(source: &str, option: SfcParseOptions) -> SfcResult<SfcParseResult<'_>> {
    let (descriptor, document) = scan_blocks(source, &option)?;
    let wants_script = option.auto_add_script_tag && option.kinds.contains(BlockKinds::SCRIPT);
    if !wants_script || descriptor.has(BlockKind::Script) {
        return Ok(SfcParseResult {
            descriptor,
            document,
            source: Cow::Borrowed(source),
        });
    }
    let at = descriptor.template().map_or(source.len(), |t| t.loc.end.offset);
    log::debug!(
        "{}: no script block, inserting one at offset {}",
        descriptor.filename,
        at
    );
    let mut processed = String::with_capacity(source.len() + SCRIPT_PLACEHOLDER.len());
    processed.push_str(&source[..at]);
    processed.push_str(SCRIPT_PLACEHOLDER);
    processed.push_str(&source[at..]);
    let (mut descriptor, document) = scan_blocks(&processed, &option)?;
    // skip the newline before the tag
    let inserted_at = at + 1;
    let script = descriptor
        .blocks
        .iter_mut()
        .find(|b| b.kind == BlockKind::Script && b.loc.start.offset == inserted_at)
        .ok_or_else(|| SfcError::Parse {
            message: "inserted <script> block was not recognized".into(),
            location: SourceLocation::default(),
        })?;
    script.synthetic = true;
    Ok(SfcParseResult {
        descriptor,
        document,
        source: Cow::Owned(processed),
    })
}

fn get_text_mode(tag: &str) -> TextMode {
    match tag {
        "script" | "style" => TextMode::RawText,
        _ => TextMode::Data,
    }
}

// an element that is not a block, still waiting for its end tag
struct OpenElement<'a> {
    name: &'a str,
    node: usize,
}

/// Scans the top level. An element left open at EOF is treated as closed
/// right after its start tag and the source is scanned again, so it cannot
/// hide the blocks following it.
fn scan_blocks(source: &str, option: &SfcParseOptions) -> SfcResult<(Descriptor, Document)> {
    let mut void_at = FxHashSet::default();
    loop {
        match scan_top_level(source, option, &void_at)? {
            TopLevel::Done(descriptor, document) => return Ok((descriptor, document)),
            TopLevel::Unclosed(offset) => {
                if !void_at.insert(offset) {
                    return Err(SfcError::Parse {
                        message: "unable to recover from an unclosed element".into(),
                        location: SourceLocation::default(),
                    });
                }
            }
        }
    }
}

enum TopLevel {
    Done(Descriptor, Document),
    /// start offset of the outermost element never closed
    Unclosed(usize),
}

fn scan_top_level(
    source: &str,
    option: &SfcParseOptions,
    void_at: &FxHashSet<usize>,
) -> SfcResult<TopLevel> {
    let err_handle = VecErrorHandler::default();
    let tokenizer = Tokenizer::new(TokenizeOption {
        // block contents are opaque, no interpolation at this level
        delimiters: (String::new(), String::new()),
        get_text_mode,
    });
    let mut tokens = tokenizer.scan(source, err_handle.clone());
    let mut blocks = vec![];
    let mut nodes = vec![];
    let mut open_elems: Vec<OpenElement<'_>> = vec![];
    while let Some(token) = tokens.next() {
        let start = tokens.last_position();
        let loc = tokens.get_location_from(start);
        if !open_elems.is_empty() {
            track_nested(&mut open_elems, &mut nodes, &token, loc.end);
            continue;
        }
        match token {
            Token::StartTag(tag) => {
                let kind = BlockKind::from_tag(tag.name).filter(|k| option.kinds.contains(k.flag()));
                match kind {
                    Some(kind) => {
                        check_tag_syntax(&err_handle, loc, tag.name)?;
                        let block = scan_block(&mut tokens, kind, tag, loc)?;
                        log::trace!(
                            "found <{}> block at {}:{}",
                            kind,
                            block.loc.start.line,
                            block.loc.start.column
                        );
                        nodes.push(DocNode::Block {
                            index: blocks.len(),
                        });
                        blocks.push(block);
                    }
                    None => {
                        let closed = tag.self_closing
                            || is_void_tag(&tag.name.to_ascii_lowercase())
                            || void_at.contains(&loc.start.offset);
                        if !closed {
                            open_elems.push(OpenElement {
                                name: tag.name,
                                node: nodes.len(),
                            });
                        }
                        nodes.push(DocNode::Element {
                            name: tag.name.to_owned(),
                            loc,
                        });
                    }
                }
            }
            Token::Comment(_) => nodes.push(DocNode::Comment { loc }),
            // stray end tags are kept as text
            Token::EndTag(_) | Token::Text(_) | Token::Interpolation(_) => {
                nodes.push(DocNode::Text { loc })
            }
        }
    }
    if let Some(unclosed) = open_elems.first() {
        let at = match nodes.get(unclosed.node) {
            Some(DocNode::Element { loc, .. }) => loc.start.offset,
            _ => 0,
        };
        log::debug!("<{}> at offset {} is not closed before EOF", unclosed.name, at);
        return Ok(TopLevel::Unclosed(at));
    }
    // anything the tokenizer reported outside block tags is not fatal
    err_handle.take_errors();
    let descriptor = Descriptor::new(option.filename.clone(), blocks);
    if descriptor.blocks_of(BlockKind::Template).nth(1).is_some() {
        log::warn!("{}: more than one <template> block", descriptor.filename);
    }
    Ok(TopLevel::Done(descriptor, Document::new(nodes)))
}

/// Fails on attribute syntax errors inside a block's opening tag.
fn check_tag_syntax(err_handle: &VecErrorHandler, tag_loc: SourceLocation, name: &str) -> SfcResult<()> {
    let errors = err_handle.take_errors();
    let fatal = errors.into_iter().find(|e| {
        e.kind.is_tag_syntax_error() && tag_loc.contains_offset(e.location.start.offset)
    });
    match fatal {
        Some(e) => Err(SfcError::Parse {
            message: format!("invalid <{}> tag: {}", name, e),
            location: e.location,
        }),
        None => Ok(()),
    }
}

fn scan_block<'a, Ts>(
    tokens: &mut Ts,
    kind: BlockKind,
    tag: Tag<'a>,
    tag_loc: SourceLocation,
) -> SfcResult<BlockRecord>
where
    Ts: TokenSource<'a>,
{
    let attrs = tag
        .attributes
        .iter()
        .map(|a| BlockAttr {
            name: a.name.to_owned(),
            value: a.value.map(str::to_owned),
        })
        .collect();
    let (content_loc, end) = if tag.self_closing {
        let at = tag_loc.end;
        (SourceLocation { start: at, end: at }, at)
    } else {
        let content_start = tag_loc.end;
        match find_block_end(tokens, tag.name) {
            Some((content_end, end)) => (
                SourceLocation {
                    start: content_start,
                    end: content_end,
                },
                end,
            ),
            None => {
                return Err(SfcError::Parse {
                    message: format!("<{}> block is not closed", tag.name),
                    location: tag_loc,
                })
            }
        }
    };
    Ok(BlockRecord {
        kind,
        attrs,
        loc: SourceLocation {
            start: tag_loc.start,
            end,
        },
        content_loc,
        synthetic: false,
    })
}

/// Consumes tokens up to the end tag matching an opened block.
/// Returns where the end tag starts and where it ends.
/// Nested tags with the same name are counted, so a template may hold
/// `<template>` elements. Script and style are raw text and never nest.
fn find_block_end<'a, Ts>(tokens: &mut Ts, name: &str) -> Option<(Position, Position)>
where
    Ts: TokenSource<'a>,
{
    let mut depth = 0usize;
    while let Some(token) = tokens.next() {
        match token {
            Token::StartTag(t) if !t.self_closing && t.name.eq_ignore_ascii_case(name) => {
                depth += 1;
            }
            Token::EndTag(n) if n.eq_ignore_ascii_case(name) => {
                if depth == 0 {
                    return Some((tokens.last_position(), tokens.current_position()));
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

fn track_nested<'a>(
    open_elems: &mut Vec<OpenElement<'a>>,
    nodes: &mut [DocNode],
    token: &Token<'a>,
    end: Position,
) {
    match token {
        Token::StartTag(tag) if !tag.self_closing && !is_void_tag(&tag.name.to_ascii_lowercase()) => {
            // only the outermost element owns a node
            open_elems.push(OpenElement {
                name: tag.name,
                node: usize::MAX,
            });
        }
        Token::EndTag(name) => {
            let found = open_elems
                .iter()
                .rposition(|e| e.name.eq_ignore_ascii_case(name));
            if let Some(i) = found {
                let outer = open_elems[0].node;
                open_elems.truncate(i);
                if open_elems.is_empty() {
                    extend_node(nodes, outer, end);
                }
            }
        }
        _ => {}
    }
}

fn extend_node(nodes: &mut [DocNode], index: usize, end: Position) {
    if let Some(DocNode::Element { loc, .. }) = nodes.get_mut(index) {
        loc.end = end;
    }
}
