use crate::error::SfcError;
use bitflags::bitflags;
use compiler::{Position, SourceLocation};
use phf::{phf_map, Map};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Template,
    Script,
    Style,
}

static BLOCK_TAGS: Map<&'static str, BlockKind> = phf_map! {
    "template" => BlockKind::Template,
    "script" => BlockKind::Script,
    "style" => BlockKind::Style,
};

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::Template, BlockKind::Script, BlockKind::Style];

    pub fn from_tag(tag: &str) -> Option<Self> {
        BLOCK_TAGS.get(tag).copied()
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            BlockKind::Template => "template",
            BlockKind::Script => "script",
            BlockKind::Style => "style",
        }
    }

    /// The language a block is written in when it has no `lang` attribute.
    pub fn default_lang(self) -> &'static str {
        match self {
            BlockKind::Template => "html",
            BlockKind::Script => "js",
            BlockKind::Style => "css",
        }
    }

    pub fn flag(self) -> BlockKinds {
        match self {
            BlockKind::Template => BlockKinds::TEMPLATE,
            BlockKind::Script => BlockKinds::SCRIPT,
            BlockKind::Style => BlockKinds::STYLE,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

impl FromStr for BlockKind {
    type Err = SfcError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::from_tag(s).ok_or_else(|| SfcError::Config(format!("unknown block type `{}`", s)))
    }
}

bitflags! {
    /// A set of block kinds, used both for the kinds a parse recognizes
    /// and for the kinds a descriptor contains.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct BlockKinds: u8 {
        const TEMPLATE = 1;
        const SCRIPT = 1 << 1;
        const STYLE = 1 << 2;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockAttr {
    pub name: String,
    /// `None` for a boolean attribute like `scoped`.
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockRecord {
    pub kind: BlockKind,
    pub attrs: SmallVec<[BlockAttr; 2]>,
    /// from the opening `<` to the closing `>` of the end tag
    pub loc: SourceLocation,
    /// the text between the opening tag and the end tag
    pub content_loc: SourceLocation,
    /// inserted by the parser rather than written by the author
    pub synthetic: bool,
}

impl BlockRecord {
    pub fn attr(&self, name: &str) -> Option<&BlockAttr> {
        self.attrs.iter().find(|a| a.name == name)
    }
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|a| a.value.as_deref())
    }
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn lang(&self) -> Option<&str> {
        self.attr_value("lang")
    }
    /// The declared language, or the kind's default one.
    pub fn effective_lang(&self) -> &str {
        self.lang().unwrap_or_else(|| self.kind.default_lang())
    }
    pub fn src(&self) -> Option<&str> {
        self.attr_value("src")
    }
    pub fn scoped(&self) -> bool {
        self.has_attr("scoped")
    }
    /// CSS module name: `module` alone means `$style`.
    pub fn module(&self) -> Option<&str> {
        self.attr("module").map(|a| a.value.as_deref().unwrap_or("$style"))
    }

    pub fn content<'s>(&self, source: &'s str) -> &'s str {
        &source[self.content_loc.range()]
    }
    pub fn span<'s>(&self, source: &'s str) -> &'s str {
        &source[self.loc.range()]
    }
}

/// Picks one block of a kind: `index` counts blocks of that kind in
/// document order and `lang` must match the chosen block's language.
/// Without an index the first block with a matching language wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockSelector<'a> {
    pub index: Option<usize>,
    pub lang: Option<&'a str>,
}

impl fmt::Display for BlockSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.index, self.lang) {
            (Some(i), Some(lang)) => write!(f, "index {} and lang `{}`", i, lang),
            (Some(i), None) => write!(f, "index {}", i),
            (None, Some(lang)) => write!(f, "lang `{}`", lang),
            (None, None) => f.write_str("any selector"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Descriptor {
    pub filename: String,
    /// every recognized top level block in document order
    pub blocks: Vec<BlockRecord>,
    pub present: BlockKinds,
}

impl Descriptor {
    pub fn new(filename: String, blocks: Vec<BlockRecord>) -> Self {
        let present = blocks
            .iter()
            .fold(BlockKinds::empty(), |acc, b| acc | b.kind.flag());
        Self {
            filename,
            blocks,
            present,
        }
    }

    pub fn has(&self, kind: BlockKind) -> bool {
        self.present.contains(kind.flag())
    }

    /// Blocks of one kind, paired with their index among that kind.
    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = (usize, &BlockRecord)> {
        self.blocks.iter().filter(move |b| b.kind == kind).enumerate()
    }

    pub fn template(&self) -> Option<&BlockRecord> {
        self.blocks_of(BlockKind::Template).next().map(|(_, b)| b)
    }
    pub fn script(&self) -> Option<&BlockRecord> {
        self.blocks_of(BlockKind::Script).next().map(|(_, b)| b)
    }
    pub fn styles(&self) -> impl Iterator<Item = &BlockRecord> {
        self.blocks_of(BlockKind::Style).map(|(_, b)| b)
    }

    pub fn select(&self, kind: BlockKind, selector: &BlockSelector<'_>) -> Option<&BlockRecord> {
        let lang_matches = |b: &BlockRecord| selector.lang.map_or(true, |l| b.effective_lang() == l);
        let mut candidates = self.blocks_of(kind).map(|(_, b)| b);
        match selector.index {
            Some(i) => candidates.nth(i).filter(|b| lang_matches(b)),
            None => candidates.find(|b| lang_matches(b)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocNode {
    /// index into [`Descriptor::blocks`]
    Block { index: usize },
    /// an element that is not a recognized block, with everything it wraps
    Element { name: String, loc: SourceLocation },
    Text { loc: SourceLocation },
    Comment { loc: SourceLocation },
}

/// Top level structure of a single file component. The node spans cover
/// the source without gaps.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub nodes: Vec<DocNode>,
}

impl Document {
    pub fn new(nodes: Vec<DocNode>) -> Self {
        Self { nodes }
    }

    pub fn node_location(&self, node: &DocNode, descriptor: &Descriptor) -> Option<SourceLocation> {
        match node {
            DocNode::Block { index } => descriptor.blocks.get(*index).map(|b| b.loc),
            DocNode::Element { loc, .. } | DocNode::Text { loc } | DocNode::Comment { loc } => {
                Some(*loc)
            }
        }
    }
}

/// Moves a location reported against a block's content so it points into
/// the whole file.
pub fn relocate(loc: SourceLocation, base: Position) -> SourceLocation {
    let shift = |p: Position| Position {
        offset: p.offset + base.offset,
        line: p.line + base.line - 1,
        column: if p.line == 1 {
            p.column + base.column - 1
        } else {
            p.column
        },
    };
    SourceLocation {
        start: shift(loc.start),
        end: shift(loc.end),
    }
}
