use crate::descriptor::{BlockKind, BlockSelector};
use crate::error::{SfcError, SfcResult};
use compiler::TrimWhitespace;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::str::FromStr;

/// What a template block turns into when it is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompileTarget {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "aNode")]
    ANode,
    #[serde(rename = "aPack")]
    APack,
}

impl CompileTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            CompileTarget::None => "none",
            CompileTarget::ANode => "aNode",
            CompileTarget::APack => "aPack",
        }
    }
}

impl Default for CompileTarget {
    fn default() -> Self {
        CompileTarget::None
    }
}

impl fmt::Display for CompileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompileTarget {
    type Err = SfcError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(CompileTarget::None),
            "aNode" => Ok(CompileTarget::ANode),
            "aPack" => Ok(CompileTarget::APack),
            _ => Err(SfcError::Config(format!(
                "compileTemplate must be one of none, aNode, aPack but got `{}`",
                s
            ))),
        }
    }
}

pub const DEFAULT_NORMALIZE_PATH: &str = "san-loader/runtime/normalize";

/// Loader wide options, usually deserialized from the host's JSON config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LoaderOptions {
    pub compile_template: CompileTarget,
    /// ES module import/export instead of require/module.exports
    pub es_module: bool,
    pub auto_add_script_tag: bool,
    pub auto_fill_style_and_id: bool,
    pub trim_whitespace: TrimWhitespace,
    pub delimiters: (String, String),
    pub source_map: bool,
    /// module providing the `normalize` runtime helper
    pub normalize_path: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            compile_template: CompileTarget::None,
            es_module: false,
            auto_add_script_tag: true,
            auto_fill_style_and_id: true,
            trim_whitespace: TrimWhitespace::None,
            delimiters: ("{{".into(), "}}".into()),
            source_map: false,
            normalize_path: DEFAULT_NORMALIZE_PATH.into(),
        }
    }
}

impl LoaderOptions {
    pub fn from_json(json: &str) -> SfcResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        if options.delimiters.0.is_empty() || options.delimiters.1.is_empty() {
            return Err(SfcError::Config("delimiters cannot be empty".into()));
        }
        Ok(options)
    }
}

/// Bytes escaped in query values. Paths keep their separators readable.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

fn decode_component(raw: &str) -> String {
    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// The query string attached to a module request, e.g.
/// `?san&type=style&index=1&lang=less`.
/// Hyphenated keys are also readable in camelCase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    params: FxHashMap<String, String>,
}

impl RequestQuery {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut params = FxHashMap::default();
        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.find('=') {
                Some(i) => (decode_component(&pair[..i]), decode_component(&pair[i + 1..])),
                None => (decode_component(pair), String::new()),
            };
            if key.contains('-') {
                params.insert(to_camel_case(&key), value.clone());
            }
            params.insert(key, value);
        }
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// A request for one block of the component rather than its entry.
    pub fn is_block_request(&self) -> bool {
        self.get("san") == Some("") && self.has("type")
    }

    pub fn kind(&self) -> SfcResult<Option<BlockKind>> {
        self.get("type").map(str::parse).transpose()
    }

    pub fn index(&self) -> SfcResult<Option<usize>> {
        self.get("index")
            .map(|i| {
                i.parse()
                    .map_err(|_| SfcError::Config(format!("invalid block index `{}`", i)))
            })
            .transpose()
    }

    pub fn lang(&self) -> Option<&str> {
        self.get("lang").filter(|l| !l.is_empty())
    }

    pub fn compile_template(&self) -> SfcResult<Option<CompileTarget>> {
        self.get("compileTemplate").map(str::parse).transpose()
    }

    pub fn selector(&self) -> SfcResult<BlockSelector<'_>> {
        Ok(BlockSelector {
            index: self.index()?,
            lang: self.lang(),
        })
    }
}

fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Builds the query of a deferred block request.
#[derive(Debug, Clone)]
pub struct BlockQuery {
    query: String,
}

impl BlockQuery {
    pub fn new(kind: BlockKind, index: usize) -> Self {
        Self {
            query: format!("?san&type={}&index={}", kind, index),
        }
    }
    pub fn param(mut self, key: &str, value: &str) -> Self {
        // writing into a String never fails
        let _ = write!(self.query, "&{}={}", key, utf8_percent_encode(value, QUERY_VALUE));
        self
    }
    pub fn flag(mut self, key: &str) -> Self {
        self.query.push('&');
        self.query.push_str(key);
        self
    }
    /// Records the block's external file, if any, in the query.
    pub fn src(self, src: Option<&str>) -> Self {
        match src {
            Some(src) => self.param("src", src),
            None => self,
        }
    }
    /// Appends the query to the component path.
    pub fn request(&self, path: &str) -> String {
        format!("{}{}", path, self.query)
    }
    pub fn as_str(&self) -> &str {
        &self.query
    }
}

/// Splits `path?query` into its two halves.
pub fn split_request(request: &str) -> (&str, &str) {
    match request.find('?') {
        Some(i) => (&request[..i], &request[i..]),
        None => (request, ""),
    }
}

/// Everything one extraction needs, resolved from loader options and the
/// request query.
#[derive(Debug, Clone)]
pub struct ExtractionOptions<'a> {
    pub kind: BlockKind,
    pub selector: BlockSelector<'a>,
    pub filename: &'a str,
    pub source_map: bool,
    pub compile_template: CompileTarget,
    pub trim_whitespace: TrimWhitespace,
    pub delimiters: (&'a str, &'a str),
    pub auto_fill_style_and_id: bool,
    pub es_module: bool,
}

impl<'a> ExtractionOptions<'a> {
    pub fn new(
        kind: BlockKind,
        options: &'a LoaderOptions,
        query: &'a RequestQuery,
        filename: &'a str,
    ) -> SfcResult<Self> {
        let compile_template = query
            .compile_template()?
            .unwrap_or(options.compile_template);
        Ok(Self {
            kind,
            selector: query.selector()?,
            filename,
            source_map: options.source_map,
            compile_template,
            trim_whitespace: options.trim_whitespace,
            delimiters: (&options.delimiters.0, &options.delimiters.1),
            auto_fill_style_and_id: options.auto_fill_style_and_id,
            es_module: options.es_module,
        })
    }

    /// Options for the first block of `kind`, with nothing from a query.
    pub fn for_kind(kind: BlockKind, options: &'a LoaderOptions, filename: &'a str) -> Self {
        Self {
            kind,
            selector: BlockSelector::default(),
            filename,
            source_map: options.source_map,
            compile_template: options.compile_template,
            trim_whitespace: options.trim_whitespace,
            delimiters: (&options.delimiters.0, &options.delimiters.1),
            auto_fill_style_and_id: options.auto_fill_style_and_id,
            es_module: options.es_module,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_loader_defaults() {
        let options = LoaderOptions::from_json("{}").unwrap();
        assert_eq!(options, LoaderOptions::default());
        assert_eq!(options.compile_template, CompileTarget::None);
        assert!(options.auto_add_script_tag);
        assert!(options.auto_fill_style_and_id);
        assert!(!options.es_module);
        assert_eq!(options.normalize_path, DEFAULT_NORMALIZE_PATH);
    }

    #[test]
    fn test_loader_options_json() {
        let options = LoaderOptions::from_json(
            r#"{"compileTemplate": "aPack", "esModule": true, "trimWhitespace": "blank", "delimiters": ["${", "}"]}"#,
        )
        .unwrap();
        assert_eq!(options.compile_template, CompileTarget::APack);
        assert!(options.es_module);
        assert_eq!(options.trim_whitespace, TrimWhitespace::Blank);
        assert_eq!(options.delimiters, ("${".to_owned(), "}".to_owned()));
    }

    #[test]
    fn test_loader_options_invalid() {
        let err = LoaderOptions::from_json(r#"{"compileTemplate": "ast"}"#).unwrap_err();
        assert!(matches!(err, SfcError::Options(_)));
        let err = LoaderOptions::from_json(r#"{"delimiters": ["", "}"]}"#).unwrap_err();
        assert!(matches!(err, SfcError::Config(_)));
    }

    #[test]
    fn test_parse_query() {
        let query = RequestQuery::parse("?san&type=style&index=1&lang=less&compile-template=aNode");
        assert!(query.is_block_request());
        assert_eq!(query.kind().unwrap(), Some(BlockKind::Style));
        assert_eq!(query.index().unwrap(), Some(1));
        assert_eq!(query.lang(), Some("less"));
        assert_eq!(query.get("compile-template"), Some("aNode"));
        assert_eq!(query.compile_template().unwrap(), Some(CompileTarget::ANode));
    }

    #[test]
    fn test_entry_query() {
        assert!(!RequestQuery::parse("").is_block_request());
        assert!(!RequestQuery::parse("?san").is_block_request());
        assert!(!RequestQuery::parse("?san=1&type=style").is_block_request());
        assert!(RequestQuery::parse("").is_empty());
    }

    #[test]
    fn test_invalid_query_values() {
        let query = RequestQuery::parse("?san&type=docs&index=x&compileTemplate=ast");
        assert!(query.kind().is_err());
        assert!(query.index().is_err());
        assert!(query.compile_template().is_err());
    }

    #[test]
    fn test_block_query() {
        let query = BlockQuery::new(BlockKind::Style, 2)
            .param("lang", "css")
            .flag("scoped");
        assert_eq!(query.as_str(), "?san&type=style&index=2&lang=css&scoped");
        assert_eq!(
            query.request("./App.san"),
            "./App.san?san&type=style&index=2&lang=css&scoped"
        );
        let query = BlockQuery::new(BlockKind::Style, 0).src(Some("./a.css"));
        assert_eq!(query.request("./App.san"), "./App.san?san&type=style&index=0&src=./a.css");
        assert_eq!(split_request("a.san?san&type=x"), ("a.san", "?san&type=x"));
        assert_eq!(split_request("a.san"), ("a.san", ""));
    }

    #[test]
    fn test_query_values_are_encoded() {
        let query = BlockQuery::new(BlockKind::Style, 0)
            .param("module", "a&b=c d")
            .src(Some("./théme.css"));
        assert_eq!(
            query.as_str(),
            "?san&type=style&index=0&module=a%26b%3Dc%20d&src=./th%C3%A9me.css"
        );
        let parsed = RequestQuery::parse(query.as_str());
        assert_eq!(parsed.get("module"), Some("a&b=c d"));
        assert_eq!(parsed.get("src"), Some("./théme.css"));
        assert_eq!(parsed.get("index"), Some("0"));
        assert_eq!(RequestQuery::parse("?module=a+b").get("module"), Some("a b"));
    }

    #[test]
    fn test_query_overrides_compile_target() {
        let options = LoaderOptions::default();
        let query = RequestQuery::parse("?san&type=template&compileTemplate=aPack");
        let extraction =
            ExtractionOptions::new(BlockKind::Template, &options, &query, "a.san").unwrap();
        assert_eq!(extraction.compile_template, CompileTarget::APack);
        let query = RequestQuery::parse("?san&type=template");
        let extraction =
            ExtractionOptions::new(BlockKind::Template, &options, &query, "a.san").unwrap();
        assert_eq!(extraction.compile_template, CompileTarget::None);
    }
}
