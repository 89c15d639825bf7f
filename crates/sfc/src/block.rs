use crate::descriptor::{BlockKind, Descriptor};
use crate::error::SfcResult;
use crate::option::ExtractionOptions;
use crate::source_map::SourceMap;
use crate::{script, style, template};
use compiler::{ANode, APack, TemplateAst};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlockCode {
    /// block content as written
    Text(String),
    /// a template compiled to its ANode tree
    Tree(ANode),
    /// a template compiled and packed
    Packed(APack),
}

impl BlockCode {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BlockCode::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Source of the module a bundler receives for this block. Text is
    /// handed over untouched, compiled templates become a JSON export.
    pub fn to_module_source(&self, es_module: bool) -> SfcResult<String> {
        let json = match self {
            BlockCode::Text(s) => return Ok(s.clone()),
            BlockCode::Tree(tree) => serde_json::to_string(tree)?,
            BlockCode::Packed(packed) => serde_json::to_string(packed)?,
        };
        Ok(if es_module {
            format!("export default {};\n", json)
        } else {
            format!("module.exports = {};\n", json)
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub code: BlockCode,
    pub map: Option<SourceMap>,
}

/// Extracts the block a request selects, dispatching on its kind.
pub fn extract_block<T: TemplateAst>(
    descriptor: &Descriptor,
    source: &str,
    options: &ExtractionOptions<'_>,
    ast: &T,
) -> SfcResult<ExtractionResult> {
    log::debug!(
        "{}: extracting <{}> with {}",
        options.filename,
        options.kind,
        options.selector
    );
    match options.kind {
        BlockKind::Template => template::extract_template_code(descriptor, source, options, ast),
        BlockKind::Script => Ok(script::extract_script_code(descriptor, source, options)),
        BlockKind::Style => Ok(style::extract_style_code(descriptor, source, options)),
    }
}

/// Script and style extraction: the selected block's text, an import of
/// its `src` file, or empty text when nothing matches.
pub(crate) fn extract_text(
    descriptor: &Descriptor,
    source: &str,
    options: &ExtractionOptions<'_>,
) -> ExtractionResult {
    match descriptor.select(options.kind, &options.selector) {
        Some(block) => match block.src() {
            Some(src) => ExtractionResult {
                code: forward_src(options.kind, src, options.es_module),
                map: None,
            },
            None => ExtractionResult {
                code: BlockCode::Text(block.content(source).to_owned()),
                map: block_map(options, source, block.content_loc.start),
            },
        },
        None => {
            log::debug!(
                "{}: no <{}> matches {}, using empty code",
                options.filename,
                options.kind,
                options.selector
            );
            ExtractionResult {
                code: BlockCode::Text(String::new()),
                map: None,
            }
        }
    }
}

/// Stands in for a block whose content lives in its `src` file.
pub(crate) fn forward_src(kind: BlockKind, src: &str, es_module: bool) -> BlockCode {
    let request = json_string(src);
    let code = match kind {
        BlockKind::Style => format!("@import {};\n", request),
        _ if es_module => format!("export {{ default }} from {};\n", request),
        _ => format!("module.exports = require({});\n", request),
    };
    BlockCode::Text(code)
}

pub(crate) fn block_map(
    options: &ExtractionOptions<'_>,
    source: &str,
    content_start: compiler::Position,
) -> Option<SourceMap> {
    if options.source_map {
        Some(SourceMap::for_block(options.filename, source, content_start))
    } else {
        None
    }
}

/// A piece of the entry module and the block requests it imports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippet {
    pub code: String,
    pub requests: Vec<String>,
}

impl Snippet {
    pub fn inline(code: String) -> Self {
        Self {
            code,
            requests: vec![],
        }
    }
}

pub(crate) fn json_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

pub(crate) fn import_statement(binding: &str, request: &str, es_module: bool) -> String {
    let request = json_string(request);
    if es_module {
        format!("import {} from {};\n", binding, request)
    } else {
        format!("var {} = require({});\n", binding, request)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_import_statement() {
        assert_eq!(
            import_statement("style0", "a.san?san&type=style", true),
            "import style0 from \"a.san?san&type=style\";\n"
        );
        assert_eq!(
            import_statement("script", "a\"b.san", false),
            "var script = require(\"a\\\"b.san\");\n"
        );
    }

    #[test]
    fn test_module_source() {
        let code = BlockCode::Text("a { }".into());
        assert_eq!(code.to_module_source(true).unwrap(), "a { }");
        assert_eq!(code.as_text(), Some("a { }"));
        let code = BlockCode::Packed(vec![]);
        assert_eq!(code.to_module_source(true).unwrap(), "export default [];\n");
        assert_eq!(code.to_module_source(false).unwrap(), "module.exports = [];\n");
        assert_eq!(code.as_text(), None);
    }
}
