use crate::block::{
    block_map, forward_src, import_statement, json_string, BlockCode, ExtractionResult, Snippet,
};
use crate::descriptor::{relocate, BlockKind, BlockRecord, Descriptor};
use crate::error::{SfcError, SfcResult};
use crate::option::{BlockQuery, CompileTarget, ExtractionOptions, LoaderOptions};
use compiler::{ANode, APack, ComponentTemplate, TemplateAst};

pub fn extract_template_code<T: TemplateAst>(
    descriptor: &Descriptor,
    source: &str,
    options: &ExtractionOptions<'_>,
    ast: &T,
) -> SfcResult<ExtractionResult> {
    let block = descriptor
        .select(BlockKind::Template, &options.selector)
        .ok_or_else(|| SfcError::NotFound {
            kind: BlockKind::Template,
            selector: options.selector.to_string(),
        })?;
    let target = options.compile_template;
    if let Some(src) = block.src() {
        if target != CompileTarget::None {
            return Err(SfcError::Config(format!(
                "compileTemplate cannot be used with <template src=\"{}\">",
                src
            )));
        }
        return Ok(ExtractionResult {
            code: forward_src(BlockKind::Template, src, options.es_module),
            map: None,
        });
    }
    let text = block.content(source);
    let map = block_map(options, source, block.content_loc.start);
    if target == CompileTarget::None {
        return Ok(ExtractionResult {
            code: BlockCode::Text(text.to_owned()),
            map,
        });
    }
    let lang = options.selector.lang.unwrap_or_else(|| block.effective_lang());
    if lang != "html" {
        return Err(SfcError::Config(format!(
            "compileTemplate can only be used when lang is html, but got `{}`",
            lang
        )));
    }
    let tree = compile_tree(block, text, options, ast)?;
    log::debug!("{}: compiled template to {}", options.filename, target);
    let code = match target {
        CompileTarget::APack => BlockCode::Packed(pack_tree(&tree, options, ast)),
        _ => BlockCode::Tree(tree),
    };
    Ok(ExtractionResult { code, map })
}

fn compile_tree<T: TemplateAst>(
    block: &BlockRecord,
    text: &str,
    options: &ExtractionOptions<'_>,
    ast: &T,
) -> SfcResult<ANode> {
    let result = if options.auto_fill_style_and_id {
        let component = ComponentTemplate {
            template: text,
            trim_whitespace: options.trim_whitespace,
            delimiters: options.delimiters,
            auto_fill_style_and_id: true,
        };
        ast.parse_component_template(&component)
    } else {
        ast.parse_template(text)
    };
    result.map_err(|mut err| {
        err.location = relocate(err.location, block.content_loc.start);
        SfcError::from(err)
    })
}

/// An auto-filled tree is the component root and is packed whole. A plain
/// tree is a wrapper, only its first node is packed.
fn pack_tree<T: TemplateAst>(tree: &ANode, options: &ExtractionOptions<'_>, ast: &T) -> APack {
    match tree.children.first() {
        None => vec![],
        Some(_) if options.auto_fill_style_and_id => ast.pack(tree),
        Some(first) => ast.pack(first),
    }
}

/// Binds `template` to the markup: inline as a string literal when the
/// block is plain html, otherwise through a block request.
pub fn generate_template_import(
    descriptor: &Descriptor,
    source: &str,
    options: &LoaderOptions,
) -> SfcResult<Snippet> {
    let (index, block) = match descriptor.blocks_of(BlockKind::Template).next() {
        Some(found) => found,
        None => return Ok(Snippet::inline("var template = null;\n".into())),
    };
    let target = match block.attr_value("compileTemplate").or_else(|| block.attr_value("compile-template")) {
        Some(declared) => declared.parse()?,
        None => options.compile_template,
    };
    let lang = block.effective_lang();
    let deferred =
        block.src().is_some() || lang != BlockKind::Template.default_lang() || target != CompileTarget::None;
    if !deferred {
        let code = format!("var template = {};\n", json_string(block.content(source)));
        return Ok(Snippet::inline(code));
    }
    let mut query = BlockQuery::new(BlockKind::Template, index).param("lang", lang);
    if target != CompileTarget::None {
        query = query.param("compileTemplate", target.as_str());
    }
    let request = query.src(block.src()).request(&descriptor.filename);
    Ok(Snippet {
        code: import_statement("template", &request, options.es_module),
        requests: vec![request],
    })
}
