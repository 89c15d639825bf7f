use crate::assemble::assemble;
use crate::block::{extract_block, ExtractionResult};
use crate::descriptor::BlockKinds;
use crate::error::{SfcError, SfcResult};
use crate::option::{split_request, ExtractionOptions, LoaderOptions, RequestQuery};
use crate::parse_sfc::{parse_sfc, SfcParseOptions};
use crate::script::generate_script_import;
use crate::style::generate_style_import;
use crate::template::generate_template_import;
use compiler::{SanTemplateAst, TemplateAst};

/// One module request: the component file, its text and the query string.
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    pub path: &'a str,
    pub source: &'a str,
    pub query: &'a str,
}

impl<'a> LoadRequest<'a> {
    /// Builds a request from `path?query`, the form block imports take.
    pub fn from_request(request: &'a str, source: &'a str) -> Self {
        let (path, query) = split_request(request);
        Self { path, source, query }
    }
}

#[derive(Debug, Clone)]
pub enum LoaderOutput {
    /// the code of one block
    Block(ExtractionResult),
    /// the entry module and the block requests it imports
    Entry { code: String, requests: Vec<String> },
}

pub struct Loader<T = SanTemplateAst> {
    options: LoaderOptions,
    ast: T,
}

impl Loader {
    pub fn new(options: LoaderOptions) -> Self {
        Self::with_template_ast(options, SanTemplateAst)
    }
}

impl<T: TemplateAst> Loader<T> {
    pub fn with_template_ast(options: LoaderOptions, ast: T) -> Self {
        Self { options, ast }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Turns a component into its entry module, or into one block's code
    /// when the query selects a block.
    pub fn run(&self, request: &LoadRequest<'_>) -> SfcResult<LoaderOutput> {
        let parsed = parse_sfc(
            request.source,
            SfcParseOptions {
                filename: request.path.to_owned(),
                kinds: BlockKinds::all(),
                auto_add_script_tag: self.options.auto_add_script_tag,
            },
        )?;
        let descriptor = &parsed.descriptor;
        let source = parsed.source();
        let query = RequestQuery::parse(request.query);
        if query.is_block_request() {
            let kind = query
                .kind()?
                .ok_or_else(|| SfcError::Config("block request without type".into()))?;
            let options = ExtractionOptions::new(kind, &self.options, &query, request.path)?;
            let result = extract_block(descriptor, source, &options, &self.ast)?;
            return Ok(LoaderOutput::Block(result));
        }
        let template = generate_template_import(descriptor, source, &self.options)?;
        let style = generate_style_import(descriptor, &self.options);
        let script = generate_script_import(descriptor, &self.options);
        let code = assemble(&template.code, &style.code, &script.code, &self.options);
        let requests = template
            .requests
            .into_iter()
            .chain(style.requests)
            .chain(script.requests)
            .collect();
        log::debug!("{}: assembled entry module", request.path);
        Ok(LoaderOutput::Entry { code, requests })
    }

    /// Runs a block request produced by an entry module against the same
    /// component source.
    pub fn resolve(&self, block_request: &str, source: &str) -> SfcResult<ExtractionResult> {
        match self.run(&LoadRequest::from_request(block_request, source))? {
            LoaderOutput::Block(result) => Ok(result),
            LoaderOutput::Entry { .. } => Err(SfcError::Config(format!(
                "`{}` does not select a block",
                block_request
            ))),
        }
    }
}
