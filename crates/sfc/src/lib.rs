//! Single file component loading for San.
//!
//! A `.san` file holds `<template>`, `<script>` and `<style>` blocks. The
//! [`Loader`] turns it into an entry module that imports each block through
//! a block request (`App.san?san&type=style&index=0&lang=css`), and answers
//! those block requests with the block's code, optionally compiling the
//! template ahead of time.

pub mod assemble;
pub mod block;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod option;
pub mod parse_sfc;
pub mod source_map;
mod script;
mod style;
mod template;

// API
pub use assemble::assemble;
pub use block::extract_block;
pub use loader::{LoadRequest, Loader, LoaderOutput};
pub use parse_sfc::parse_sfc;
pub use script::{extract_script_code, generate_script_import};
pub use style::{extract_style_code, generate_style_import};
pub use template::{extract_template_code, generate_template_import};

// Structs
pub use block::{BlockCode, ExtractionResult, Snippet};
pub use descriptor::{
    BlockAttr, BlockKind, BlockKinds, BlockRecord, BlockSelector, Descriptor, DocNode, Document,
};
pub use error::{SfcError, SfcResult};
pub use option::{CompileTarget, ExtractionOptions, LoaderOptions, RequestQuery};
pub use parse_sfc::{SfcParseOptions, SfcParseResult};
pub use source_map::SourceMap;
