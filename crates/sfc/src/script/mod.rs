use crate::block::{extract_text, import_statement, ExtractionResult, Snippet};
use crate::descriptor::{BlockKind, Descriptor};
use crate::option::{BlockQuery, ExtractionOptions, LoaderOptions};

pub fn extract_script_code(
    descriptor: &Descriptor,
    source: &str,
    options: &ExtractionOptions<'_>,
) -> ExtractionResult {
    extract_text(descriptor, source, options)
}

/// Binds `script` to the component's script module. The script is always
/// imported through a block request, it cannot be inlined as an expression.
pub fn generate_script_import(descriptor: &Descriptor, options: &LoaderOptions) -> Snippet {
    let (index, block) = match descriptor.blocks_of(BlockKind::Script).next() {
        Some(found) => found,
        None => return Snippet::inline("var script = {};\n".into()),
    };
    let request = BlockQuery::new(BlockKind::Script, index)
        .param("lang", block.effective_lang())
        .src(block.src())
        .request(&descriptor.filename);
    let mut code = import_statement("script", &request, options.es_module);
    if !options.es_module {
        code.push_str("script = script.__esModule ? script.default : script;\n");
    }
    Snippet {
        code,
        requests: vec![request],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse_sfc::{parse_sfc, SfcParseOptions};

    fn descriptor(src: &str, auto_add_script_tag: bool) -> Descriptor {
        let option = SfcParseOptions {
            filename: "App.san".into(),
            auto_add_script_tag,
            ..Default::default()
        };
        parse_sfc(src, option).unwrap().descriptor
    }

    #[test]
    fn test_script_import() {
        let d = descriptor("<script lang=\"ts\">export default {}</script>", true);
        let options = LoaderOptions {
            es_module: true,
            ..Default::default()
        };
        let snippet = generate_script_import(&d, &options);
        assert_eq!(
            snippet.code,
            "import script from \"App.san?san&type=script&index=0&lang=ts\";\n"
        );
        assert_eq!(snippet.requests, vec!["App.san?san&type=script&index=0&lang=ts"]);
    }

    #[test]
    fn test_script_import_classic() {
        let d = descriptor("<script src=\"./app.js\"></script>", true);
        let snippet = generate_script_import(&d, &LoaderOptions::default());
        assert_eq!(
            snippet.code,
            "var script = require(\"App.san?san&type=script&index=0&lang=js&src=./app.js\");\nscript = script.__esModule ? script.default : script;\n"
        );
    }

    #[test]
    fn test_missing_script() {
        let d = descriptor("<template></template>", false);
        let snippet = generate_script_import(&d, &LoaderOptions::default());
        assert_eq!(snippet.code, "var script = {};\n");
        assert!(snippet.requests.is_empty());
    }

    #[test]
    fn test_extract_missing_script_is_empty() {
        let src = "<template></template>";
        let d = descriptor(src, false);
        let options = LoaderOptions::default();
        let extraction = ExtractionOptions::for_kind(BlockKind::Script, &options, "App.san");
        let result = extract_script_code(&d, src, &extraction);
        assert_eq!(result.code.as_text(), Some(""));
        assert!(result.map.is_none());
    }
}
