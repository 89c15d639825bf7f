use crate::block::{extract_text, import_statement, json_string, ExtractionResult, Snippet};
use crate::descriptor::{BlockKind, Descriptor};
use crate::option::{BlockQuery, ExtractionOptions, LoaderOptions};
use std::fmt::Write;

pub fn extract_style_code(
    descriptor: &Descriptor,
    source: &str,
    options: &ExtractionOptions<'_>,
) -> ExtractionResult {
    extract_text(descriptor, source, options)
}

/// Imports every style block as `style<i>` and binds `injectStyles`.
/// CSS text always goes through the host's style pipeline, so styles are
/// never inlined.
pub fn generate_style_import(descriptor: &Descriptor, options: &LoaderOptions) -> Snippet {
    let mut code = String::new();
    let mut requests = vec![];
    let mut modules = vec![];
    for (index, block) in descriptor.blocks_of(BlockKind::Style) {
        let mut query = BlockQuery::new(BlockKind::Style, index).param("lang", block.effective_lang());
        if block.scoped() {
            query = query.flag("scoped");
        }
        if let Some(name) = block.module() {
            query = query.param("module", name);
            modules.push((name, index));
        }
        let request = query.src(block.src()).request(&descriptor.filename);
        code.push_str(&import_statement(&format!("style{}", index), &request, options.es_module));
        requests.push(request);
    }
    if requests.is_empty() {
        return Snippet::inline("var injectStyles = null;\n".into());
    }
    code.push_str("var injectStyles = function () {\n");
    for (name, index) in modules {
        // writing into a String never fails
        let _ = writeln!(code, "    this[{}] = style{};", json_string(name), index);
    }
    let styles: Vec<_> = (0..requests.len()).map(|i| format!("style{}", i)).collect();
    let _ = writeln!(code, "    return [{}];", styles.join(", "));
    code.push_str("};\n");
    Snippet { code, requests }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse_sfc::{parse_sfc, SfcParseOptions};
    use insta::assert_snapshot;

    fn descriptor(src: &str) -> Descriptor {
        let option = SfcParseOptions {
            filename: "App.san".into(),
            ..Default::default()
        };
        parse_sfc(src, option).unwrap().descriptor
    }

    #[test]
    fn test_no_styles() {
        let d = descriptor("<template></template>");
        let snippet = generate_style_import(&d, &LoaderOptions::default());
        assert_eq!(snippet.code, "var injectStyles = null;\n");
        assert!(snippet.requests.is_empty());
    }

    #[test]
    fn test_style_imports() {
        let d = descriptor(
            "<style>a{}</style><style lang=\"less\" scoped>b{}</style><style module>.c{}</style><style module=\"theme\" src=\"./t.css\"/>",
        );
        let options = LoaderOptions {
            es_module: true,
            ..Default::default()
        };
        let snippet = generate_style_import(&d, &options);
        assert_eq!(snippet.requests.len(), 4);
        assert_snapshot!(snippet.code, @r###"
        import style0 from "App.san?san&type=style&index=0&lang=css";
        import style1 from "App.san?san&type=style&index=1&lang=less&scoped";
        import style2 from "App.san?san&type=style&index=2&lang=css&module=%24style";
        import style3 from "App.san?san&type=style&index=3&lang=css&module=theme&src=./t.css";
        var injectStyles = function () {
            this["$style"] = style2;
            this["theme"] = style3;
            return [style0, style1, style2, style3];
        };
        "###);
    }

    #[test]
    fn test_extract_style_by_index_and_lang() {
        let src = "<style>a{}</style><style lang=\"less\">b{}</style>";
        let d = descriptor(src);
        let options = LoaderOptions::default();
        let mut extraction = ExtractionOptions::for_kind(BlockKind::Style, &options, "App.san");
        extraction.selector.index = Some(1);
        extraction.selector.lang = Some("less");
        let result = extract_style_code(&d, src, &extraction);
        assert_eq!(result.code.as_text(), Some("b{}"));
        extraction.selector.lang = Some("css");
        let result = extract_style_code(&d, src, &extraction);
        assert_eq!(result.code.as_text(), Some(""));
    }
}
