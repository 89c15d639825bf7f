use insta::assert_snapshot;
use san_compiler_sfc::{
    parse_sfc, BlockCode, BlockKind, CompileTarget, LoadRequest, Loader, LoaderOptions,
    LoaderOutput, SfcError, SfcParseOptions,
};

const APP: &str = r#"<template>
  <div class="app">Hello {{name}}</div>
</template>

<script>
export default {
    initData() {
        return {name: 'San'};
    }
};
</script>

<style lang="less" scoped>
.app { color: red; }
</style>
"#;

fn entry(options: LoaderOptions, source: &str) -> (String, Vec<String>) {
    let loader = Loader::new(options);
    let request = LoadRequest {
        path: "App.san",
        source,
        query: "",
    };
    match loader.run(&request).unwrap() {
        LoaderOutput::Entry { code, requests } => (code, requests),
        other => panic!("expected an entry, got {:?}", other),
    }
}

#[test]
fn test_entry_es_module() {
    let options = LoaderOptions {
        es_module: true,
        ..Default::default()
    };
    let (code, _) = entry(options, APP);
    assert_snapshot!(code, @r###"
    import normalize from "san-loader/runtime/normalize";
    import style0 from "App.san?san&type=style&index=0&lang=less&scoped";
    var injectStyles = function () {
        return [style0];
    };
    var template = "\n  <div class=\"app\">Hello {{name}}</div>\n";
    import script from "App.san?san&type=script&index=0&lang=js";
    export default normalize(script, template, injectStyles);
    /* san-hmr component */
    "###);
}

#[test]
fn test_entry_classic() {
    let options = LoaderOptions {
        compile_template: CompileTarget::APack,
        ..Default::default()
    };
    let (code, requests) = entry(options, "<template><p></p></template>");
    assert_snapshot!(code, @r###"
    var normalize = require("san-loader/runtime/normalize");
    var injectStyles = null;
    var template = require("App.san?san&type=template&index=0&lang=html&compileTemplate=aPack");
    var script = require("App.san?san&type=script&index=0&lang=js");
    script = script.__esModule ? script.default : script;
    module.exports.default = normalize(script, template, injectStyles);
    /* san-hmr component */
    "###);
    assert_eq!(requests.len(), 2);
}

#[test]
fn test_deferred_requests_round_trip() {
    let options = LoaderOptions {
        compile_template: CompileTarget::ANode,
        ..Default::default()
    };
    let loader = Loader::new(options.clone());
    let (_, requests) = entry(options, APP);
    assert_eq!(requests.len(), 3);
    let codes: Vec<_> = requests
        .iter()
        .map(|r| loader.resolve(r, APP).unwrap().code)
        .collect();
    assert!(matches!(&codes[0], BlockCode::Tree(tree) if tree.tag_name.as_deref() == Some("div")));
    assert_eq!(codes[1], BlockCode::Text("\n.app { color: red; }\n".into()));
    assert!(matches!(&codes[2], BlockCode::Text(s) if s.contains("initData")));
}

#[test]
fn test_hello_template_extraction() {
    let loader = Loader::new(LoaderOptions::default());
    let result = loader
        .resolve(
            "App.san?san&type=template&index=0&lang=html",
            "<template>Hello {{name}}</template>",
        )
        .unwrap();
    assert_eq!(result.code, BlockCode::Text("Hello {{name}}".into()));
}

#[test]
fn test_extraction_is_idempotent() {
    let loader = Loader::new(LoaderOptions::default());
    let request = "App.san?san&type=style&index=0&lang=less";
    let first = loader.resolve(request, APP).unwrap();
    let second = loader.resolve(request, APP).unwrap();
    assert_eq!(first.code, second.code);
}

#[test]
fn test_source_map_points_at_block() {
    let source = "<template>\n  <p></p>\n</template>\n\n<script>\nexport default {};\n</script>\n";
    let loader = Loader::new(LoaderOptions {
        source_map: true,
        ..Default::default()
    });
    let result = loader
        .resolve("App.san?san&type=script&index=0&lang=js", source)
        .unwrap();
    let map = result.map.expect("map requested");
    assert_eq!(map.sources, vec!["App.san"]);
    // the script content starts right after `<script>` on line 5
    assert_eq!(map.original_position_for(1), Some((5, 8)));
    assert_eq!(map.original_position_for(2), Some((6, 8)));
}

#[test]
fn test_pack_of_empty_component_root() {
    let loader = Loader::new(LoaderOptions::default());
    let result = loader
        .resolve(
            "App.san?san&type=template&compileTemplate=aPack",
            "<template><div></div></template>",
        )
        .unwrap();
    assert_eq!(result.code, BlockCode::Packed(vec![]));
    assert_eq!(result.code.to_module_source(true).unwrap(), "export default [];\n");
}

#[test]
fn test_pack_single_root_without_auto_fill() {
    let loader = Loader::new(LoaderOptions {
        auto_fill_style_and_id: false,
        ..Default::default()
    });
    let result = loader
        .resolve(
            "App.san?san&type=template&compile-template=aPack",
            "<template><a>x</a></template>",
        )
        .unwrap();
    let json = result.code.to_module_source(false).unwrap();
    assert_eq!(json, "module.exports = [1,\"a\",0,0,0,1,2,3,\"x\"];\n");
}

#[test]
fn test_compile_ahead_requires_html() {
    let loader = Loader::new(LoaderOptions::default());
    let err = loader
        .resolve(
            "App.san?san&type=template&lang=pug&compileTemplate=aNode",
            "<template lang=\"pug\">p hi</template>",
        )
        .unwrap_err();
    assert!(matches!(err, SfcError::Config(_)));
}

#[test]
fn test_auto_inserted_script() {
    let result = parse_sfc("<template><p></p></template>", SfcParseOptions::default()).unwrap();
    assert!(result.descriptor.has(BlockKind::Script));
    let script = result.descriptor.script().unwrap();
    assert!(script.synthetic);
    assert_eq!(script.content(result.source()), "");
    let joined: String = result
        .descriptor
        .blocks
        .iter()
        .map(|b| b.span(result.source()))
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(joined, result.source());
}

#[test]
fn test_src_blocks_are_deferred() {
    let (code, requests) = entry(
        LoaderOptions::default(),
        "<template src=\"./app.html\"></template><script src=\"./app.js\"></script>",
    );
    assert!(code.contains(
        "var template = require(\"App.san?san&type=template&index=0&lang=html&src=./app.html\");"
    ));
    assert_eq!(
        requests,
        vec![
            "App.san?san&type=template&index=0&lang=html&src=./app.html",
            "App.san?san&type=script&index=0&lang=js&src=./app.js",
        ]
    );
}

#[test]
fn test_src_blocks_forward_to_their_file() {
    let source = "<template src=\"./app.html\"></template>\n<script src=\"./app.js\"></script>\n<style src=\"./t.css\"/>";
    let loader = Loader::new(LoaderOptions::default());
    let request = LoadRequest {
        path: "App.san",
        source,
        query: "",
    };
    let requests = match loader.run(&request).unwrap() {
        LoaderOutput::Entry { requests, .. } => requests,
        LoaderOutput::Block(_) => panic!("expected an entry module"),
    };
    let codes: Vec<_> = requests
        .iter()
        .map(|r| {
            assert!(r.starts_with("App.san?"));
            let result = loader.resolve(r, source).unwrap();
            assert!(result.map.is_none());
            result.code.as_text().unwrap().to_owned()
        })
        .collect();
    assert_eq!(
        codes,
        vec![
            "module.exports = require(\"./app.html\");\n",
            "@import \"./t.css\";\n",
            "module.exports = require(\"./app.js\");\n",
        ]
    );
    let es = Loader::new(LoaderOptions {
        es_module: true,
        ..Default::default()
    });
    let script = es
        .resolve("App.san?san&type=script&index=0&lang=js&src=./app.js", source)
        .unwrap();
    assert_eq!(script.code.as_text(), Some("export { default } from \"./app.js\";\n"));
}

#[test]
fn test_src_template_cannot_compile_ahead() {
    let source = "<template src=\"./app.html\"></template>";
    let loader = Loader::new(LoaderOptions::default());
    let err = loader
        .resolve("App.san?san&type=template&index=0&compileTemplate=aPack", source)
        .unwrap_err();
    assert!(matches!(err, SfcError::Config(_)));
}

#[test]
fn test_unclosed_block_fails_request() {
    let loader = Loader::new(LoaderOptions::default());
    let request = LoadRequest {
        path: "App.san",
        source: "<template><p></p>",
        query: "",
    };
    assert!(matches!(loader.run(&request), Err(SfcError::Parse { .. })));
}

#[test]
fn test_missing_style_index_is_empty() {
    let loader = Loader::new(LoaderOptions::default());
    let result = loader
        .resolve("App.san?san&type=style&index=3", APP)
        .unwrap();
    assert_eq!(result.code, BlockCode::Text(String::new()));
}
