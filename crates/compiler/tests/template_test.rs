mod common;

use common::TestErrorHandler;
use compiler::error::{CompilationErrorKind, VecErrorHandler};
use compiler::tokenizer::{Locatable, Token, TokenizeOption, Tokenizer};
use compiler::{
    pack, parse_component_template, parse_template, ComponentTemplate, TemplateOption,
    TrimWhitespace,
};
use insta::assert_snapshot;
use serde_json::json;

fn component(template: &str) -> ComponentTemplate<'_> {
    ComponentTemplate {
        template,
        trim_whitespace: TrimWhitespace::None,
        delimiters: ("{{", "}}"),
        auto_fill_style_and_id: true,
    }
}

#[test]
fn test_component_tree_json() {
    let src = r#"<div class="a" on-click="go"><span s-if="ok">{{ name | upper }}</span></div>"#;
    let node = parse_component_template(&component(src), TestErrorHandler);
    let expected = json!({
        "tagName": "div",
        "props": [
            {"name": "class", "expr": {"type": "string", "value": "a"}, "x": true},
            {"name": "style", "expr": {"type": "interp", "expr": "style", "filters": ["_xstyle"]}},
            {"name": "id", "expr": {"type": "interp", "expr": "id", "filters": []}},
        ],
        "events": [
            {"name": "click", "expr": {"type": "raw", "code": "go"}},
        ],
        "children": [{
            "tagName": "span",
            "directives": {"if": {"value": {"type": "raw", "code": "ok"}}},
            "children": [
                {"textExpr": {"type": "interp", "expr": "name", "filters": ["upper"]}},
            ],
        }],
    });
    assert_eq!(serde_json::to_value(&node).unwrap(), expected);
}

#[test]
fn test_custom_delimiters() {
    let template = ComponentTemplate {
        delimiters: ("${", "}"),
        ..component("<p>a ${b}</p>")
    };
    let node = parse_component_template(&template, TestErrorHandler);
    let text = serde_json::to_value(&node.children[0]).unwrap();
    assert_eq!(
        text,
        json!({"textExpr": {"type": "text", "segs": [
            {"type": "string", "value": "a "},
            {"type": "interp", "expr": "b", "filters": []},
        ]}})
    );
}

#[test]
fn test_trim_blank() {
    let option = TemplateOption {
        trim_whitespace: TrimWhitespace::Blank,
        ..Default::default()
    };
    let root = parse_template("<ul>\n  <li>a</li>\n</ul>", &option, TestErrorHandler);
    let ul = &root.children[0];
    assert_eq!(ul.children.len(), 1);
    assert_eq!(ul.children[0].tag_name.as_deref(), Some("li"));
}

#[test]
fn test_packed_json() {
    let root = parse_template(r#"<p title="{{t}}">x</p>"#, &TemplateOption::default(), TestErrorHandler);
    let packed = serde_json::to_string(&pack(&root.children[0])).unwrap();
    assert_snapshot!(packed, @r###"[1,"p",1,"title",0,4,"t",0,0,0,1,2,3,"x"]"###);
}

#[test]
fn test_else_without_if() {
    let eh = VecErrorHandler::default();
    parse_template("<div s-else></div>", &TemplateOption::default(), eh.clone());
    let kinds: Vec<_> = eh.take_errors().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![CompilationErrorKind::SElseNoAdjacentIf]);
}

#[test]
fn test_token_positions() {
    let tokenizer = Tokenizer::new(TokenizeOption::default());
    let mut tokens = tokenizer.scan("<template>\n  <p a=\"1\"/></template>", TestErrorHandler);
    let mut starts = vec![];
    while let Some(token) = tokens.next() {
        let start = tokens.last_position();
        let name = match token {
            Token::StartTag(tag) => tag.name,
            Token::EndTag(name) => name,
            Token::Text(_) => "#text",
            _ => "#other",
        };
        starts.push((name, start.line, start.column));
    }
    assert_eq!(
        starts,
        vec![("template", 1, 1), ("#text", 1, 11), ("p", 2, 3), ("template", 2, 13)]
    );
}
