//! APack: a flat, JSON friendly serialization of an ANode tree.
//!
//! Every node is written prefix-first: a type code, its fixed fields and
//! then counted lists. Absent optional fields are written as `null`.
//!
//! | item       | layout                                                        |
//! |------------|---------------------------------------------------------------|
//! | element    | `1, tag, #props, props.., #events, events.., #dirs, dirs.., #children, children..` |
//! | text node  | `2, expr`                                                     |
//! | prop       | `name, x, expr`                                               |
//! | event      | `name, #modifiers, modifiers.., expr`                         |
//! | directive  | `name, expr or null, item, index, trackBy`                    |
//! | expression | `3, value` / `4, expr, #filters, filters..` / `5, #segs, segs..` / `6, code` / `7, 0 or 1` |

use super::anode::{ADirective, AEvent, ANode, AProp, Expr};
#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum PackItem {
    Num(usize),
    Str(String),
    Null,
}

pub type APack = Vec<PackItem>;

const ELEMENT: usize = 1;
const TEXT_NODE: usize = 2;
const STRING: usize = 3;
const INTERP: usize = 4;
const TEXT: usize = 5;
const RAW: usize = 6;
const BOOL: usize = 7;

impl From<usize> for PackItem {
    fn from(n: usize) -> Self {
        PackItem::Num(n)
    }
}

impl From<&str> for PackItem {
    fn from(s: &str) -> Self {
        PackItem::Str(s.to_owned())
    }
}

impl From<Option<&str>> for PackItem {
    fn from(s: Option<&str>) -> Self {
        s.map_or(PackItem::Null, PackItem::from)
    }
}

pub fn pack(node: &ANode) -> APack {
    let mut packer = Packer { out: vec![] };
    packer.node(node);
    packer.out
}

struct Packer {
    out: APack,
}

impl Packer {
    fn push<T: Into<PackItem>>(&mut self, item: T) {
        self.out.push(item.into());
    }

    fn node(&mut self, node: &ANode) {
        if let Some(expr) = &node.text_expr {
            self.push(TEXT_NODE);
            self.expr(expr);
            return;
        }
        self.push(ELEMENT);
        self.push(node.tag_name.as_deref().unwrap_or(""));
        self.push(node.props.len());
        node.props.iter().for_each(|p| self.prop(p));
        self.push(node.events.len());
        node.events.iter().for_each(|e| self.event(e));
        self.push(node.directives.len());
        for (name, dir) in &node.directives {
            self.directive(name, dir);
        }
        self.push(node.children.len());
        node.children.iter().for_each(|c| self.node(c));
    }

    fn prop(&mut self, prop: &AProp) {
        self.push(prop.name.as_str());
        self.push(prop.x as usize);
        self.expr(&prop.expr);
    }

    fn event(&mut self, event: &AEvent) {
        self.push(event.name.as_str());
        self.push(event.modifiers.len());
        for m in &event.modifiers {
            self.push(m.as_str());
        }
        self.expr(&event.expr);
    }

    fn directive(&mut self, name: &str, dir: &ADirective) {
        self.push(name);
        match &dir.value {
            Some(expr) => self.expr(expr),
            None => self.push(PackItem::Null),
        }
        self.push(dir.item.as_deref());
        self.push(dir.index.as_deref());
        self.push(dir.track_by.as_deref());
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::String { value } => {
                self.push(STRING);
                self.push(value.as_str());
            }
            Expr::Interp { expr, filters } => {
                self.push(INTERP);
                self.push(expr.as_str());
                self.push(filters.len());
                for f in filters {
                    self.push(f.as_str());
                }
            }
            Expr::Text { segs } => {
                self.push(TEXT);
                self.push(segs.len());
                segs.iter().for_each(|s| self.expr(s));
            }
            Expr::Raw { code } => {
                self.push(RAW);
                self.push(code.as_str());
            }
            Expr::Bool { value } => {
                self.push(BOOL);
                self.push(*value as usize);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::anode::{parse_template, TemplateOption};
    use crate::error::test::TestErrorHandler;

    fn s(v: &str) -> PackItem {
        PackItem::from(v)
    }
    fn n(v: usize) -> PackItem {
        PackItem::from(v)
    }

    #[test]
    fn test_pack_element() {
        let root = parse_template("<p title=\"t\">Hi</p>", &TemplateOption::default(), TestErrorHandler);
        let packed = pack(&root.children[0]);
        let expected = vec![
            n(1), s("p"),
            n(1), s("title"), n(0), n(3), s("t"),
            n(0),
            n(0),
            n(1), n(2), n(3), s("Hi"),
        ];
        assert_eq!(packed, expected);
    }

    #[test]
    fn test_pack_directive() {
        let root = parse_template(r#"<i s-if="a"></i>"#, &TemplateOption::default(), TestErrorHandler);
        let packed = pack(&root.children[0]);
        let expected = vec![
            n(1), s("i"),
            n(0),
            n(0),
            n(1), s("if"), n(6), s("a"), PackItem::Null, PackItem::Null, PackItem::Null,
            n(0),
        ];
        assert_eq!(packed, expected);
    }

    #[test]
    fn test_pack_text_node() {
        let root = parse_template("{{ a | b }}", &TemplateOption::default(), TestErrorHandler);
        let packed = pack(&root.children[0]);
        assert_eq!(packed, vec![n(2), n(4), s("a"), n(1), s("b")]);
    }

    #[test]
    fn test_pack_serializes_flat() {
        let packed = vec![n(2), n(3), s("x"), PackItem::Null];
        let json = serde_json::to_string(&packed).unwrap();
        assert_eq!(json, r#"[2,3,"x",null]"#);
    }
}
