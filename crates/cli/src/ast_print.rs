use compiler::anode::{ANode, Expr};

pub trait AstString {
    fn ast_string(&self, level: usize) -> String;
}

impl AstString for ANode {
    fn ast_string(&self, level: usize) -> String {
        let indent = "  ".repeat(level);
        if let Some(expr) = &self.text_expr {
            return format!("{}Text {}", indent, expr.ast_string(level));
        }
        let tag_name = self.tag_name.as_deref().unwrap_or("<root>");
        let mut lines = vec![format!("{}Element `{}`", indent, tag_name)];
        let inner = "  ".repeat(level + 1);
        for prop in &self.props {
            let x = if prop.x { " (x)" } else { "" };
            lines.push(format!(
                "{}prop {}{} = {}",
                inner,
                prop.name,
                x,
                prop.expr.ast_string(level)
            ));
        }
        for event in &self.events {
            let modifiers: String = event.modifiers.iter().map(|m| format!(":{}", m)).collect();
            lines.push(format!(
                "{}on-{}{} = {}",
                inner,
                event.name,
                modifiers,
                event.expr.ast_string(level)
            ));
        }
        for (name, dir) in &self.directives {
            let value = dir
                .value
                .as_ref()
                .map_or_else(String::new, |v| format!(" = {}", v.ast_string(level)));
            let parts: Vec<_> = [("item", &dir.item), ("index", &dir.index), ("trackBy", &dir.track_by)]
                .iter()
                .filter_map(|(k, v)| v.as_ref().map(|v| format!("{}: {}", k, v)))
                .collect();
            let parts = if parts.is_empty() {
                String::new()
            } else {
                format!(" ({})", parts.join(", "))
            };
            lines.push(format!("{}s-{}{}{}", inner, name, value, parts));
        }
        for child in &self.children {
            lines.push(child.ast_string(level + 1));
        }
        lines.join("\n")
    }
}

impl AstString for Expr {
    fn ast_string(&self, level: usize) -> String {
        match self {
            Expr::String { value } => format!("{:?}", value),
            Expr::Bool { value } => value.to_string(),
            Expr::Interp { expr, filters } => {
                let filters: String = filters.iter().map(|f| format!(" | {}", f)).collect();
                format!("{{{{ {}{} }}}}", expr, filters)
            }
            Expr::Text { segs } => segs
                .iter()
                .map(|s| s.ast_string(level))
                .collect::<Vec<_>>()
                .join(" + "),
            Expr::Raw { code } => format!("`{}`", code),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use compiler::{parse_template, TemplateOption};
    use compiler::error::VecErrorHandler;

    #[test]
    fn test_print_tree() {
        let root = parse_template(
            r#"<ul><li s-for="item, i in list" on-click="pick(i)">{{ item | upper }}!</li></ul>"#,
            &TemplateOption::default(),
            VecErrorHandler::default(),
        );
        let expected = [
            "Element `<root>`",
            "  Element `ul`",
            "    Element `li`",
            "      on-click = `pick(i)`",
            "      s-for = `list` (item: item, index: i)",
            "      Text {{ item | upper }} + \"!\"",
        ]
        .join("\n");
        assert_eq!(root.ast_string(0), expected);
    }
}
