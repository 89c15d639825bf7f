use crate::block::json_string;
use crate::option::LoaderOptions;

/// Marks the module as a component entry for hot module replacement.
pub const HMR_MARKER: &str = "/* san-hmr component */";

/// Joins the import snippets into the component's entry module, which
/// hands script, template and styles to the runtime `normalize` helper.
pub fn assemble(template: &str, style: &str, script: &str, options: &LoaderOptions) -> String {
    let normalize = json_string(&options.normalize_path);
    let mut code = String::with_capacity(template.len() + style.len() + script.len() + 128);
    if options.es_module {
        code.push_str(&format!("import normalize from {};\n", normalize));
    } else {
        code.push_str(&format!("var normalize = require({});\n", normalize));
    }
    code.push_str(style);
    code.push_str(template);
    code.push_str(script);
    code.push_str(if options.es_module {
        "export default normalize(script, template, injectStyles);\n"
    } else {
        "module.exports.default = normalize(script, template, injectStyles);\n"
    });
    code.push_str(HMR_MARKER);
    code.push('\n');
    code
}
