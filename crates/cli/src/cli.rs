use super::CliInput;
use anyhow::Result;
use compiler::{parse_template, TemplateOption};
use san_loader_cli::{ast_print::AstString, report, PrettyErrorHandler};
use serde_yaml::to_writer;
use sfc::{
    parse_sfc, BlockKinds, ExtractionResult, LoadRequest, Loader, LoaderOptions, LoaderOutput,
    SfcParseOptions,
};
use std::io;

pub(super) fn load_to_stdout(input: CliInput) -> Result<()> {
    let (name, source, query, options, show) = input;

    if show.dump_descriptor || show.dump_tree {
        let parse_option = SfcParseOptions {
            filename: name.clone(),
            kinds: BlockKinds::all(),
            auto_add_script_tag: options.auto_add_script_tag,
        };
        let parsed = report(parse_sfc(&source, parse_option), &name, &source)?;
        if show.dump_descriptor {
            println!(r#"=========== Descriptor ==========="#);
            let stdout = io::stdout();
            to_writer(stdout.lock(), &parsed.descriptor)?;
            to_writer(stdout.lock(), &parsed.document)?;
            println!(r#"======= End of Descriptor ========"#);
        }
        if show.dump_tree {
            if let Some(template) = parsed.descriptor.template() {
                let content = template.content(parsed.source());
                print_tree(&name, content, &options);
            }
        }
    }

    let loader = Loader::new(options);
    let request = LoadRequest {
        path: &name,
        source: &source,
        query: &query,
    };
    let es_module = loader.options().es_module;
    match report(loader.run(&request), &name, &source)? {
        LoaderOutput::Block(result) => print_block(&result, es_module)?,
        LoaderOutput::Entry { code, requests } => {
            print!("{}", code);
            if show.follow {
                for block_request in &requests {
                    println!("========== {} ==========", block_request);
                    let result = report(loader.resolve(block_request, &source), &name, &source)?;
                    print_block(&result, es_module)?;
                }
            }
        }
    }
    Ok(())
}

fn print_tree(name: &str, template: &str, options: &LoaderOptions) {
    let option = TemplateOption {
        trim_whitespace: options.trim_whitespace,
        delimiters: options.delimiters.clone(),
    };
    let err_handle = PrettyErrorHandler::new(format!("{} <template>", name), template.to_owned());
    let root = parse_template(template, &option, err_handle);
    println!(r#"============== ANode ============="#);
    println!("{}", root.ast_string(0));
    println!(r#"========== End of ANode =========="#);
}

fn print_block(result: &ExtractionResult, es_module: bool) -> Result<()> {
    let code = result.code.to_module_source(es_module)?;
    print!("{}", code);
    if !code.ends_with('\n') {
        println!();
    }
    if let Some(map) = &result.map {
        println!(r#"=========== Source Map ==========="#);
        println!("{}", serde_json::to_string(map)?);
    }
    Ok(())
}
