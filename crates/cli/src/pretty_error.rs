use anyhow::Result;
use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFiles,
    term::{
        self,
        termcolor::{ColorChoice, StandardStream},
    },
};
use compiler::error::{CompilationError, ErrorHandler};
use compiler::SourceLocation;
use sfc::SfcError;

#[derive(Clone)]
pub struct PrettyErrorHandler {
    name: String,
    source: String,
}

impl PrettyErrorHandler {
    pub fn new(name: String, source: String) -> Self {
        Self { name, source }
    }
}

impl ErrorHandler for PrettyErrorHandler {
    fn on_error(&self, err: CompilationError) {
        emit(&self.name, &self.source, err.location, &err.to_string());
    }
}

fn emit(name: &str, source: &str, location: SourceLocation, message: &str) {
    let mut files = SimpleFiles::new();
    let file = files.add(name, source);
    let diagnostic = Diagnostic::error()
        .with_message(message)
        .with_labels(vec![Label::primary(file, location)]);

    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = codespan_reporting::term::Config::default();

    let mut lock = writer.lock();
    if let Err(e) = term::emit(&mut lock, &config, &files, &diagnostic) {
        log::error!("unable to generate codespan diagnostic: {}", e);
    }
}

/// Renders a located loader error against its source before passing it on.
pub fn report<T>(result: Result<T, SfcError>, name: &str, source: &str) -> Result<T> {
    result.map_err(|err| {
        if let Some(location) = err.location() {
            emit(name, source, location, &err.to_string());
        }
        err.into()
    })
}
