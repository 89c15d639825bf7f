use super::SourceLocation;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum CompilationErrorKind {
    AbruptClosingOfEmptyComment,
    CDataInHtmlContent,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    EofBeforeTagName,
    EofInComment,
    EofInTag,
    IncorrectlyClosedComment,
    IncorrectlyOpenedComment,
    InvalidFirstCharacterOfTagName,
    MissingAttributeValue,
    MissingEndTagName,
    MissingWhitespaceBetweenAttributes,
    NestedComment,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,

    // San-specific parse errors
    InvalidEndTag,
    MissingEndTag,
    MissingInterpolationEnd,

    // directive errors
    SIfNoExpression,
    SElseNoAdjacentIf,
    SForNoExpression,
    SForMalformedExpression,
}

impl CompilationErrorKind {
    /// Errors raised while scanning the inside of a start tag:
    /// attribute syntax, quoting and EOF before `>`.
    pub fn is_tag_syntax_error(&self) -> bool {
        use CompilationErrorKind::*;
        matches!(
            self,
            DuplicateAttribute
                | EofInTag
                | MissingAttributeValue
                | MissingWhitespaceBetweenAttributes
                | UnexpectedEqualsSignBeforeAttributeName
                | UnexpectedCharacterInAttributeName
                | UnexpectedCharacterInUnquotedAttributeValue
                | UnexpectedSolidusInTag
        )
    }
}

#[derive(Debug, Clone)]
pub struct CompilationError {
    pub kind: CompilationErrorKind,
    pub additional_message: Option<String>,
    pub location: SourceLocation,
}

impl CompilationError {
    pub fn new(kind: CompilationErrorKind) -> Self {
        Self {
            kind,
            additional_message: None,
            location: Default::default(),
        }
    }
    pub fn with_location(mut self, loc: SourceLocation) -> Self {
        self.location = loc;
        self
    }
    pub fn with_additional_message(mut self, msg: String) -> Self {
        self.additional_message = Some(msg);
        self
    }

    pub fn msg(&self) -> &'static str {
        msg(&self.kind)
    }
}

#[cold]
#[inline(never)]
fn msg(kind: &CompilationErrorKind) -> &'static str {
    use CompilationErrorKind::*;
    match *kind {
        AbruptClosingOfEmptyComment => "Illegal comment.",
        CDataInHtmlContent => "CDATA section is allowed only in XML context.",
        DuplicateAttribute => "Duplicate attribute.",
        EndTagWithAttributes => "End tag cannot have attributes.",
        EndTagWithTrailingSolidus => r#"Illegal "/" in tags."#,
        EofBeforeTagName => "Unexpected EOF in tag.",
        EofInComment => "Unexpected EOF in comment.",
        EofInTag => "Unexpected EOF in tag.",
        IncorrectlyClosedComment => "Incorrectly closed comment.",
        IncorrectlyOpenedComment => "Incorrectly opened comment.",
        InvalidFirstCharacterOfTagName => "Illegal tag name. Use '&lt;' to print '<'.",
        UnexpectedEqualsSignBeforeAttributeName => "Attribute name was expected before '='.",
        MissingAttributeValue => "Attribute value was expected.",
        MissingEndTagName => "End tag name was expected.",
        MissingWhitespaceBetweenAttributes => "Whitespace was expected.",
        NestedComment => "Unexpected '<!--' in comment.",
        UnexpectedCharacterInAttributeName =>
            "Attribute name cannot contain U+0022 (\"), U+0027 ('), and U+003C (<).",
        UnexpectedCharacterInUnquotedAttributeValue =>
            "Unquoted attribute value cannot contain U+0022 (\"), U+0027 (\'), U+003C (<), U+003D (=), and U+0060 (`).",
        UnexpectedQuestionMarkInsteadOfTagName => "'<?' is allowed only in XML context.",
        UnexpectedSolidusInTag => "Illegal '/' in tags.",

        InvalidEndTag => "Invalid end tag.",
        MissingEndTag => "Element is missing end tag.",
        MissingInterpolationEnd => "Interpolation end sign was not found.",

        SIfNoExpression => "s-if/s-elif is missing expression.",
        SElseNoAdjacentIf => "s-else/s-elif has no adjacent s-if.",
        SForNoExpression => "s-for is missing expression.",
        SForMalformedExpression => "s-for has invalid expression.",
    }
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(additional) = &self.additional_message {
            write!(f, "{}{}", self.msg(), additional)
        } else {
            write!(f, "{}", self.msg())
        }
    }
}

impl std::error::Error for CompilationError {}

/// This trait handles error occured in the compilation.
/// NB: clone bound is needed since scan and tree building
/// both requires ownership of a error report.
/// Rc/RefCell is a good way to implement ErrorHandler if
/// collecting errors in compilation pass is desired.
pub trait ErrorHandler: Clone {
    // cannot use mut ref due to borrow semantics
    // use RefCell as implementation
    fn on_error(&self, _: CompilationError) {}
}

#[derive(Clone, Default)]
pub struct VecErrorHandler {
    errors: Rc<RefCell<Vec<CompilationError>>>,
}

impl VecErrorHandler {
    /// Drains every collected error, leaving the handler empty.
    pub fn take_errors(&self) -> Vec<CompilationError> {
        self.errors.borrow_mut().drain(..).collect()
    }
}

impl ErrorHandler for VecErrorHandler {
    fn on_error(&self, e: CompilationError) {
        self.errors.borrow_mut().push(e);
    }
}

#[cfg(test)]
pub mod test {
    use super::ErrorHandler;
    #[derive(Clone)]
    pub struct TestErrorHandler;
    impl ErrorHandler for TestErrorHandler {}
}
