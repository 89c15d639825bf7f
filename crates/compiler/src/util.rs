use phf::{phf_set, Set};

static VOID_TAGS: Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
};

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag)
}

pub fn non_whitespace(c: char) -> bool {
    !c.is_ascii_whitespace()
}

pub fn is_all_whitespace(s: &str) -> bool {
    !s.chars().any(non_whitespace)
}

/// Removes the interpolation delimiters around `src`.
/// An unterminated interpolation keeps everything after the open delimiter.
pub fn strip_delimiters<'a>(src: &'a str, delimiters: &(String, String)) -> &'a str {
    let (open, close) = delimiters;
    let inner = src.strip_prefix(open.as_str()).unwrap_or(src);
    inner.strip_suffix(close.as_str()).unwrap_or(inner)
}

/// Splits `expr | filter1 | filter2(arg)` at top level pipes.
/// `||`, pipes in quotes and pipes in brackets are left alone.
pub fn split_filters(src: &str) -> Vec<String> {
    let bytes = src.as_bytes();
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) => {
                if c == b'\\' {
                    i += 1;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                b'"' | b'\'' | b'`' => quote = Some(c),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b'|' if depth == 0 => {
                    if bytes.get(i + 1) == Some(&b'|') {
                        i += 1;
                    } else {
                        parts.push(src[last..i].trim().to_owned());
                        last = i + 1;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    parts.push(src[last..].trim().to_owned());
    parts
}
