use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use path_clean::PathClean;

pub mod ast_print;
pub mod pretty_error;

pub use pretty_error::{report, PrettyErrorHandler};

pub fn absolute_path(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    }
    .clean();

    Ok(absolute_path)
}

pub fn get_delimiters(delimiters: String) -> Result<(String, String)> {
    let split_delimiter = delimiters.split_once(' ');
    match split_delimiter {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => bail!("The delimiter argument should be split by one whitespace"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_delimiters() {
        let d = get_delimiters("${ }".into()).unwrap();
        assert_eq!(d, ("${".to_owned(), "}".to_owned()));
        assert!(get_delimiters("{{}}".into()).is_err());
        assert!(get_delimiters(" }}".into()).is_err());
    }

    #[test]
    fn test_absolute_path() {
        let path = absolute_path("a/../App.san").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("App.san"));
        assert!(!path.to_string_lossy().contains(".."));
    }
}
