//! Utility functions for paths.

use std::path::{Component, Path, PathBuf};

/// Extend [`std::path::Path`] with utility methods.
pub trait PathExt {
    /// Remove `.` components and resolve `..` components lexically.
    ///
    /// This method calls [`normalize_path`] under the hood.
    fn normalize(&self) -> PathBuf;
}

impl<T> PathExt for T
where
    T: AsRef<Path>,
{
    fn normalize(&self) -> PathBuf {
        self::normalize_path(self)
    }
}

/// Remove `.` components and resolve `..` components lexically.
///
/// Unlike [`std::fs::canonicalize`], the file system is not accessed and
/// symbolic links are not resolved. A `..` that would climb above the root
/// is dropped, a leading `..` of a relative path is kept.
pub fn normalize_path<P>(path: P) -> PathBuf
where
    P: AsRef<Path>,
{
    let mut result: Vec<Component> = Vec::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => match result.last() {
                Some(Component::Normal(_)) => {
                    result.pop();
                },
                Some(Component::RootDir | Component::Prefix(_)) => {},
                Some(Component::ParentDir) | Some(Component::CurDir) | None => {
                    result.push(component);
                },
            },
            _ => result.push(component),
        }
    }

    if result.is_empty() {
        return PathBuf::from(Component::CurDir.as_os_str());
    }

    result.iter().collect()
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(unix)]
    fn normalize_path_unix() {
        const CASES: [(&str, &str); 14] = [
            ("", "."),
            (".", "."),
            ("/", "/"),
            ("/..", "/"),
            ("src/./dist", "src/dist"),
            ("src/../dist", "dist"),
            ("src/js/../../dist", "dist"),
            ("src/../../dist", "../dist"),
            ("../../dist", "../../dist"),
            ("/srv/www/../dist/app.min.js", "/srv/dist/app.min.js"),
            ("/srv/../../dist", "/dist"),
            ("a//b//./c", "a/b/c"),
            ("a/b/..", "a"),
            ("a/..", "."),
        ];

        for (input, expected) in CASES {
            let result = super::normalize_path(input);
            assert_eq!(
                result.to_str().unwrap(),
                expected,
                "\nnormalize_path({input:?}) expected {expected:?} but received {result:?}"
            );
        }
    }
}
