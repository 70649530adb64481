//! Entry path normalization.
//!
//! Addon archives are produced by many tools. Some write Windows separators,
//! and many wrap the whole pack in a single top-level folder
//! (`MyPack/manifest.json`). These helpers bring paths to the flat,
//! `/`-separated form the merge engine compares on.

/// Rewrite `\` separators to `/`.
#[must_use]
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Return the single leading directory shared by every path, if any.
///
/// The prefix is only reported when *every* path has at least two non-empty
/// segments and they all start with the same first segment. One file at the
/// archive root is enough to disable stripping.
///
/// The returned prefix includes its trailing `/`.
#[must_use]
pub fn strip_common_root<S: AsRef<str>>(paths: &[S]) -> Option<String> {
    let mut first: Option<&str> = None;
    for path in paths {
        let mut segments = path.as_ref().split('/').filter(|s| !s.is_empty());
        let head = segments.next()?;
        segments.next()?;
        match first {
            None => first = Some(head),
            Some(existing) if existing == head => {}
            Some(_) => return None,
        }
    }
    first.map(|head| format!("{head}/"))
}
