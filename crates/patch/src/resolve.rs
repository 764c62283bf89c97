//! Target path resolution for model-supplied edit paths.
//!
//! Order: exact known path, suffix of a known path on a component
//! boundary, the active file, an absolute path as-is, then the project root
//! joined with the path. Separators are compared as `/`, and paths that
//! fall through to the last two steps are normalised lexically so one file
//! always resolves to one key.

use quill_core::normalize_lexically;
use std::path::Path;
use tracing::debug;

fn to_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

fn lexical(path: &Path) -> String {
    normalize_lexically(path).to_string_lossy().into_owned()
}

/// Whether `candidate` ends with `file` on a path-component boundary.
fn is_suffix(candidate: &str, file: &str) -> bool {
    let candidate = to_slashes(candidate);
    let file = to_slashes(file);
    let file = file.trim_start_matches("./");
    if file.is_empty() {
        return false;
    }
    candidate == file || candidate.ends_with(&format!("/{file}"))
}

fn is_absolute(file: &str) -> bool {
    Path::new(file).is_absolute() || file.starts_with('/') || file.starts_with('\\') || file.contains(':')
}

/// Resolve `file` to the path an edit should be applied to.
///
/// `known` is the set of paths the host knows about (loaded or in the tree).
/// Returns `None` when the path is neither known nor absolute and there is
/// no project root.
pub fn resolve_target(
    file: &str,
    known: &[&str],
    active_file: Option<&str>,
    root: Option<&Path>,
) -> Option<String> {
    let wanted = to_slashes(file);
    let cleaned = to_slashes(&lexical(Path::new(file)));

    if let Some(exact) = known.iter().find(|p| {
        let p = to_slashes(p);
        p == wanted || p == cleaned
    }) {
        return Some(exact.to_string());
    }

    let mut suffix_matches = known.iter().filter(|p| is_suffix(p, &cleaned));
    if let Some(found) = suffix_matches.next() {
        if suffix_matches.next().is_some() {
            debug!(file, chosen = %found, "Ambiguous edit path, using first match");
        }
        return Some(found.to_string());
    }

    if let Some(active) = active_file
        && is_suffix(active, &cleaned)
    {
        return Some(active.to_string());
    }

    if is_absolute(file) {
        return Some(lexical(Path::new(file)));
    }

    root.map(|root| lexical(&root.join(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [&str; 3] = [
        "/work/app/src/App.tsx",
        "/work/app/src/util/format.ts",
        "/work/app/src/myformat.ts",
    ];

    #[test]
    fn exact_match() {
        assert_eq!(
            resolve_target("/work/app/src/App.tsx", &KNOWN, None, None).as_deref(),
            Some("/work/app/src/App.tsx")
        );
    }

    #[test]
    fn suffix_match_on_component_boundary() {
        assert_eq!(
            resolve_target("src/App.tsx", &KNOWN, None, None).as_deref(),
            Some("/work/app/src/App.tsx")
        );
        assert_eq!(
            resolve_target("format.ts", &KNOWN, None, None).as_deref(),
            Some("/work/app/src/util/format.ts")
        );
    }

    #[test]
    fn backslashes_are_normalized() {
        let known = ["C:\\work\\app\\src\\main.rs"];
        assert_eq!(
            resolve_target("src/main.rs", &known, None, None).as_deref(),
            Some("C:\\work\\app\\src\\main.rs")
        );
    }

    #[test]
    fn active_file_is_used_when_not_loaded() {
        assert_eq!(
            resolve_target("lib.rs", &[], Some("/work/app/src/lib.rs"), None).as_deref(),
            Some("/work/app/src/lib.rs")
        );
    }

    #[test]
    fn new_file_joins_root() {
        let resolved = resolve_target("src/new.ts", &KNOWN, None, Some(Path::new("/work/app")));
        assert_eq!(resolved.as_deref(), Some("/work/app/src/new.ts"));
    }

    #[test]
    fn absolute_new_file_kept() {
        assert_eq!(
            resolve_target("/tmp/out.txt", &[], None, None).as_deref(),
            Some("/tmp/out.txt")
        );
    }

    #[test]
    fn unresolvable_without_root() {
        assert!(resolve_target("src/new.ts", &KNOWN, None, None).is_none());
    }

    #[test]
    fn dot_slash_prefix_is_ignored() {
        assert_eq!(
            resolve_target("./src/App.tsx", &KNOWN, None, None).as_deref(),
            Some("/work/app/src/App.tsx")
        );
    }

    #[test]
    fn dotted_new_file_paths_share_one_key() {
        let root = Some(Path::new("/work/app"));
        let plain = resolve_target("src/new.ts", &[], None, root);
        assert_eq!(plain.as_deref(), Some("/work/app/src/new.ts"));
        assert_eq!(resolve_target("./src/new.ts", &[], None, root), plain);
        assert_eq!(resolve_target("src/util/../new.ts", &[], None, root), plain);
        assert_eq!(
            resolve_target("/work/app/./src/new.ts", &[], None, None),
            plain
        );
    }

    #[test]
    fn dotted_path_finds_known_file() {
        assert_eq!(
            resolve_target("/work/app/./src/App.tsx", &KNOWN, None, None).as_deref(),
            Some("/work/app/src/App.tsx")
        );
        assert_eq!(
            resolve_target("src/util/../App.tsx", &KNOWN, None, None).as_deref(),
            Some("/work/app/src/App.tsx")
        );
    }
}
