//! Virtual module paths.
//!
//! Store paths are forward-slash separated, extension-less and relative to
//! the store root (`mesh/uniforms`, not `/mesh/uniforms.glsl`). Resolution is
//! purely lexical and never touches the filesystem.

/// Collapses runs of `/` into a single separator.
#[must_use]
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !last_was_slash {
                out.push(c);
            }
            last_was_slash = true;
        } else {
            out.push(c);
            last_was_slash = false;
        }
    }
    out
}

/// Directory part of a unit name: `mesh/vertex` → `mesh`, `vertex` → `.`.
#[must_use]
pub fn dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(idx) => trimmed[..idx].trim_end_matches('/'),
        None if path.starts_with('/') => "/",
        None => ".",
    }
}

/// Removes the file extension of the last path segment, if any.
#[must_use]
pub fn strip_extension(path: &str) -> &str {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    let segment = &path[segment_start..];
    match segment.rfind('.') {
        Some(dot) if dot > 0 && segment != ".." => &path[..segment_start + dot],
        _ => path,
    }
}

/// Resolves `path` against `root` and returns the store key.
///
/// `root` is itself resolved against the store root first, so `"mesh"`,
/// `"/mesh"` and `"./mesh"` are equivalent. `..` never climbs above the
/// store root.
#[must_use]
pub fn resolve(path: &str, root: &str) -> String {
    let path = strip_extension(path);
    let mut segments: Vec<&str> = Vec::new();

    let parts = if path.starts_with('/') {
        path.split('/').collect::<Vec<_>>()
    } else {
        root.split('/').chain(path.split('/')).collect()
    };

    for part in parts {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    segments.join("/")
}
