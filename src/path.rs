//! Path arithmetic over forward-slash strings.
//!
//! Asset paths are plain strings rather than `PathBuf`s: references inside
//! file contents are always written with forward slashes, so every path is
//! normalized to that form on the way in and never converted back to the
//! host convention. Windows drive prefixes (`c:`) are dropped.

/// Normalize separators to `/` and strip a leading drive letter.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return path[2..].to_string();
    }
    path
}

/// Final path segment.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Extension of the final segment including the dot, or `""`.
///
/// A leading dot does not start an extension (`.htaccess` has none), and only
/// the last dot counts (`app.js.map` has `.map`).
pub fn extname(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &name[idx..],
    }
}

/// Path with the extension of its final segment removed.
pub fn without_ext(path: &str) -> &str {
    &path[..path.len() - extname(path).len()]
}

/// Final segment without its extension.
pub fn stem(path: &str) -> &str {
    without_ext(basename(path))
}

/// Everything up to and including the last `/`, or `""` for a bare name.
pub fn dir_with_sep(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Directory portion without the trailing slash.
///
/// `/index.html` yields `/`, a bare name yields `.`.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// Join a directory and a file name, resolving `.` and `..` segments.
pub fn join_path(directory: &str, filename: &str) -> String {
    let joined = format!("{}/{}", normalize(directory), normalize(filename));
    resolve_segments(&joined)
}

fn resolve_segments(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    let body = segments.join("/");
    if absolute {
        format!("/{}", body)
    } else {
        body
    }
}

/// Express `path` relative to `base`.
///
/// Only a path that overlaps with `base` is truncated; the result then carries a
/// leading slash. `leading_slash` forces the slash on (`Some(true)`) or off
/// (`Some(false)`); `None` leaves whatever the truncation produced.
pub fn relative_path(base: &str, path: &str, leading_slash: Option<bool>) -> String {
    if base == path {
        return String::new();
    }

    let base = format!("{}/", normalize(base).trim_end_matches('/'));
    let mut path = normalize(path);

    if path.starts_with(&base) {
        path = format!("/{}", &path[base.len()..]);
    }

    match leading_slash {
        Some(true) if !path.starts_with('/') => format!("/{}", path),
        Some(false) if path.starts_with('/') => path[1..].to_string(),
        _ => path,
    }
}

/// Relative traversal between two directories, one `..` per unshared segment
/// of `from`. Both arguments are slash-separated directory paths.
pub fn relative_dir(from: &str, to: &str) -> String {
    let from: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let shared = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..").take(from.len() - shared).collect();
    parts.extend_from_slice(&to[shared..]);
    parts.join("/")
}

/// Join a URL prefix and a path with exactly one slash between them.
pub fn join_url(prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Longest common segment prefix of two directories, with a trailing slash.
pub fn common_base(a: &str, b: &str) -> String {
    let a = normalize(a);
    let b = normalize(b);
    let common: Vec<&str> = a
        .split('/')
        .zip(b.split('/'))
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect();

    let mut joined = common.join("/");
    if !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// Ensure a directory path ends with exactly one slash.
pub fn with_trailing_sep(dir: &str) -> String {
    format!("{}/", normalize(dir).trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path_windows() {
        assert_eq!(join_path("d:\\first\\second", "images.png"), "/first/second/images.png");
        assert_eq!(join_path("first\\second", "images.png"), "first/second/images.png");
    }

    #[test]
    fn test_join_path_posix() {
        assert_eq!(join_path("/first/second", "images.png"), "/first/second/images.png");
        assert_eq!(join_path("first/second", "images.png"), "first/second/images.png");
        assert_eq!(join_path("../img", "logo.png"), "../img/logo.png");
        assert_eq!(join_path("/a/b/../c", "./d.js"), "/a/c/d.js");
    }

    #[test]
    fn test_relative_path_only_truncates_overlap() {
        assert_eq!(relative_path("/base/", "sub/index.html", None), "sub/index.html");
        assert_eq!(relative_path("/base/", "/sub/index.html", None), "/sub/index.html");
        assert_eq!(relative_path("/base/", "/base/sub/index.html", None), "/sub/index.html");
        assert_eq!(relative_path("/base", "/base/sub/index.html", None), "/sub/index.html");
    }

    #[test]
    fn test_relative_path_windows() {
        assert_eq!(
            relative_path("c:\\base\\", "c:\\base\\sub\\index.html", None),
            "/sub/index.html"
        );
        assert_eq!(
            relative_path("c:\\base", "c:\\base\\sub\\index.html", Some(false)),
            "sub/index.html"
        );
        assert_eq!(relative_path("c:\\base\\", "c:\\base\\index.html", Some(false)), "index.html");
    }

    #[test]
    fn test_relative_path_starting_slash() {
        assert_eq!(relative_path("/base/", "/base/sub/index.html", Some(false)), "sub/index.html");
        assert_eq!(relative_path("/base/", "/base/index.html", Some(false)), "index.html");
        assert_eq!(relative_path("/base/", "sub/index.html", Some(true)), "/sub/index.html");
        assert_eq!(relative_path("/same", "/same", Some(true)), "");
    }

    #[test]
    fn test_extname_and_stem() {
        assert_eq!(extname("/a/app.js"), ".js");
        assert_eq!(extname("/a/app.js.map"), ".map");
        assert_eq!(extname("/a/.htaccess"), "");
        assert_eq!(extname("/a.d/README"), "");
        assert_eq!(stem("/a/app.js.map"), "app.js");
        assert_eq!(stem("font1 space.ttf"), "font1 space");
        assert_eq!(without_ext("../script/short.js"), "../script/short");
    }

    #[test]
    fn test_dirnames() {
        assert_eq!(dir_with_sep("/a/b/c.js"), "/a/b/");
        assert_eq!(dir_with_sep("/c.js"), "/");
        assert_eq!(dir_with_sep("c.js"), "");
        assert_eq!(dirname("/a/b/c.js"), "/a/b");
        assert_eq!(dirname("/c.js"), "/");
        assert_eq!(dirname("c.js"), ".");
    }

    #[test]
    fn test_relative_dir() {
        assert_eq!(relative_dir("third", "other"), "../other");
        assert_eq!(relative_dir("third", "thirder"), "../thirder");
        assert_eq!(relative_dir("third/fourth", ""), "../..");
        assert_eq!(relative_dir("third/fourth/fifth", "other"), "../../../other");
        assert_eq!(relative_dir("third", "other/advanced"), "../other/advanced");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://example.com/", "/index.html"), "http://example.com/index.html");
        assert_eq!(join_url("http://example.com", "css/a.css"), "http://example.com/css/a.css");
    }

    #[test]
    fn test_common_base() {
        assert_eq!(common_base("/project/dist/css/", "/project/dist/js/"), "/project/dist/");
        assert_eq!(common_base("/project/dist/", "/project/dist/"), "/project/dist/");
        assert_eq!(common_base("/project/a", "/other/b"), "/");
    }
}
