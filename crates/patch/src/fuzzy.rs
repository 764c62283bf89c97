//! Whitespace-tolerant line matching.
//!
//! Blank lines are ignored on both sides and every remaining line is compared
//! after trimming and collapsing internal whitespace runs. The first
//! contiguous run of equal lines wins. On a hit, the original lines spanning
//! the run are spliced out and the replacement lines go in their place;
//! everything outside the run is kept byte for byte.

/// Collapse a line to its comparison form.
pub fn normalize_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A line of the original content with its terminator kept separately.
struct Line<'a> {
    text: &'a str,
    ending: &'a str,
}

fn split_lines(content: &str) -> Vec<Line<'_>> {
    content
        .split_inclusive('\n')
        .map(|raw| {
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            let text = text.strip_suffix('\r').unwrap_or(text);
            Line {
                text,
                ending: &raw[text.len()..],
            }
        })
        .collect()
}

/// Original line-index range `[start, end]` of the first normalized match.
pub fn find_line_range(content: &str, search: &str) -> Option<(usize, usize)> {
    let needle: Vec<String> = search
        .lines()
        .map(normalize_line)
        .filter(|l| !l.is_empty())
        .collect();
    if needle.is_empty() {
        return None;
    }

    let haystack: Vec<(usize, String)> = split_lines(content)
        .iter()
        .enumerate()
        .map(|(i, line)| (i, normalize_line(line.text)))
        .filter(|(_, l)| !l.is_empty())
        .collect();

    haystack
        .windows(needle.len())
        .find(|window| window.iter().map(|(_, l)| l).eq(needle.iter()))
        .map(|window| (window[0].0, window[window.len() - 1].0))
}

/// Replace the first normalized match of `search` with `replace`.
///
/// Inserted lines use the line ending of the last matched line. An empty
/// `replace` removes the matched lines entirely.
pub fn replace_lines(content: &str, search: &str, replace: &str) -> Option<String> {
    let (start, end) = find_line_range(content, search)?;
    let lines = split_lines(content);

    let ending = lines[end].ending;
    let eol = if ending.is_empty() {
        if content.contains("\r\n") { "\r\n" } else { "\n" }
    } else {
        ending
    };

    let mut out = String::with_capacity(content.len() + replace.len());
    for line in &lines[..start] {
        out.push_str(line.text);
        out.push_str(line.ending);
    }

    let replacement: Vec<&str> = replace.lines().collect();
    if !replacement.is_empty() {
        out.push_str(&replacement.join(eol));
        out.push_str(ending);
    }

    for line in &lines[end + 1..] {
        out.push_str(line.text);
        out.push_str(line.ending);
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_collapses() {
        assert_eq!(normalize_line("  let   x =\t1; "), "let x = 1;");
        assert_eq!(normalize_line(" \t "), "");
    }

    #[test]
    fn tolerates_reindentation() {
        let content = "  const x = 1;\n  return x;";
        let out = replace_lines(content, "const x = 1;\nreturn x;", "const y = 2;\nreturn y;");
        assert_eq!(out.as_deref(), Some("const y = 2;\nreturn y;"));
    }

    #[test]
    fn surrounding_lines_are_untouched() {
        let content = "function f() {\n    const x = 1;\n    return x;\n}\n";
        let out = replace_lines(
            content,
            "const x = 1;\n  return x;",
            "    return 1;",
        )
        .unwrap();
        assert_eq!(out, "function f() {\n    return 1;\n}\n");
    }

    #[test]
    fn blank_lines_are_ignored_when_matching() {
        let content = "a();\n\n\nb();\nc();\n";
        assert_eq!(find_line_range(content, "a();\nb();"), Some((0, 3)));
        assert_eq!(
            replace_lines(content, "a();\n\nb();", "ab();").as_deref(),
            Some("ab();\nc();\n")
        );
    }

    #[test]
    fn first_match_wins() {
        let content = "x();\ny();\nx();\ny();\n";
        assert_eq!(find_line_range(content, "x();\ny();"), Some((0, 1)));
    }

    #[test]
    fn order_must_match() {
        let content = "b();\na();\n";
        assert_eq!(find_line_range(content, "a();\nb();"), None);
    }

    #[test]
    fn partial_lines_do_not_match() {
        let content = "let value = compute();\n";
        assert_eq!(find_line_range(content, "value = compute();"), None);
    }

    #[test]
    fn crlf_endings_are_preserved() {
        let content = "one\r\n  two\r\nthree\r\n";
        let out = replace_lines(content, "two", "2a\n2b").unwrap();
        assert_eq!(out, "one\r\n2a\r\n2b\r\nthree\r\n");
    }

    #[test]
    fn empty_replacement_removes_lines() {
        let content = "keep\n  drop me\nkeep too\n";
        assert_eq!(
            replace_lines(content, "drop me", "").as_deref(),
            Some("keep\nkeep too\n")
        );
    }

    #[test]
    fn blank_search_never_matches() {
        assert_eq!(find_line_range("a\n\nb", "\n  \n"), None);
    }
}
