//! Splitting of a raw input line into command tokens.
//!
//! The interpreter has no quoting or substitution rules: a token is any maximal
//! run of characters that are not delimiters. Consecutive delimiters collapse, so
//! an empty token is never produced.

/// Delimiters used by [`split_into_tokens`].
pub const WHITESPACE: &[char] = &[' ', '\t', '\r', '\n'];

/// Splits `line` on [`WHITESPACE`].
///
/// An empty or all-whitespace line yields no tokens; callers treat that as
/// "no command" and prompt again.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    split_on(line, WHITESPACE)
}

/// Splits `line` on any character contained in `delimiters`.
pub fn split_on(line: &str, delimiters: &[char]) -> Vec<String> {
    line.split(|c: char| delimiters.contains(&c))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_command() {
        assert_eq!(split_into_tokens("ls -la"), vec!["ls", "-la"]);
    }

    #[test]
    fn test_consecutive_delimiters_collapse() {
        let tokens = split_into_tokens("  sleep \t 5   &  ");
        assert_eq!(tokens, vec!["sleep", "5", "&"]);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        assert!(split_into_tokens("").is_empty());
        assert!(split_into_tokens("   ").is_empty());
        assert!(split_into_tokens("\t \r\n").is_empty());
    }

    #[test]
    fn test_trailing_newline_is_not_a_token() {
        assert_eq!(split_into_tokens("echo hi\n"), vec!["echo", "hi"]);
    }

    #[test]
    fn test_custom_delimiters() {
        assert_eq!(split_on("a:b::c", &[':']), vec!["a", "b", "c"]);
        assert_eq!(split_on("a b", &[':']), vec!["a b"]);
        assert!(split_on(":::", &[':']).is_empty());
    }

    #[test]
    fn test_quotes_are_not_special() {
        assert_eq!(
            split_into_tokens("echo \"a b\""),
            vec!["echo", "\"a", "b\""]
        );
    }
}
