//! Source normalizer
//!
//! Turns a user-authored expression into an executable function body.
//! A bare single line gets `return ` prepended and a terminator appended;
//! multi-line sources are expected to carry their own `return`.

const RETURN_PREFIX: &str = "return ";

/// Normalizes an expression source into a function body.
///
/// # Examples
///
/// ```
/// use varex_application::variable_resolver::normalize;
///
/// assert_eq!(normalize("  vars.BASE_URL  "), "return vars.BASE_URL;");
/// assert_eq!(normalize("return vars.BASE_URL;"), "return vars.BASE_URL;");
/// ```
#[must_use]
pub fn normalize(source: &str) -> String {
    let trimmed = source.trim();
    let mut lines = trimmed.split('\n');

    match (lines.next(), lines.next()) {
        (Some(line), None) if !line.starts_with(RETURN_PREFIX) => {
            let terminator = if line.ends_with(';') { "" } else { ";" };
            format!("{RETURN_PREFIX}{line}{terminator}")
        }
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_expression_gets_return() {
        assert_eq!(normalize("vars.A + vars.B"), "return vars.A + vars.B;");
    }

    #[test]
    fn test_existing_terminator_is_kept() {
        assert_eq!(normalize("`${args.user}`;"), "return `${args.user}`;");
    }

    #[test]
    fn test_source_is_trimmed() {
        assert_eq!(normalize("\n\t 'x' \n"), "return 'x';");
    }

    #[test]
    fn test_already_returning_line_is_unchanged() {
        let source = "return `${vars.BASE_URL}/tasks`;";
        assert_eq!(normalize(source), source);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize("vars.BASE_URL");
        let twice = normalize(&once);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("return ").count(), 1);
    }

    #[test]
    fn test_multi_line_source_is_unchanged() {
        let source = "const base = vars.BASE_URL;\nreturn base + '/tasks';";
        assert_eq!(normalize(&format!("  {source}\n")), source);
    }

    #[test]
    fn test_bare_return_keyword_without_space_is_prefixed() {
        // "return" alone does not start with "return ", so it gets the prefix.
        assert_eq!(normalize("return"), "return return;");
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(normalize("   "), "return ;");
    }
}
