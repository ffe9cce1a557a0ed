//! `${VAR}` and `${VAR:-fallback}` expansion over raw config text.
//!
//! A placeholder naming an unset variable with no fallback is an error: a
//! literal `${VERMIETER_DB}` must never end up as a database path.

/// Expand placeholders from the process environment.
pub fn substitute_env(input: &str) -> anyhow::Result<String> {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Expand placeholders using `lookup`.
///
/// `${VAR}` takes the variable's value, even when empty. `${VAR:-text}`
/// takes `text` when the variable is unset or empty. Text that is not a
/// well-formed placeholder is copied through unchanged.
pub fn substitute_env_with(
    input: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut unset = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let Some(end) = body.find('}') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let expr = &body[..end];
        let (name, fallback) = match expr.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (expr, None),
        };

        if !is_var_name(name) {
            out.push_str(&rest[start..start + 2 + end + 1]);
        } else {
            match (lookup(name), fallback) {
                (Some(value), Some(fallback)) if value.is_empty() => out.push_str(fallback),
                (Some(value), _) => out.push_str(&value),
                (None, Some(fallback)) => out.push_str(fallback),
                (None, None) => unset.push(name.to_string()),
            }
        }
        rest = &body[end + 1..];
    }
    out.push_str(rest);

    if !unset.is_empty() {
        anyhow::bail!(
            "config references unset environment variable(s): {}",
            unset.join(", ")
        );
    }
    Ok(out)
}

fn is_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn env(name: &str) -> Option<String> {
        match name {
            "VERMIETER_DB" => Some("/srv/vt.db".into()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn expands_set_variable() {
        assert_eq!(
            substitute_env_with("[database]\npath = \"${VERMIETER_DB}\"", env).unwrap(),
            "[database]\npath = \"/srv/vt.db\""
        );
    }

    #[test]
    fn unset_variable_is_an_error_naming_every_variable() {
        let err = substitute_env_with("a = \"${MISSING_A}\"\nb = \"${MISSING_B}\"", env)
            .unwrap_err()
            .to_string();
        assert!(err.contains("MISSING_A"), "{err}");
        assert!(err.contains("MISSING_B"), "{err}");
    }

    #[test]
    fn fallback_covers_unset_and_empty() {
        assert_eq!(
            substitute_env_with("${MISSING:-/var/lib/vt.db}", env).unwrap(),
            "/var/lib/vt.db"
        );
        assert_eq!(substitute_env_with("${EMPTY:-x}", env).unwrap(), "x");
        assert_eq!(
            substitute_env_with("${VERMIETER_DB:-x}", env).unwrap(),
            "/srv/vt.db"
        );
    }

    #[test]
    fn empty_value_without_fallback_is_kept() {
        assert_eq!(substitute_env_with("v=${EMPTY};", env).unwrap(), "v=;");
    }

    #[test]
    fn malformed_placeholders_pass_through() {
        assert_eq!(substitute_env_with("path=${HOME", env).unwrap(), "path=${HOME");
        assert_eq!(substitute_env_with("${}", env).unwrap(), "${}");
        assert_eq!(
            substitute_env_with("${not a var}", env).unwrap(),
            "${not a var}"
        );
        assert_eq!(substitute_env_with("cost: $5", env).unwrap(), "cost: $5");
    }
}
