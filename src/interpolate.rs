use crate::env::EnvLookup;

/// Replaces each `${NAME}` in `input`.
///
/// `lookup_binding` is consulted first, then `env`; an empty environment value
/// counts as undefined and unresolved names expand to nothing. An opening
/// `${` with no closing `}` is copied through as-is. Substituted text is not
/// rescanned.
pub(crate) fn interpolate<'b, F>(input: &str, lookup_binding: F, env: &dyn EnvLookup) -> String
where
    F: Fn(&str) -> Option<&'b str>,
{
    if !input.contains("${") {
        return input.to_owned();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(close) = after_open.find('}') else {
            out.push('$');
            rest = &rest[start + 1..];
            continue;
        };

        let name = &after_open[..close];
        if let Some(value) = lookup_binding(name) {
            out.push_str(value);
        } else if let Some(value) = env.get_var(name).filter(|value| !value.is_empty()) {
            out.push_str(&value);
        }
        rest = &after_open[close + 1..];
    }
    out.push_str(rest);
    out
}
