//! Placeholder substitution for persona and command templates.
//!
//! Templates use `{{name}}` placeholders. Unknown placeholders are left as-is
//! so a typo in a template shows up in the rendered prompt instead of
//! silently vanishing.

/// Render template variables in a string.
///
/// Substitution is a single left-to-right pass: text inserted for one
/// placeholder is never scanned for further placeholders.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        let value = after.find("}}").and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 2..];
            }
            None => {
                result.push_str("{{");
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}
