use crate::errors::MapError;

/// Replace every `{name}` in `text` with what `resolve` returns for it
///
/// `{{` and `}}` stand for literal braces. Placeholders are resolved in the
/// order they appear, so parameters bound while resolving are numbered in
/// text order.
pub fn substitute<F>(text: &str, mut resolve: F) -> Result<String, MapError>
where
    F: FnMut(&str) -> Result<String, MapError>,
{
    let mut output = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                output.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                output.push('}');
            }
            '{' => {
                let name_start = start + 1;
                let mut name_end = None;
                for (index, next) in chars.by_ref() {
                    if next == '}' {
                        name_end = Some(index);
                        break;
                    }
                    if next == '{' {
                        break;
                    }
                }
                let end = name_end.ok_or_else(|| {
                    MapError::template(format!("unterminated placeholder in '{}'", text))
                })?;
                let name = &text[name_start..end];
                if name.is_empty() {
                    return Err(MapError::template(format!(
                        "empty placeholder in '{}'",
                        text
                    )));
                }
                output.push_str(&resolve(name)?);
            }
            '}' => {
                return Err(MapError::template(format!(
                    "unmatched '}}' in '{}'",
                    text
                )));
            }
            other => output.push(other),
        }
    }

    Ok(output)
}
