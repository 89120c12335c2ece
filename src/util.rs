/// Single-word label drawn inside a node: the first word of the entity name.
pub fn short_label(id: &str) -> &str {
    id.split_whitespace().next().unwrap_or(id)
}

/// Greedy word wrap: words are appended to the current line until the
/// measured width would exceed `max_width`. A single word wider than the limit
/// gets a line of its own rather than being split.
pub fn wrap_words(text: &str, max_width: f32, mut measure: impl FnMut(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }

        let candidate = format!("{line} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_owned()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
