use std::time::Duration;

pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 1 {
        format!("{} ms ago", age.as_millis())
    } else if secs < 60 {
        format!("{secs} s ago")
    } else if secs < 3600 {
        format!("{} min ago", secs / 60)
    } else {
        format!("{} h ago", secs / 3600)
    }
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with an
/// ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) if max_chars > 0 => {
            let keep = text[..cut].char_indices().last().map_or(0, |(index, _)| index);
            format!("{}…", &text[..keep])
        }
        Some(_) => String::new(),
        None => text.to_owned(),
    }
}
