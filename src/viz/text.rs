//! Text measurement and wrapping for labels drawn outside plotters' own layout.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Cut `text` to fit `max_px`, ending in a single ellipsis when shortened.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let per_char = (font_px as f32 * 0.60).max(1.0);
    let fit = (max_px as f32 / per_char).floor() as usize;
    if fit == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(fit - 1).collect();
    out.push('…');
    out
}

/// Greedy word wrap to `max_px`. Words wider than a line are truncated rather than split.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if estimate_text_width_px(&candidate, font_px) <= max_px {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        cur = truncate_to_width(word, font_px, max_px);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}
