//! Text measurement and truncation for axis labels.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Truncate to fit `max_px`, ending with a single ellipsis when shortened.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&out, font_px) + estimate_text_width_px("…", font_px) > max_px {
            out.pop();
            break;
        }
    }
    out.push('…');
    out
}

/// Font size that lets one label fit in a band of `band_px` (rows or columns).
///
/// Returns `None` when even the smallest readable size would overlap neighbours.
pub fn label_font_px(band_px: f64) -> Option<u32> {
    const MIN_PX: f64 = 6.0;
    const MAX_PX: f64 = 12.0;
    if band_px < MIN_PX {
        None
    } else {
        Some(band_px.min(MAX_PX).floor() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_short_labels() {
        assert_eq!(truncate_to_width("GAPDH", 10, 200), "GAPDH");
        let t = truncate_to_width("a very long gene description", 10, 60);
        assert!(t.ends_with('…'));
        assert!(estimate_text_width_px(&t, 10) <= 60);
    }

    #[test]
    fn label_fonts_follow_band() {
        assert_eq!(label_font_px(3.0), None);
        assert_eq!(label_font_px(8.4), Some(8));
        assert_eq!(label_font_px(40.0), Some(12));
    }
}
