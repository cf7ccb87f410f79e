// src/utils/html_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::utils::error::AppError;

/// Saves a page snapshot to a file with debug highlights
pub fn save_debug_html(html: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut file = File::create(path)?;

    // Add debug styling in head
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");

    // CSS for highlight colors
    debug_html.push_str(".highlight-anchor { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-item { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-text { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0); // Sort by position

    for (start, end, highlight_type) in sorted_highlights {
        // Overlapping matches would duplicate markup
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "anchor" => "highlight-anchor",
            "item" => "highlight-item",
            "text" => "highlight-text",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!("<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }

    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }

    debug_html.push_str("\n</body>\n</html>");

    file.write_all(debug_html.as_bytes())?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Creates a debug version of a snapshot with the locations of the given regex patterns highlighted
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    use regex::Regex;

    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }

    save_debug_html(html, path, &highlights)
}

/// Highlight patterns for a section snapshot: every anchor class, list items and accessible text spans.
pub fn section_patterns(anchors: &[&str]) -> Vec<(String, &'static str)> {
    let mut patterns: Vec<(String, &'static str)> = anchors
        .iter()
        .map(|class| (format!(r#"class="[^"]*\b{}\b[^"]*""#, regex::escape(class)), "anchor"))
        .collect();
    patterns.push((r#"class="[^"]*pvs-list__paged-list-item[^"]*""#.to_string(), "item"));
    patterns.push((r#"aria-hidden="true""#.to_string(), "text"));
    patterns
}
