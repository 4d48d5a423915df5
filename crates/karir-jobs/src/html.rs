//! HTML fragments from vacancy records to readable text

use regex::Regex;
use tracing::warn;

/// Convert an HTML fragment to plain Markdown-ish text. Empty input stays empty.
pub fn to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    match htmd::convert(html) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("HTML conversion failed, stripping tags: {}", e);
            strip_tags(html)
        }
    }
}

fn strip_tags(html: &str) -> String {
    Regex::new(r"<[^>]*>")
        .map(|re| re.replace_all(html, "").trim().to_string())
        .unwrap_or_else(|_| html.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_and_lists_become_text() {
        let text = to_text("<p>Mengelola <b>laporan</b> keuangan</p><ul><li>Excel</li></ul>");
        assert!(text.contains("Mengelola"));
        assert!(text.contains("laporan"));
        assert!(text.contains("Excel"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn blank_stays_blank() {
        assert_eq!(to_text("  "), "");
    }

    #[test]
    fn strip_tags_fallback() {
        assert_eq!(strip_tags("<div>a<br/>b</div>"), "ab");
    }
}
