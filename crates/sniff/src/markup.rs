//! HTML entry points.

use crate::{Flavor, Sniffed};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";
const HTML_MARKERS: &[&str] = &["<!doctype html", "<html", "<head", "<body", "<script"];

pub(crate) fn sniff(file_name: &str, data: &[u8]) -> Option<Sniffed> {
    let lower = file_name.to_ascii_lowercase();
    if lower != "index.html" && lower != "index.htm" {
        return None;
    }

    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let text = String::from_utf8_lossy(data).to_ascii_lowercase();
    let text = text.trim_start();
    // Allow a leading comment or two before the real markup.
    let looks_like_html = text.starts_with('<') && HTML_MARKERS.iter().any(|m| text.contains(m));

    looks_like_html.then(|| Sniffed::agnostic(Flavor::Markup, &[]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniff;

    #[test]
    fn index_html_is_markup() {
        let s = sniff("index.html", b"\xef\xbb\xbf\n  <!DOCTYPE html><html></html>").unwrap();
        assert_eq!(s.flavor, Flavor::Markup);
        assert!(s.arch.is_empty());
        assert!(s.os.is_empty());
    }

    #[test]
    fn other_html_files_are_documentation() {
        assert!(sniff("manual.html", b"<!DOCTYPE html><html></html>").is_none());
    }

    #[test]
    fn non_html_content_is_skipped() {
        assert!(sniff("index.html", b"just some text").is_none());
    }
}
