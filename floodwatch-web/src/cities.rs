//! Fetch the flood-prone-city article and extract its ranked `<h2>` list.

use crate::WebError;
use floodwatch_http::{HttpClient, RequestOpts};

/// Fetches one static page and turns its headings into a city list.
pub struct CityListSource {
    http: HttpClient,
    url: String,
}

impl CityListSource {
    pub fn new(url: &str) -> Result<Self, WebError> {
        Ok(Self {
            http: HttpClient::new(url)?,
            url: url.to_string(),
        })
    }

    /// Fetch the page and return the cleaned city names in page order.
    pub async fn fetch_city_names(&self) -> Result<Vec<String>, WebError> {
        let html = self
            .http
            .get_text(
                &self.url,
                RequestOpts {
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await?;
        let cities = city_names_from_html(&html);
        tracing::info!(url = %self.url, count = cities.len(), "cities.scraped");
        Ok(cities)
    }
}

/// Headings come ranked ("9. St Augustine"); strip the rank, trim, and apply
/// the one known data fix: the page lists St Augustine without its state.
pub fn city_names_from_html(html: &str) -> Vec<String> {
    extract_headings(html, "h2")
        .into_iter()
        .map(|h| clean_heading(&h))
        .filter(|c| !c.is_empty())
        .map(|c| {
            if c == "St Augustine" {
                "St Augustine, Florida".to_string()
            } else {
                c
            }
        })
        .collect()
}

fn clean_heading(raw: &str) -> String {
    match raw.split_once('.') {
        Some((_, rest)) => rest.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Collect the text content of every `<tag>` element. Heuristic scanner in
/// the same spirit as the title extractor this crate grew out of; it copes
/// with attributes and nested inline tags but makes no attempt at full HTML
/// correctness.
pub fn extract_headings(html: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(found) = find_ignore_ascii_case(&html[pos..], &open) {
        let start = pos + found;
        let Some(gt) = html[start..].find('>') else {
            break;
        };
        let content_start = start + gt + 1;
        let Some(end) = find_ignore_ascii_case(&html[content_start..], &close) else {
            break;
        };
        let content_end = content_start + end;
        out.push(strip_tags(&html[content_start..content_end]).trim().to_string());
        pos = content_end + close.len();
    }
    out
}

/// Byte offset of the first ASCII-case-insensitive match of `needle` in
/// `haystack`. Tag names are pure ASCII, so offsets stay valid for slicing
/// the original text no matter what the surrounding content contains.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let (hay, pat) = (haystack.as_bytes(), needle.as_bytes());
    if pat.is_empty() || hay.len() < pat.len() {
        return None;
    }
    (0..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <h1>American cities whose homes are in danger of flooding</h1>
        <h2 class="rank">1. Las Vegas, Nevada</h2>
        <p>blurb</p>
        <h2>2. <a href="/jersey">Jersey City, New Jersey</a></h2>
        <h2>9. St Augustine</h2>
        <h2>15. Sugar Land, Texas</h2>
        </body></html>
    "#;

    #[test]
    fn extracts_h2_text_in_page_order() {
        let got = extract_headings(PAGE, "h2");
        assert_eq!(got.len(), 4);
        assert_eq!(got[0], "1. Las Vegas, Nevada");
        assert_eq!(got[1], "2. Jersey City, New Jersey");
    }

    #[test]
    fn cleans_ranks_and_fixes_st_augustine() {
        let got = city_names_from_html(PAGE);
        assert_eq!(
            got,
            vec![
                "Las Vegas, Nevada",
                "Jersey City, New Jersey",
                "St Augustine, Florida",
                "Sugar Land, Texas",
            ]
        );
    }

    #[test]
    fn unranked_heading_passes_through_trimmed() {
        assert_eq!(clean_heading("  Plano, Texas "), "Plano, Texas");
    }

    #[test]
    fn multibyte_text_before_heading_does_not_shift_offsets() {
        // U+0130 lowercases to two codepoints; offsets must index the
        // original text, not a lowercased copy.
        let page = "<h1>\u{130}stanbul</h1><h2>1. Las Vegas, Nevada</h2>";
        assert_eq!(extract_headings(page, "h2"), vec!["1. Las Vegas, Nevada"]);
    }

    #[test]
    fn tag_case_is_ignored() {
        let got = extract_headings("<H2 class=\"x\">4. Plano, Texas</H2>", "h2");
        assert_eq!(got, vec!["4. Plano, Texas"]);
    }

    #[test]
    fn unterminated_heading_is_ignored() {
        let got = extract_headings("<h2>3. Dallas, Texas", "h2");
        assert!(got.is_empty());
    }
}
