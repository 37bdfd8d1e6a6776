use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::clean::is_navigation_text;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static PRUNED: Lazy<Selector> = Lazy::new(|| {
    selector(
        "script, style, nav, footer, header, aside, .cookie, .popup, .modal, .advertisement, .ad, iframe, noscript",
    )
});

static IRRELEVANT: Lazy<Selector> = Lazy::new(|| {
    selector(
        ".menu, .navigation, .sidebar, .social, .share, .breadcrumb, .pagination, .related, .tags, .comments, .author, .date, .meta",
    )
});

static TEXT_BLOCKS: Lazy<Selector> =
    Lazy::new(|| selector("p, li, dt, dd, h1, h2, h3, h4, h5, h6, .text, .description"));

static CONTENT_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "main article",
        "main .content",
        "main",
        ".main-content",
        ".page-content",
        "article",
        "#content",
        ".content-wrapper",
    ]
    .into_iter()
    .map(selector)
    .collect()
});

static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));

const MIN_BLOCK_CHARS: usize = 20;

/// Pulls readable text out of a policy page.
///
/// Chrome and decorative elements are removed first. Containers are probed in
/// order and the first one yielding more than `min_chars` characters wins;
/// otherwise the whole body is used.
pub fn extract_page_text(html: &str, min_chars: usize) -> String {
    let mut document = Html::parse_document(html);
    detach_matching(&mut document, &PRUNED);
    detach_matching(&mut document, &IRRELEVANT);

    for container in CONTENT_CONTAINERS.iter() {
        if let Some(element) = document.select(container).next() {
            let text = relevant_text(element, min_chars);
            if text.chars().count() > min_chars {
                return text;
            }
        }
    }

    match document.select(&BODY).next() {
        Some(body) => relevant_text(body, min_chars),
        None => relevant_text(document.root_element(), min_chars),
    }
}

fn detach_matching(document: &mut Html, selector: &Selector) {
    let ids = document
        .select(selector)
        .map(|element| element.id())
        .collect::<Vec<_>>();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn relevant_text(element: ElementRef<'_>, min_chars: usize) -> String {
    let mut text = String::new();
    for block in element.select(&TEXT_BLOCKS) {
        let content = block.text().collect::<String>();
        let content = content.trim();
        if content.chars().count() > MIN_BLOCK_CHARS && !is_navigation_text(content) {
            text.push_str(content);
            text.push(' ');
        }
    }

    if text.chars().count() < min_chars {
        return element.text().collect();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = "Economy passengers on domestic routes may check in 15kg of baggage.";
    const POLICY_2: &str = "International allowances depend on the fare family chosen when booking.";

    #[test]
    fn prefers_main_article_and_drops_chrome() {
        let html = format!(
            "<html><head><script>var x = 'tracking';</script></head><body>\
             <nav><p>Home navigation link that is long enough</p></nav>\
             <main><article><h2>Checked baggage allowance</h2><p>{POLICY}</p><p>{POLICY_2}</p>\
             <div class=\"share\"><p>Share this page on your favourite network</p></div></article></main>\
             <footer><p>Copyright footer text that should disappear</p></footer></body></html>"
        );

        let text = extract_page_text(&html, 100);
        assert!(text.contains(POLICY));
        assert!(text.contains(POLICY_2));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("navigation link"));
        assert!(!text.contains("Share this page"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn skips_short_and_navigation_blocks() {
        let html = format!(
            "<html><body><article><p>Too short</p><li>Login or sign up today</li>\
             <p>{POLICY}</p><p>{POLICY_2}</p></article></body></html>"
        );

        let text = extract_page_text(&html, 100);
        assert!(!text.contains("Too short"));
        assert!(!text.contains("Login"));
        assert!(text.starts_with(POLICY));
    }

    #[test]
    fn falls_back_to_body_text() {
        let html = format!("<html><body><div>{POLICY} {POLICY_2}</div></body></html>");
        let text = extract_page_text(&html, 100);
        assert!(text.contains(POLICY));
    }
}
