// src/core/html.rs
// Markup stripping for store descriptions.

use scraper::{ElementRef, Html, Node};

/// Passes before giving up on reaching a fixed point.
const MAX_PASSES: usize = 16;

/// Strip markup from a description.
///
/// Every `<a>` element is dropped together with everything inside it. All other
/// elements are replaced by their text. Text nodes are joined with a single
/// space and the result is trimmed. Decoded entities can spell out new markup
/// or entities (`&amp;amp;`, `&lt;b&gt;`), so passes repeat until the text stops
/// changing and `clean_html(clean_html(x)) == clean_html(x)`.
pub fn clean_html(text: &str) -> String {
    let mut current = clean_once(text);
    for _ in 0..MAX_PASSES {
        let next = clean_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn clean_once(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return s!(text.trim());
    }

    let doc = Html::parse_fragment(text);
    let mut parts: Vec<&str> = Vec::new();
    collect_text(doc.root_element(), &mut parts);
    parts.join(" ").trim().to_string()
}

fn collect_text<'a>(el: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push(text),
            Node::Element(e) if e.name().eq_ignore_ascii_case("a") => {}
            Node::Element(_) => {
                if let Some(inner) = ElementRef::wrap(child) {
                    collect_text(inner, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_links_with_content() {
        let html = r#"<p>Fight <a href="https://x.test">buy now <b>cheap</b></a> monsters</p>"#;
        let out = clean_html(html);
        assert!(!out.contains("buy"));
        assert!(!out.contains("cheap"));
        assert!(!out.contains('<'));
        assert!(out.starts_with("Fight"));
        assert!(out.ends_with("monsters"));
    }

    #[test]
    fn keeps_other_element_text() {
        let out = clean_html("<div><h2>About</h2><ul><li>Swords</li><li>Magic</li></ul></div>");
        assert_eq!(out, "About Swords Magic");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(clean_html("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn plain_text_is_trimmed_only() {
        assert_eq!(clean_html("  plain   text \n"), "plain   text");
        assert_eq!(clean_html(""), "");
    }

    #[test]
    fn idempotent() {
        for input in [
            "<p>One <i>two</i></p><br>three",
            "<a href='#'>gone</a>",
            "  spaced  <span> out </span> ",
            "no tags at all",
        ] {
            let once = clean_html(input);
            assert_eq!(clean_html(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn escaped_entities_settle() {
        for input in [
            "AT&amp;amp;T",
            "&amp;lt;b&amp;gt;bold&amp;lt;/b&amp;gt;",
            "&lt;b&gt;Bold&lt;/b&gt; move",
            "&lt;a href='x'&gt;link&lt;/a&gt; kept",
            "Fish &amp;amp;amp; chips",
            "1 &lt; 2 &amp;&amp; 3 &gt; 2",
            "x &nbsp;&amp;nbsp; y",
        ] {
            let once = clean_html(input);
            assert_eq!(clean_html(&once), once, "input: {input:?}");
        }
        assert_eq!(clean_html("AT&amp;amp;T"), "AT&T");
        assert_eq!(clean_html("&lt;b&gt;Bold&lt;/b&gt; move"), "Bold  move");
    }

    #[test]
    fn uppercase_anchor_tags() {
        assert_eq!(clean_html("keep <A HREF='x'>drop</A> this"), "keep   this");
    }
}
