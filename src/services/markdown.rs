//! HTML to Markdown conversion for feed article bodies.
//!
//! Feed content is simple article HTML, not arbitrary documents. The
//! converter handles the tags that actually occur there (headings,
//! emphasis, links, lists, paragraphs, code), drops `script`/`style`/
//! `iframe` elements with their bodies, strips everything else, and
//! decodes the common entities.

/// Convert article HTML to Markdown.
pub fn html_to_markdown(html: &str) -> String {
    let mut text = html.to_string();
    for tag in ["script", "style", "iframe"] {
        text = drop_element(&text, tag);
    }
    let text = convert_links(&text);
    let text = convert_tags(&text);
    let text = strip_tags(&text);
    collapse_blank_lines(decode_entities(&text).trim())
}

/// Remove `<tag>...</tag>` including the body. Case-insensitive on the
/// tag name, which is all the leniency feed HTML needs.
fn drop_element(html: &str, tag: &str) -> String {
    let lower = html.to_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(rel) = lower[pos..].find(&open) {
        let start = pos + rel;
        out.push_str(&html[pos..start]);
        match lower[start..].find(&close) {
            Some(end_rel) => pos = start + end_rel + close.len(),
            None => return out,
        }
    }
    out.push_str(&html[pos..]);
    out
}

/// Rewrite `<a href="url">text</a>` as `[text](url)`.
fn convert_links(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find("<a ") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let (href, text, consumed) = match parse_anchor(tail) {
            Some(parts) => parts,
            None => {
                // Not a well-formed anchor; emit the marker and move on.
                out.push_str("<a ");
                rest = &tail[3..];
                continue;
            }
        };
        out.push('[');
        out.push_str(text.trim());
        out.push_str("](");
        out.push_str(&href);
        out.push(')');
        rest = &tail[consumed..];
    }
    out.push_str(rest);
    out
}

/// Split one `<a ...>text</a>` into (href, text, bytes consumed).
fn parse_anchor(tail: &str) -> Option<(String, &str, usize)> {
    let open_end = tail.find('>')?;
    let opening = &tail[..open_end];
    let href = opening.find("href=\"").map(|at| {
        let rest = &opening[at + 6..];
        rest.find('"').map_or("", |q| &rest[..q]).to_string()
    })?;
    let body = &tail[open_end + 1..];
    let close = body.find("</a>")?;
    Some((href, &body[..close], open_end + 1 + close + 4))
}

/// Replace structural tags with their Markdown markers.
fn convert_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('>') else {
            out.push_str(tail);
            return out;
        };
        let tag = tail[1..end].trim_end_matches('/').trim();
        let name = tag
            .trim_start_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();
        let closing = tag.starts_with('/');
        match name.as_str() {
            "br" => out.push('\n'),
            "p" | "div" => out.push_str(if closing { "\n\n" } else { "" }),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if closing {
                    out.push_str("\n\n");
                } else {
                    let level = name[1..].parse::<usize>().unwrap_or(1);
                    out.push_str("\n\n");
                    out.push_str(&"#".repeat(level));
                    out.push(' ');
                }
            }
            "li" => out.push_str(if closing { "" } else { "\n- " }),
            "ul" | "ol" => out.push_str(if closing { "\n\n" } else { "" }),
            "strong" | "b" => out.push_str("**"),
            "em" | "i" => out.push('*'),
            "code" => out.push('`'),
            // Anything else survives for strip_tags to remove.
            _ => out.push_str(&tail[..end + 1]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Remove any remaining tags, keeping their text content.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_basic_article_markup() {
        let html = "<h2>Heading</h2><p>Some <strong>bold</strong> and <em>italic</em> text.</p>";
        let md = html_to_markdown(html);
        assert!(md.contains("## Heading"));
        assert!(md.contains("**bold**"));
        assert!(md.contains("*italic*"));
    }

    #[test]
    fn rewrites_anchors_as_markdown_links() {
        let md = html_to_markdown(r#"See <a href="https://example.test">the docs</a>."#);
        assert_eq!(md, "See [the docs](https://example.test).");
    }

    #[test]
    fn list_items_become_dashes() {
        let md = html_to_markdown("<ul><li>one</li><li>two</li></ul>");
        assert!(md.contains("- one"));
        assert!(md.contains("- two"));
    }

    #[test]
    fn script_and_style_bodies_are_dropped() {
        let html = "before<script>alert('x')</script>middle<style>p{}</style>after";
        assert_eq!(html_to_markdown(html), "beforemiddleafter");
    }

    #[test]
    fn unknown_tags_are_stripped_but_text_kept() {
        let md = html_to_markdown("<article><span>kept text</span></article>");
        assert_eq!(md, "kept text");
    }

    #[test]
    fn entities_are_decoded() {
        let md = html_to_markdown("fish &amp; chips &lt;3");
        assert_eq!(md, "fish & chips <3");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(html_to_markdown("no markup at all"), "no markup at all");
    }
}
