//! Document template engine: `${key}` substitution, block markers, and
//! key extraction.
//!
//! Placeholders are `${key}`. Blocks are delimited by `<key>` and
//! `</key>` marker pairs: setting a block to `true` keeps its body and
//! removes the markers, `false` removes body and markers both. Unknown
//! placeholders and unmatched markers are left untouched.

use std::collections::HashMap;

/// Substitute `${key}` placeholders from `replacements`.
pub fn replace_keys(text: &str, replacements: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match replacements.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("${");
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// All placeholder keys in `text`, in order of first appearance.
pub fn extract_keys(text: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = after[..end].to_string();
                if !keys.contains(&key) {
                    keys.push(key);
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    keys
}

/// Keep or strip marked blocks. A block is kept (markers removed) when
/// its entry is `true`, removed entirely when `false`.
pub fn apply_blocks(text: &str, blocks: &HashMap<String, bool>) -> String {
    let mut out = text.to_string();
    for (key, keep) in blocks {
        let open = format!("<{key}>");
        let close = format!("</{key}>");
        loop {
            let Some(start) = out.find(&open) else { break };
            let Some(close_at) = out[start..].find(&close).map(|p| start + p) else {
                break;
            };
            if *keep {
                let body = out[start + open.len()..close_at].to_string();
                out.replace_range(start..close_at + close.len(), &body);
            } else {
                out.replace_range(start..close_at + close.len(), "");
            }
        }
    }
    out
}
