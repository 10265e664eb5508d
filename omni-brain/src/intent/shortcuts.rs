//! Shortcut table
//!
//! **[BRN-INT-010]** Exact, case-insensitive aliases that bypass inference
//! entirely. A hit returns a single link action.

use omni_common::api::ActionResult;

/// Fixed alias -> URL mapping. Kept tiny on purpose; anything longer than
/// a few characters should go through classification instead.
const COMMON_SHORTCUTS: [(&str, &str); 6] = [
    ("yt", "https://www.youtube.com"),
    ("gh", "https://github.com"),
    ("x", "https://x.com"),
    ("red", "https://reddit.com"),
    ("map", "https://www.google.com/maps"),
    ("chat", "https://chatgpt.com"),
];

/// Resolve a full query against the shortcut table.
pub fn shortcut_action(query: &str) -> Option<ActionResult> {
    let needle = query.trim().to_ascii_lowercase();
    let (_, url) = COMMON_SHORTCUTS
        .iter()
        .find(|(alias, _)| *alias == needle)?;
    Some(ActionResult::Link {
        url: (*url).to_string(),
        title: title_from_url(url),
        description: "Direct Shortcut".to_string(),
    })
}

/// Derive a display title from a URL: drop the scheme and a leading
/// `www.`, keep the host, and title-case its dot-separated parts.
fn title_from_url(url: &str) -> String {
    let host = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .split('/')
        .next()
        .unwrap_or_default();
    title_case(host)
}

// Capitalizes the letter after any non-alphabetic character, so
// "google.com" becomes "Google.Com".
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_is_case_insensitive() {
        let upper = shortcut_action("YT").unwrap();
        let lower = shortcut_action("yt").unwrap();
        assert_eq!(upper, lower);
        match upper {
            ActionResult::Link { url, .. } => assert_eq!(url, "https://www.youtube.com"),
            other => panic!("expected link, got {:?}", other),
        }
    }

    #[test]
    fn whitespace_is_tolerated_but_partial_matches_are_not() {
        assert!(shortcut_action(" gh ").is_some());
        assert!(shortcut_action("ghx").is_none());
        assert!(shortcut_action("open yt").is_none());
    }

    #[test]
    fn titles_come_from_the_host() {
        match shortcut_action("map").unwrap() {
            ActionResult::Link { title, .. } => assert_eq!(title, "Google.Com"),
            other => panic!("expected link, got {:?}", other),
        }
        match shortcut_action("yt").unwrap() {
            ActionResult::Link { title, .. } => assert_eq!(title, "Youtube.Com"),
            other => panic!("expected link, got {:?}", other),
        }
    }
}
