use crate::decoder::encode_payload;
use crate::types::PayloadError;
use serde::Serialize;

pub const PROFILE_PARAM: &str = "profile";
pub const TEMPLATE_PARAM: &str = "template";

/// Return the raw, still percent-encoded value of the first `name` pair.
///
/// Accepts a bare query (`a=1&b=2`), a `location.search` style string
/// (`?a=1`), or a path with a query (`/results?a=1#top`). Keys are
/// compared without decoding.
pub fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    let query = query_string(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
}

/// Build `<results_path>?profile=<encoded>` for a shareable results link.
pub fn share_link<T: Serialize + ?Sized>(results_path: &str, record: &T) -> Result<String, PayloadError> {
    Ok(format!(
        "{}?{}={}",
        results_path,
        PROFILE_PARAM,
        encode_payload(record)?
    ))
}

fn query_string(input: &str) -> &str {
    let input = input.split('#').next().unwrap_or("");
    if let Some(query) = input.strip_prefix('?') {
        return query;
    }
    // A '?' after the first '=' or '&' belongs to a value, not a path.
    let pairs_start = input.find(|c: char| c == '=' || c == '&').unwrap_or(input.len());
    match input.find('?') {
        Some(mark) if mark < pairs_start => &input[mark + 1..],
        _ if input.starts_with('/') => "",
        _ => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_param_forms() {
        assert_eq!(query_param("profile=abc", "profile"), Some("abc"));
        assert_eq!(query_param("?utm=x&profile=%7B%7D", "profile"), Some("%7B%7D"));
        assert_eq!(query_param("/results?profile=a&profile=b#frag", "profile"), Some("a"));
        assert_eq!(query_param("/results", "profile"), None);
        assert_eq!(query_param("", "profile"), None);
        assert_eq!(query_param("?profile", "profile"), Some(""));
        assert_eq!(query_param("?profiles=1", "profile"), None);
    }

    #[test]
    fn test_question_mark_inside_value() {
        let bare = "profile=%7B%22score%22%3A42%7D&next=/x?y=1";
        assert_eq!(query_param(bare, "profile"), Some("%7B%22score%22%3A42%7D"));
        assert_eq!(query_param(bare, "next"), Some("/x?y=1"));

        let with_path = "/results?profile=%7B%7D&next=/x?y=1";
        assert_eq!(query_param(with_path, "profile"), Some("%7B%7D"));
        assert_eq!(query_param(with_path, "next"), Some("/x?y=1"));

        assert_eq!(query_param("?next=/a?b&profile=1", "profile"), Some("1"));
    }

    #[test]
    fn test_share_link() {
        let link = share_link("/results", &json!({"score": 42})).unwrap();
        assert_eq!(link, "/results?profile=%7B%22score%22%3A42%7D");
        assert_eq!(query_param(&link, PROFILE_PARAM), Some("%7B%22score%22%3A42%7D"));
    }
}
