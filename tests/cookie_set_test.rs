// CookieSetの統合テスト
use std::collections::HashMap;
use mockall::mock;
use runbridge_cookie::{CookieContract, CookieEntry, CookieSet, Error, HttpMessage, Request, Response};

mock! {
    pub Message {}

    impl HttpMessage for Message {
        fn cookie_params(&self) -> Option<HashMap<String, String>>;
        fn set_cookie_headers(&self) -> Option<Vec<String>>;
    }
}

#[test]
fn test_unsupported_message() {
    let mut message = MockMessage::new();
    message.expect_cookie_params().times(1).returning(|| None);
    message.expect_set_cookie_headers().times(1).returning(|| None);

    assert!(matches!(CookieSet::of(&message), Err(Error::UnsupportedMessage(_))));
}

#[test]
fn test_request_shaped_message_does_not_read_headers() {
    let mut message = MockMessage::new();
    message.expect_cookie_params().returning(|| {
        Some(HashMap::from([
            ("foo".to_string(), "bar".to_string()),
            ("jhon".to_string(), "doe".to_string()),
        ]))
    });
    message.expect_set_cookie_headers().never();

    let cookies = CookieSet::of(&message).unwrap();
    assert_eq!(cookies.get("foo", Some("baz")), Some("bar".to_string()));
    assert_eq!(cookies.get("jhon", Some("baz")), Some("doe".to_string()));
    assert!(cookies.has("foo"));
    assert!(cookies.has("jhon"));
}

#[test]
fn test_response_shaped_message() {
    let mut message = MockMessage::new();
    message.expect_cookie_params().returning(|| None);
    message.expect_set_cookie_headers().returning(|| {
        Some(vec![
            "sessionId=e8bb43229de9; Path=/; Domain=foo.example.com".to_string(),
            "id=38afes7a8".to_string(),
        ])
    });

    let cookies = CookieSet::of(&message).unwrap();
    assert_eq!(cookies.get("sessionId", None), Some("e8bb43229de9".to_string()));
    assert_eq!(cookies.get("id", None), Some("38afes7a8".to_string()));
    assert!(matches!(cookies.get_cookie("id"), Some(CookieEntry::Response(_))));
    assert_eq!(
        cookies.get_cookie("sessionId").and_then(CookieEntry::as_cookie).and_then(|c| c.domain()),
        Some("foo.example.com")
    );
    assert!(cookies.get_cookie("baz").is_none());
    assert_eq!(cookies.get("baz", Some("baz")), Some("baz".to_string()));
    assert!(!cookies.has("baz"));
}

#[test]
fn test_request_from_raw_cookie_header() {
    let request = Request::new()
        .with_header("Cookie", "session=abc123; user_id=456");
    let cookies = CookieSet::of(&request).unwrap();

    assert_eq!(cookies.len(), 2);
    let names: Vec<&str> = {
        let mut names: Vec<&str> = cookies.iter().map(|entry| entry.name()).collect();
        names.sort();
        names
    };
    assert_eq!(names, vec!["session", "user_id"]);
}

#[test]
fn test_response_without_set_cookie_is_empty() {
    let response = Response::ok().with_header("Content-Type", "text/plain");
    let cookies = CookieSet::of(&response).unwrap();
    assert!(cookies.is_empty());
}

#[test]
fn test_bad_header_aborts_population() {
    let response = Response::ok()
        .with_added_header("Set-Cookie", "good=1")
        .with_added_header("Set-Cookie", "bad name=1");
    assert!(matches!(CookieSet::of(&response), Err(Error::InvalidName(_))));
}
