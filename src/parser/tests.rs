//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use crate::parser::{Error, Header, HttpRequest, Method, parse_request, read_request};

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /index.html HTTP/1.0\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.uri, "/index.html");
        assert_eq!(result.query, "");
        assert_eq!(result.get_header("Host").unwrap(), "example.com");
        assert!(result.path.is_none());
    }

    #[test]
    fn test_query_split_at_first_question_mark() {
        let request = b"GET /cgi.script?q=foo?bar&x=%20 HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.uri, "/cgi.script");
        // kept raw, no unescaping
        assert_eq!(result.query, "q=foo?bar&x=%20");
        assert_eq!(result.target(), "/cgi.script?q=foo?bar&x=%20");
    }

    #[test]
    fn test_query_defaults_to_empty() {
        let result = parse_request(b"GET /a/b HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(result.query, "");
        assert_eq!(result.target(), "/a/b");

        let result = parse_request(b"GET /a/b? HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(result.uri, "/a/b");
        assert_eq!(result.query, "");
    }

    #[test]
    fn test_version_token_is_optional_and_ignored() {
        let result = parse_request(b"GET /\r\n\r\n").unwrap();
        assert_eq!(result.uri, "/");

        let result = parse_request(b"GET / HTTP/9.9\r\n\r\n").unwrap();
        assert_eq!(result.uri, "/");
    }

    #[test]
    fn test_request_line_with_extra_whitespace() {
        let request = b"  GET \t /index.html   HTTP/1.1\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.uri, "/index.html");
    }

    #[test]
    fn test_headers_keep_wire_order_and_duplicates() {
        let request = b"GET / HTTP/1.0\r\n\
            Host: example.com\r\n\
            X-Test: value1\r\n\
            accept: */*\r\n\
            X-Test: value2\r\n\
            \r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(
            result.headers,
            vec![
                Header::new("Host", "example.com"),
                Header::new("X-Test", "value1"),
                Header::new("accept", "*/*"),
                Header::new("X-Test", "value2"),
            ]
        );
        // first match wins for lookups
        assert_eq!(result.get_header("x-test").unwrap(), "value1");
    }

    #[test]
    fn test_header_value_trimming() {
        let request = b"GET / HTTP/1.0\r\nHost :   example.com  \r\nX-Tab:\tv\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers[0].name, "Host");
        // trailing non-terminator characters are preserved
        assert_eq!(result.headers[0].value, "example.com  ");
        assert_eq!(result.headers[1].value, "v");
    }

    #[test]
    fn test_headers_with_multiple_colons() {
        let request = b"GET / HTTP/1.0\r\nHost: localhost:9898\r\nX-Test: value:with:colons\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.get_header("Host").unwrap(), "localhost:9898");
        assert_eq!(result.get_header("X-Test").unwrap(), "value:with:colons");
    }

    #[test]
    fn test_empty_header_value() {
        let request = b"GET / HTTP/1.0\r\nX-Empty:\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.get_header("X-Empty").unwrap(), "");
    }

    #[test]
    fn test_mixed_line_endings() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\nUser-Agent: test\r\n\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.get_header("Host").unwrap(), "example.com");
        assert_eq!(result.get_header("User-Agent").unwrap(), "test");
    }

    #[test]
    fn test_headers_stop_at_blank_line() {
        let request = b"POST /form HTTP/1.0\r\nContent-Length: 9\r\n\r\nnot: head";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.len(), 1);
        assert!(!result.has_header("not"));
    }

    #[test]
    fn test_short_line_ends_header_block() {
        let result = parse_request(b"GET / HTTP/1.0\r\nX-A: 1\r\na\nX-B: 2\r\n\r\n").unwrap();
        assert_eq!(result.headers.len(), 1);
        assert_eq!(result.get_header("X-A").unwrap(), "1");
        assert!(!result.has_header("X-B"));

        // three bytes is still a header line
        let result = parse_request(b"GET / HTTP/1.0\r\na:\n\r\n").unwrap();
        assert_eq!(result.get_header("a").unwrap(), "");
    }

    #[test]
    fn test_end_of_stream_ends_header_block() {
        let result = parse_request(b"GET / HTTP/1.0\r\nHost: example.com\r\n").unwrap();
        assert_eq!(result.headers.len(), 1);
    }

    #[test]
    fn test_invalid_header_format() {
        let request = b"GET / HTTP/1.0\r\nInvalidHeader\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedHeader(ref l)) if l == "InvalidHeader"));
    }

    #[test]
    fn test_header_without_name() {
        let result = parse_request(b"GET / HTTP/1.0\r\n: value\r\n\r\n");
        assert!(matches!(result, Err(Error::MalformedHeader(_))));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(parse_request(b""), Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_incomplete_request_line() {
        assert!(matches!(parse_request(b"GET\r\n"), Err(Error::MalformedRequestLine(ref l)) if l == "GET"));
        assert!(matches!(parse_request(b"\r\n\r\n"), Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_target_without_path() {
        let result = parse_request(b"GET ?q=1 HTTP/1.0\r\n\r\n");
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_extension_and_invalid_methods() {
        let result = parse_request(b"BREW /pot HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(result.method, Method::Extension("BREW".to_string()));
        assert_eq!(result.method.to_string(), "BREW");

        let result = parse_request(b"G(T / HTTP/1.0\r\n\r\n");
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "G(T"));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::GET.to_string(), "GET");
        assert_eq!(Method::HEAD.to_string(), "HEAD");
        assert_eq!(Method::POST.to_string(), "POST");
        assert_eq!(Method::OPTIONS.as_str(), "OPTIONS");
    }

    #[test]
    fn test_malformed_utf8_in_request() {
        let request = b"GET / HTTP/1.0\r\nX-Test: \xFF\xFF\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::InvalidEncoding)));
    }

    #[test]
    fn test_set_peer() {
        let mut request = HttpRequest::new(Method::GET, "/", Vec::new());
        request.set_peer("192.0.2.7:40123".parse().unwrap());
        assert_eq!(request.peer_host, "192.0.2.7");
        assert_eq!(request.peer_port, "40123");
    }

    #[tokio::test]
    async fn test_read_request_leaves_body_unread() {
        let mut input: &[u8] = b"POST /upload HTTP/1.0\r\nHost: a\r\n\r\nbody bytes";
        let result = read_request(&mut input, 8192).await.unwrap();
        assert_eq!(result.method, Method::POST);
        assert_eq!(result.uri, "/upload");
        assert_eq!(input, b"body bytes");
    }

    #[tokio::test]
    async fn test_read_request_empty_stream() {
        let mut input: &[u8] = b"";
        let result = read_request(&mut input, 8192).await;
        assert!(matches!(result, Err(Error::EmptyRequest)));
    }

    #[tokio::test]
    async fn test_read_request_line_limit() {
        // exactly at the limit, terminator included
        let mut input: &[u8] = b"GET / HTTP/1.0\r\n\r\n";
        assert!(read_request(&mut input, 16).await.is_ok());

        let mut input: &[u8] = b"GET /a-rather-long-path HTTP/1.0\r\n\r\n";
        let result = read_request(&mut input, 16).await;
        assert!(matches!(result, Err(Error::LineTooLong(16))));
    }

    #[tokio::test]
    async fn test_read_request_matches_slice_parser() {
        let raw = b"GET /docs/?page=2 HTTP/1.0\r\nHost: localhost\r\nAccept: text/html\r\n\r\n";
        let mut input: &[u8] = raw;
        let streamed = read_request(&mut input, 8192).await.unwrap();
        let sliced = parse_request(raw).unwrap();
        assert_eq!(streamed.uri, sliced.uri);
        assert_eq!(streamed.query, sliced.query);
        assert_eq!(streamed.headers, sliced.headers);
    }
}
