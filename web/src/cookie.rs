//! Browser-backed implementation of the cookie capability.
//!
//! [`BrowserCookies`] is built from an incoming request's `Cookie` header
//! and accumulates `Set-Cookie` values while the flow runs. The controller
//! applies the pending headers onto whatever response it produces, so a
//! redirect and its cookie effects always travel together.

use std::collections::HashMap;

use axum::http::header::{HeaderMap, COOKIE, SET_COOKIE};
use axum::http::HeaderValue;
use axum::response::Response;
use log::*;

use domain::{CookieOptions, CookieStore};

#[derive(Debug, Default)]
pub struct BrowserCookies {
    values: HashMap<String, String>,
    pending: Vec<String>,
}

impl BrowserCookies {
    /// Parse the `Cookie` header(s) of an incoming request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(header) = header.to_str() else { continue };
            for pair in header.split(';') {
                if let Some((name, value)) = pair.split_once('=') {
                    values.insert(name.trim().to_string(), value.trim().to_string());
                }
            }
        }

        Self {
            values,
            pending: Vec::new(),
        }
    }

    /// Append every pending `Set-Cookie` to the response headers.
    pub fn apply(self, mut response: Response) -> Response {
        for cookie in &self.pending {
            match HeaderValue::from_str(cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => warn!("Dropping unencodable Set-Cookie header: {e}"),
            }
        }
        response
    }

    fn render(name: &str, value: &str, options: &CookieOptions) -> String {
        let mut cookie = format!("{name}={value}; Path={}", options.path);
        if let Some(max_age) = options.max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        cookie.push_str(&format!("; SameSite={}", options.same_site.as_str()));
        if options.http_only {
            cookie.push_str("; HttpOnly");
        }
        if options.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl CookieStore for BrowserCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.values.insert(name.to_string(), value.to_string());
        self.pending.push(Self::render(name, value, options));
    }

    fn clear(&mut self, name: &str) {
        self.values.remove(name);
        // Path must match the original write for the browser to drop it
        let expired = CookieOptions {
            max_age: Some(0),
            ..CookieOptions::default()
        };
        self.pending.push(Self::render(name, "", &expired));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parses_cookie_header_pairs() {
        let cookies =
            BrowserCookies::from_headers(&headers_with_cookie("oauth_state=abc; other=1;x=2"));

        assert_eq!(cookies.get("oauth_state").as_deref(), Some("abc"));
        assert_eq!(cookies.get("other").as_deref(), Some("1"));
        assert_eq!(cookies.get("x").as_deref(), Some("2"));
        assert!(cookies.get("missing").is_none());
    }

    #[test]
    fn test_set_is_readable_and_renders_attributes() {
        let mut cookies = BrowserCookies::from_headers(&HeaderMap::new());
        cookies.set("oauth_state", "xyz", &CookieOptions::short_lived(true, 600));

        assert_eq!(cookies.get("oauth_state").as_deref(), Some("xyz"));

        let response = cookies.apply(Response::new(Body::empty()));
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("oauth_state=xyz"));
        assert!(set_cookie.contains("Path=/"));
        assert!(set_cookie.contains("Max-Age=600"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Secure"));
    }

    #[test]
    fn test_clear_expires_cookie_on_client() {
        let mut cookies = BrowserCookies::from_headers(&headers_with_cookie("oauth_session=blob"));
        cookies.clear("oauth_session");

        assert!(cookies.get("oauth_session").is_none());

        let response = cookies.apply(Response::new(Body::empty()));
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("oauth_session=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_apply_appends_every_pending_cookie() {
        let mut cookies = BrowserCookies::from_headers(&HeaderMap::new());
        cookies.set("a", "1", &CookieOptions::session(false));
        cookies.clear("b");

        let response = cookies.apply(Response::new(Body::empty()));
        let set: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(set.len(), 2);
    }
}
