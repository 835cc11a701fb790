use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use cookie::{Cookie, SameSite};

use super::notice::Notice;

pub(crate) const SESSION_COOKIE: &str = "session";
pub(crate) const NOTICE_COOKIE: &str = "notice";

const NOTICE_MAX_AGE_SECONDS: i64 = 60;

#[derive(Debug, Clone, Copy)]
pub(crate) struct CookieSettings {
    pub(crate) secure: bool,
    pub(crate) session_max_age_seconds: i64,
}

impl CookieSettings {
    pub(crate) fn start_session(&self, token: &str) -> String {
        build_cookie(
            SESSION_COOKIE,
            token,
            self.session_max_age_seconds,
            self.secure,
        )
    }

    /// Drops the token from the browser; revoking it is the auth service's job.
    pub(crate) fn end_session(&self) -> String {
        build_cookie(SESSION_COOKIE, "", 0, self.secure)
    }
}

pub(crate) fn notice_cookie(notice: Notice) -> String {
    build_cookie(NOTICE_COOKIE, notice.code(), NOTICE_MAX_AGE_SECONDS, false)
}

pub(crate) fn clear_notice_cookie() -> String {
    build_cookie(NOTICE_COOKIE, "", 0, false)
}

fn build_cookie(name: &str, value: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age_seconds))
        .build();

    if secure {
        cookie.set_secure(true);
    }

    cookie.to_string()
}

/// First value of cookie `name` across all `Cookie` headers; empty counts as absent.
pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::header::COOKIE;
    use axum::http::{HeaderMap, HeaderValue};
    use cookie::{Cookie, SameSite};

    use super::{CookieSettings, clear_notice_cookie, notice_cookie, read_cookie};
    use crate::presentation::http::notice::Notice;

    #[test]
    fn read_cookie_finds_value_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("a=1; session=tok.en; b=2"));
        assert_eq!(read_cookie(&headers, "session").as_deref(), Some("tok.en"));
        assert_eq!(read_cookie(&headers, "b").as_deref(), Some("2"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn read_cookie_ignores_empty_values_and_prefix_matches() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("xsession=nope; session="));
        headers.append(COOKIE, HeaderValue::from_static("notice=forbidden"));
        assert_eq!(read_cookie(&headers, "session"), None);
        assert_eq!(read_cookie(&headers, "notice").as_deref(), Some("forbidden"));
    }

    #[test]
    fn session_cookie_attributes() {
        let settings = CookieSettings {
            secure: true,
            session_max_age_seconds: 3600,
        };
        let raw = settings.start_session("abc");
        let cookie = Cookie::parse(raw.as_str()).expect("set-cookie must parse");
        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));

        let raw = settings.end_session();
        let ended = Cookie::parse(raw.as_str()).expect("set-cookie must parse");
        assert_eq!(ended.value(), "");
        assert_eq!(ended.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn notice_cookies_set_and_clear() {
        let raw = notice_cookie(Notice::Forbidden);
        let set = Cookie::parse(raw.as_str()).expect("set-cookie must parse");
        assert_eq!(set.value(), "forbidden");
        assert_eq!(set.secure(), None);

        let raw = clear_notice_cookie();
        let cleared = Cookie::parse(raw.as_str()).expect("set-cookie must parse");
        assert_eq!(cleared.name(), "notice");
        assert_eq!(cleared.max_age(), Some(time::Duration::ZERO));
    }
}
