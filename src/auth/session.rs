use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use bson::oid::ObjectId;

/// Signed cookie carrying the signed-in user's id.
pub const SESSION_COOKIE: &str = "perkboard_session";

/// Short-lived cookie holding CSRF state and nonce during provider sign-in.
pub const LOGIN_COOKIE: &str = "perkboard_login";

const SESSION_DAYS: i64 = 30;
const LOGIN_MINUTES: i64 = 10;

pub fn start_session(jar: SignedCookieJar, user_id: &ObjectId) -> SignedCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, user_id.to_hex()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build();

    jar.add(cookie)
}

pub fn end_session(jar: SignedCookieJar) -> SignedCookieJar {
    let cookie = Cookie::build(SESSION_COOKIE).path("/").removal().build();
    jar.remove(cookie)
}

/// The user id stored in a verified session cookie, if any.
pub fn session_user_id(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

pub fn store_pending_login(jar: SignedCookieJar, value: String) -> SignedCookieJar {
    let cookie = Cookie::build((LOGIN_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(LOGIN_MINUTES))
        .build();

    jar.add(cookie)
}

/// Remove and return the pending-login cookie value.
pub fn take_pending_login(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    let value = jar.get(LOGIN_COOKIE).map(|c| c.value().to_string());
    let cookie = Cookie::build(LOGIN_COOKIE).path("/").removal().build();
    (jar.remove(cookie), value)
}
