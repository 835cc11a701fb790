//! Server-rendered pages. Markup is deliberately plain; every piece of user
//! supplied text goes through [`escape`].

use axum::http::{StatusCode, header};
use axum::response::{AppendHeaders, Html, IntoResponse, Response};

use super::cookies::clear_notice_cookie;
use super::forms::FormErrors;
use super::middleware::session::Viewer;
use crate::application::feedback_service::UserPage;
use crate::domain::access::can_mutate;
use crate::domain::post::Post;

pub(crate) struct Page {
    status: StatusCode,
    html: String,
    consumed_notice: bool,
}

impl Page {
    pub(crate) fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let html = Html(self.html);
        if self.consumed_notice {
            let clear = AppendHeaders([(header::SET_COOKIE, clear_notice_cookie())]);
            (self.status, clear, html).into_response()
        } else {
            (self.status, html).into_response()
        }
    }
}

pub(crate) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(viewer: &Viewer, title: &str, body: &str) -> Page {
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} | Feedback</title></head>\n<body>\n<nav><a href=\"/\">Feedback</a>",
        escape(title)
    );
    match viewer.identity() {
        Some(username) => {
            let username = escape(username);
            html.push_str(&format!(
                " <a href=\"/users/{username}\">{username}</a> <form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>"
            ));
        }
        None => html.push_str(" <a href=\"/login\">Log in</a> <a href=\"/register\">Register</a>"),
    }
    html.push_str("</nav>\n");

    if let Some(notice) = viewer.notice() {
        let class = if notice.is_error() { "notice error" } else { "notice" };
        html.push_str(&format!(
            "<p class=\"{class}\">{}</p>\n",
            escape(notice.message())
        ));
    }

    html.push_str("<main>\n");
    html.push_str(body);
    html.push_str("</main>\n</body>\n</html>\n");

    Page {
        status: StatusCode::OK,
        html,
        consumed_notice: viewer.notice().is_some(),
    }
}

fn post_card(post: &Post, controls: bool) -> String {
    let mut html = format!(
        "<article class=\"feedback\"><h3>{}</h3><p>{}</p><p class=\"author\">by <a href=\"/users/{owner}\">{owner}</a></p>",
        escape(&post.title),
        escape(&post.content),
        owner = escape(&post.owner_username),
    );
    if controls {
        html.push_str(&format!(
            "<a href=\"/feedback/{id}/update\">Edit</a> <form method=\"post\" action=\"/feedback/{id}/delete\"><button type=\"submit\">Remove</button></form>",
            id = post.id
        ));
    }
    html.push_str("</article>\n");
    html
}

fn text_input(name: &str, label: &str, kind: &str, value: &str, errors: &FormErrors) -> String {
    let mut html = format!(
        "<p><label for=\"{name}\">{label}</label> <input id=\"{name}\" name=\"{name}\" type=\"{kind}\" value=\"{}\">",
        escape(value)
    );
    html.push_str(&field_error(errors, name));
    html.push_str("</p>\n");
    html
}

fn field_error(errors: &FormErrors, name: &str) -> String {
    errors
        .field(name)
        .map(|message| format!(" <span class=\"error\">{}</span>", escape(message)))
        .unwrap_or_default()
}

fn form_error(errors: &FormErrors) -> String {
    errors
        .form()
        .map(|message| format!("<p class=\"error\">{}</p>\n", escape(message)))
        .unwrap_or_default()
}

pub(crate) fn feed_page(viewer: &Viewer, posts: &[Post]) -> Page {
    let mut body = String::from("<h1>Recent Feedback</h1>\n");
    if let Some(username) = viewer.identity() {
        body.push_str(&format!(
            "<a href=\"/users/{}/feedback/add\">Add Feedback</a>\n",
            escape(username)
        ));
    }
    if posts.is_empty() {
        body.push_str("<p>No feedback yet.</p>\n");
    }
    for post in posts {
        body.push_str(&post_card(post, false));
    }
    layout(viewer, "Recent Feedback", &body)
}

/// Values echoed back into the registration form; the password never is.
pub(crate) struct RegisterValues<'a> {
    pub(crate) username: &'a str,
    pub(crate) email: &'a str,
    pub(crate) first_name: &'a str,
    pub(crate) last_name: &'a str,
}

pub(crate) fn register_page(viewer: &Viewer, values: &RegisterValues<'_>, errors: &FormErrors) -> Page {
    let mut body = String::from("<h1>Register</h1>\n");
    body.push_str(&form_error(errors));
    body.push_str("<form method=\"post\" action=\"/register\">\n");
    body.push_str(&text_input("username", "Username", "text", values.username, errors));
    body.push_str(&text_input("password", "Password", "password", "", errors));
    body.push_str(&text_input("email", "Email Address", "email", values.email, errors));
    body.push_str(&text_input("first_name", "First Name", "text", values.first_name, errors));
    body.push_str(&text_input("last_name", "Last Name", "text", values.last_name, errors));
    body.push_str("<button type=\"submit\">Register</button>\n</form>\n");
    layout(viewer, "Register", &body)
}

pub(crate) fn login_page(viewer: &Viewer, username: &str, errors: &FormErrors) -> Page {
    let mut body = String::from("<h1>Log in</h1>\n");
    body.push_str(&form_error(errors));
    body.push_str("<form method=\"post\" action=\"/login\">\n");
    body.push_str(&text_input("username", "Username", "text", username, errors));
    body.push_str(&text_input("password", "Password", "password", "", errors));
    body.push_str("<button type=\"submit\">Log in</button>\n</form>\n");
    layout(viewer, "Log in", &body)
}

pub(crate) fn user_page(viewer: &Viewer, page: &UserPage) -> Page {
    let user = &page.user;
    let username = escape(&user.username);
    let mut body = if page.can_manage {
        format!(
            "<h1>Details for {username}</h1>\n<ul><li>Name: {}</li><li>Email: {}</li></ul>\n\
             <a href=\"/users/{username}/feedback/add\">Add Feedback</a>\n\
             <form method=\"post\" action=\"/users/{username}/delete\"><button type=\"submit\">Delete account</button></form>\n",
            escape(&user.full_name()),
            escape(&user.email),
        )
    } else {
        format!("<h1>Feedback from {username}</h1>\n")
    };

    if page.posts.is_empty() {
        body.push_str("<p>No feedback yet.</p>\n");
    }
    for post in &page.posts {
        body.push_str(&post_card(post, can_mutate(viewer.identity(), post)));
    }
    layout(viewer, &user.username, &body)
}

pub(crate) struct FeedbackFormTarget {
    pub(crate) heading: String,
    pub(crate) action: String,
    pub(crate) submit: &'static str,
}

pub(crate) fn feedback_form_page(
    viewer: &Viewer,
    target: &FeedbackFormTarget,
    title: &str,
    content: &str,
    errors: &FormErrors,
) -> Page {
    let mut body = format!("<h1>{}</h1>\n", escape(&target.heading));
    body.push_str(&form_error(errors));
    body.push_str(&format!(
        "<form method=\"post\" action=\"{}\">\n",
        escape(&target.action)
    ));
    body.push_str(&text_input("title", "Title", "text", title, errors));
    body.push_str(&format!(
        "<p><label for=\"content\">Content</label> <textarea id=\"content\" name=\"content\">{}</textarea>",
        escape(content)
    ));
    body.push_str(&field_error(errors, "content"));
    body.push_str(&format!(
        "</p>\n<button type=\"submit\">{}</button>\n</form>\n",
        target.submit
    ));
    layout(viewer, &target.heading, &body)
}

pub(crate) fn error_page(status: StatusCode, message: &str) -> Page {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!("<h1>{}</h1>\n<p>{}</p>\n", escape(title), escape(message));
    layout(&Viewer::anonymous(), title, &body).with_status(status)
}
