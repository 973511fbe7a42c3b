//! Server-rendered HTML pages.
//!
//! Pages are assembled with `format!`; every piece of user-supplied text goes
//! through [`html_escape`].

use std::fmt::Write;

use aashray_common::FieldError;
use aashray_core::{
    AdminOverview, BoardQuery, CaseReportInput, Identity, RegistrationInput, Role, TeamBoard,
    VolunteerSummary,
};
use aashray_db::entities::{
    case::{self, CasePriority, CaseStatus},
    user,
};
use axum::{http::StatusCode, response::Html};

use crate::flash::Notice;

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn nav(identity: Option<&Identity>) -> String {
    let Some(identity) = identity else {
        return r#"<a class="nav-link" href="/login/">Login</a>
<a class="nav-link" href="/register/">Register</a>"#
            .to_string();
    };

    let role = identity.role();
    let mut links = String::from(
        r#"<a class="nav-link" href="/volunteer/home/">Home</a>
<a class="nav-link" href="/volunteer/report/">Report Case</a>
<a class="nav-link" href="/cases/">Case Board</a>"#,
    );
    if role >= Role::Team {
        links.push_str(r#"<a class="nav-link" href="/team/dashboard/">Team Dashboard</a>"#);
    }
    if role == Role::Admin {
        links.push_str(r#"<a class="nav-link" href="/dashboard/">Admin Dashboard</a>"#);
    }
    let _ = write!(
        links,
        r#"<span class="navbar-text mx-2">{} ({})</span>
<form method="post" action="/logout/" class="d-inline"><button class="btn btn-sm btn-outline-light">Logout</button></form>"#,
        html_escape(&identity.user.username),
        role.label()
    );
    links
}

fn notices_html(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| {
            format!(
                r#"<div class="alert alert-{}" role="alert">{}</div>"#,
                n.level.css_class(),
                html_escape(&n.text)
            )
        })
        .collect()
}

fn layout(title: &str, identity: Option<&Identity>, notices: &[Notice], body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Aashray</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
</head>
<body>
<nav class="navbar navbar-dark bg-dark px-3"><a class="navbar-brand" href="/">Aashray</a><div class="d-flex align-items-center">{nav}</div></nav>
<main class="container my-4">
{notices}
{body}
</main>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav(identity),
        notices = notices_html(notices),
    ))
}

fn priority_badge(priority: CasePriority) -> String {
    format!(
        r#"<span class="badge bg-{}">{}</span>"#,
        priority.badge_class(),
        priority.label()
    )
}

fn status_badge(status: CaseStatus) -> String {
    format!(
        r#"<span class="badge bg-{}">{}</span>"#,
        status.badge_class(),
        status.label()
    )
}

fn case_card(case: &case::Model, image_url: &dyn Fn(&str) -> String, actions: &str) -> String {
    let image = case
        .image
        .as_deref()
        .map(|key| {
            format!(
                r#"<img src="{}" class="img-fluid rounded mb-2" alt="Case image">"#,
                html_escape(&image_url(key))
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="card mb-3"><div class="card-body">
<h5 class="card-title">#{id} {case_type} {priority} {status}</h5>
{image}
<p class="mb-1"><strong>Place:</strong> {place}</p>
<p class="mb-1"><strong>Needs:</strong> {needs}</p>
<p class="text-muted small mb-2">Reported {created}</p>
{actions}
</div></div>"#,
        id = case.id,
        case_type = html_escape(&case.case_type),
        priority = priority_badge(case.priority),
        status = status_badge(case.status),
        place = html_escape(&case.place_spotted),
        needs = html_escape(&case.needs),
        created = case.created_at.format("%b %d, %Y %H:%M"),
    )
}

fn case_list(cases: &[case::Model], image_url: &dyn Fn(&str) -> String, empty: &str) -> String {
    if cases.is_empty() {
        return format!(r#"<p class="text-muted">{empty}</p>"#);
    }
    cases.iter().map(|c| case_card(c, image_url, "")).collect()
}

fn field_errors_for(errors: &[FieldError], field: &str) -> String {
    errors
        .iter()
        .filter(|e| e.field == field)
        .map(|e| format!(r#"<div class="invalid-feedback d-block">{}</div>"#, html_escape(&e.message())))
        .collect()
}

fn text_input(name: &str, label: &str, kind: &str, value: &str, errors: &[FieldError]) -> String {
    format!(
        r#"<div class="mb-3"><label class="form-label" for="id_{name}">{label}</label>
<input class="form-control" type="{kind}" name="{name}" id="id_{name}" value="{value}">{errors}</div>"#,
        value = html_escape(value),
        errors = field_errors_for(errors, name),
    )
}

fn select(
    name: &str,
    label: &str,
    options: &[(&str, &str)],
    selected: &str,
    placeholder: Option<&str>,
) -> String {
    let mut html = format!(
        r#"<label class="form-label me-2" for="id_{name}">{label}</label><select class="form-select" name="{name}" id="id_{name}">"#
    );
    if let Some(placeholder) = placeholder {
        let _ = write!(html, r#"<option value="">{placeholder}</option>"#);
    }
    for (value, text) in options {
        let attr = if *value == selected { " selected" } else { "" };
        let _ = write!(html, r#"<option value="{value}"{attr}>{text}</option>"#);
    }
    html.push_str("</select>");
    html
}

fn priority_options() -> Vec<(&'static str, &'static str)> {
    CasePriority::ALL.iter().map(|p| (p.as_str(), p.label())).collect()
}

fn status_options() -> Vec<(&'static str, &'static str)> {
    CaseStatus::ALL.iter().map(|s| (s.as_str(), s.label())).collect()
}

/// Login form.
#[must_use]
pub fn login_page(notices: &[Notice], username: &str) -> Html<String> {
    let body = format!(
        r#"<div class="row justify-content-center"><div class="col-md-5">
<h2 class="mb-3">Login</h2>
<form method="post" action="/login/">
{username}
{password}
<button class="btn btn-primary w-100" type="submit">Login</button>
</form>
<p class="mt-3">No account yet? <a href="/register/">Register</a></p>
</div></div>"#,
        username = text_input("username", "Username", "text", username, &[]),
        password = text_input("password", "Password", "password", "", &[]),
    );
    layout("Login", None, notices, &body)
}

/// Registration form, re-filled with the non-secret values.
#[must_use]
pub fn register_page(
    notices: &[Notice],
    input: &RegistrationInput,
    errors: &[FieldError],
) -> Html<String> {
    let body = format!(
        r#"<div class="row justify-content-center"><div class="col-md-6">
<h2 class="mb-3">Register as a Volunteer</h2>
<form method="post" action="/register/">
{username}{first_name}{last_name}{email}{password1}{password2}
<button class="btn btn-success w-100" type="submit">Register</button>
</form>
<p class="mt-3">Already registered? <a href="/login/">Login</a></p>
</div></div>"#,
        username = text_input("username", "Username", "text", &input.username, errors),
        first_name = text_input("first_name", "First name", "text", &input.first_name, errors),
        last_name = text_input("last_name", "Last name", "text", &input.last_name, errors),
        email = text_input("email", "Email", "email", &input.email, errors),
        password1 = text_input("password1", "Password", "password", "", errors),
        password2 = text_input("password2", "Confirm password", "password", "", errors),
    );
    layout("Register", None, notices, &body)
}

/// Volunteer home: own recent cases and total.
#[must_use]
pub fn volunteer_home_page(
    identity: &Identity,
    notices: &[Notice],
    summary: &VolunteerSummary,
    image_url: &dyn Fn(&str) -> String,
) -> Html<String> {
    let body = format!(
        r#"<h2>Welcome, {name}</h2>
<p>You have reported <strong>{total}</strong> case(s). <a class="btn btn-primary btn-sm ms-2" href="/volunteer/report/">Report a case</a></p>
<h4 class="mt-4">Your recent cases</h4>
{cases}"#,
        name = html_escape(identity.user.display_name()),
        total = summary.total,
        cases = case_list(&summary.recent, image_url, "You have not reported any cases yet."),
    );
    layout("Home", Some(identity), notices, &body)
}

/// Case report form.
#[must_use]
pub fn report_page(
    identity: &Identity,
    notices: &[Notice],
    input: &CaseReportInput,
    errors: &[FieldError],
) -> Html<String> {
    let priority = input.priority.as_deref().unwrap_or_default();
    let body = format!(
        r#"<h2 class="mb-3">Report a Case</h2>
<form method="post" action="/volunteer/report/" enctype="multipart/form-data">
{case_type}
{place_spotted}
<div class="mb-3"><label class="form-label" for="id_needs">Needs</label>
<textarea class="form-control" name="needs" id="id_needs" rows="4">{needs}</textarea>{needs_errors}</div>
<div class="mb-3">{priority}{priority_errors}</div>
<div class="mb-3"><label class="form-label" for="id_image">Image</label>
<input class="form-control" type="file" name="image" id="id_image" accept="image/*">{image_errors}</div>
<button class="btn btn-primary" type="submit">Submit</button>
</form>"#,
        case_type = text_input(
            "case_type",
            "Case type",
            "text",
            input.case_type.as_deref().unwrap_or_default(),
            errors
        ),
        place_spotted = text_input(
            "place_spotted",
            "Place spotted",
            "text",
            input.place_spotted.as_deref().unwrap_or_default(),
            errors
        ),
        needs = html_escape(input.needs.as_deref().unwrap_or_default()),
        needs_errors = field_errors_for(errors, "needs"),
        priority = select("priority", "Priority", &priority_options(), priority, Some("---------")),
        priority_errors = field_errors_for(errors, "priority"),
        image_errors = field_errors_for(errors, "image"),
    );
    layout("Report Case", Some(identity), notices, &body)
}

/// Case board with filters.
#[must_use]
pub fn case_board_page(
    identity: &Identity,
    notices: &[Notice],
    cases: &[case::Model],
    query: &BoardQuery,
    image_url: &dyn Fn(&str) -> String,
) -> Html<String> {
    let body = format!(
        r#"<h2 class="mb-3">Case Board</h2>
<form method="get" action="/cases/" class="row g-2 align-items-end mb-4">
<div class="col-auto">{status}</div>
<div class="col-auto">{priority}</div>
<div class="col-auto"><button class="btn btn-secondary" type="submit">Filter</button></div>
</form>
<p class="text-muted">{count} case(s)</p>
{cases}"#,
        status = select(
            "status",
            "Status",
            &status_options(),
            query.status.as_deref().unwrap_or_default(),
            Some("All")
        ),
        priority = select(
            "priority",
            "Priority",
            &priority_options(),
            query.priority.as_deref().unwrap_or_default(),
            Some("All")
        ),
        count = cases.len(),
        cases = case_list(cases, image_url, "No cases found."),
    );
    layout("Case Board", Some(identity), notices, &body)
}

fn status_form(case: &case::Model) -> String {
    format!(
        r#"<form method="post" action="/team/case/{id}/update/" class="d-flex gap-2">{select}<button class="btn btn-sm btn-primary" type="submit">Update</button></form>"#,
        id = case.id,
        select = select("status", "Status", &status_options(), case.status.as_str(), None),
    )
}

/// Team dashboard with the three status columns.
#[must_use]
pub fn team_dashboard_page(
    identity: &Identity,
    notices: &[Notice],
    board: &TeamBoard,
    image_url: &dyn Fn(&str) -> String,
) -> Html<String> {
    let column = |title: &str, cases: &[case::Model]| {
        let cards: String = if cases.is_empty() {
            r#"<p class="text-muted">Nothing here.</p>"#.to_string()
        } else {
            cases
                .iter()
                .map(|c| case_card(c, image_url, &status_form(c)))
                .collect()
        };
        format!(
            r#"<div class="col-md-4"><h4>{title} <span class="badge bg-secondary">{count}</span></h4>{cards}</div>"#,
            count = cases.len()
        )
    };

    let body = format!(
        r#"<h2 class="mb-3">Team Dashboard</h2><div class="row">{}{}{}</div>"#,
        column("Pending", &board.pending),
        column("In Progress", &board.in_progress),
        column("Resolved", &board.resolved),
    );
    layout("Team Dashboard", Some(identity), notices, &body)
}

fn user_rows(users: &[user::Model], action: &str, label: &str, style: &str) -> String {
    if users.is_empty() {
        return r#"<tr><td colspan="3" class="text-muted">None</td></tr>"#.to_string();
    }
    users
        .iter()
        .map(|u| {
            format!(
                r#"<tr><td>{username}</td><td>{email}</td><td><form method="post" action="/dashboard/{action}/{id}/"><button class="btn btn-sm btn-{style}" type="submit">{label}</button></form></td></tr>"#,
                username = html_escape(&u.username),
                email = html_escape(&u.email),
                id = u.id,
            )
        })
        .collect()
}

/// Admin dashboard.
#[must_use]
pub fn admin_dashboard_page(
    identity: &Identity,
    notices: &[Notice],
    overview: &AdminOverview,
    image_url: &dyn Fn(&str) -> String,
) -> Html<String> {
    let stat = |label: &str, value: u64| {
        format!(
            r#"<div class="col"><div class="card text-center"><div class="card-body"><h3>{value}</h3><p class="mb-0">{label}</p></div></div></div>"#
        )
    };

    let body = format!(
        r#"<h2 class="mb-3">Admin Dashboard</h2>
<div class="row mb-4">{total}{pending}{resolved}{users}</div>
<h4>Team members</h4>
<table class="table"><thead><tr><th>Username</th><th>Email</th><th></th></tr></thead><tbody>{team}</tbody></table>
<h4>Volunteers</h4>
<table class="table"><thead><tr><th>Username</th><th>Email</th><th></th></tr></thead><tbody>{volunteers}</tbody></table>
<h4>Recent cases</h4>
{recent}"#,
        total = stat("Total Cases", overview.total_cases),
        pending = stat("Pending", overview.pending_cases),
        resolved = stat("Resolved", overview.resolved_cases),
        users = stat("Users", overview.total_users),
        team = user_rows(&overview.team_members, "remove", "Remove from Team", "outline-danger"),
        volunteers = user_rows(&overview.volunteers, "appoint", "Appoint to Team", "outline-success"),
        recent = case_list(&overview.recent_cases, image_url, "No cases reported yet."),
    );
    layout("Admin Dashboard", Some(identity), notices, &body)
}

/// 404 page.
#[must_use]
pub fn not_found_page() -> Html<String> {
    layout(
        "Not Found",
        None,
        &[],
        r#"<h2>Page not found</h2><p>The page you requested does not exist.</p><a href="/">Back to start</a>"#,
    )
}

/// Generic error page.
#[must_use]
pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let body = format!(
        r#"<h2>{status}</h2><p>{message}</p><a href="/">Back to start</a>"#,
        message = html_escape(message),
    );
    layout("Error", None, &[], &body)
}
