// Form login
//
// GET /login renders the form, POST /login checks the password and starts a
// session, POST /logout ends it. A successful login always lands on /design.

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use super::guard::session_token;
use super::{found, ApiError, AppState};
use crate::repository::UserRepository;
use crate::security::{check_credentials, Principal, SESSION_COOKIE};

pub const LOGIN_SUCCESS_URL: &str = "/design";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /login
pub async fn login_form(RawQuery(query): RawQuery) -> Html<String> {
    let flags: Vec<&str> = query
        .as_deref()
        .map(|q| q.split('&').map(|kv| kv.split('=').next().unwrap_or("")).collect())
        .unwrap_or_default();

    let notice = if flags.contains(&"error") {
        r#"<p class="error">Unable to login. Check your username and password.</p>"#
    } else if flags.contains(&"logout") {
        r#"<p class="info">You have been logged out.</p>"#
    } else {
        ""
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>Taco Cloud</title></head>
  <body>
    <h1>Login</h1>
    {notice}
    <form method="POST" action="/login">
      <label for="username">Username: </label>
      <input type="text" name="username" id="username" /><br/>
      <label for="password">Password: </label>
      <input type="password" name="password" id="password" /><br/>
      <input type="submit" value="Login"/>
    </form>
  </body>
</html>
"#
    ))
}

/// POST /login
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let user = {
        let conn = state.db.lock();
        let lookup = UserRepository::new(&conn).find_by_username(&form.username);
        lookup
    };

    let user = match user {
        Ok(user) => user,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let username = form.username;
    let password = form.password;
    let principal = match user {
        Some(user) => credential_outcome(
            &username,
            tokio::task::spawn_blocking(move || check_credentials(&user, &password)).await,
        ),
        None => None,
    };

    match principal {
        Some(principal) => {
            let token = state.sessions.create(principal);
            info!(user = %username, "login succeeded");

            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                SESSION_COOKIE, token
            );
            (
                StatusCode::FOUND,
                [
                    (header::LOCATION, LOGIN_SUCCESS_URL.to_string()),
                    (header::SET_COOKIE, cookie),
                ],
            )
                .into_response()
        }
        None => {
            warn!(user = %username, "login failed");
            found("/login?error")
        }
    }
}

/// A failed bcrypt task counts as a rejected login, but is logged.
fn credential_outcome(
    username: &str,
    result: Result<Option<Principal>, JoinError>,
) -> Option<Principal> {
    match result {
        Ok(principal) => principal,
        Err(e) => {
            error!(user = %username, error = %e, "password check task failed");
            None
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token);
    }

    let cleared = format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE);
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/login?logout".to_string()),
            (header::SET_COOKIE, cleared),
        ],
    )
        .into_response()
}
