//! Account pages: signup, login/logout, the account view and the
//! self-service profile update.

use axum::extract::{Form, Multipart, Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use quill_core::error::AppError;
use quill_core::models::{NewUser, ProfileChanges};
use quill_ui::{
    AccountTemplate, AccountUpdateTemplate, LoggedOutTemplate, LoginTemplate, SignupTemplate,
};

use crate::error::{found, render, PageError};
use crate::extract::{viewer_of, CurrentUser, MaybeUser, SESSION_USER_KEY};
use crate::pages::forms;
use crate::AppState;

async fn start_session(session: &Session, user_id: i64) -> Result<(), PageError> {
    // Fresh session id on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|err| PageError::Internal(anyhow::anyhow!("session: {err}")))?;
    session
        .insert(SESSION_USER_KEY, user_id)
        .await
        .map_err(|err| PageError::Internal(anyhow::anyhow!("session: {err}")))
}

fn safe_next(next: &str) -> &str {
    // Only same-site paths are honored as return targets.
    if next.starts_with('/') && !next.starts_with("//") {
        next
    } else {
        "/"
    }
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

pub async fn login_form(
    viewer: MaybeUser,
    Query(query): Query<NextQuery>,
) -> Result<Html<String>, PageError> {
    render(LoginTemplate {
        viewer: viewer.viewer(),
        next: query.next.unwrap_or_else(|| "/".to_string()),
        error: None,
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
    #[serde(default)]
    next: String,
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state.auth.authenticate(&form.username, &form.password).await? {
        Some(user) => {
            start_session(&session, user.id).await?;
            Ok(found(safe_next(&form.next)))
        }
        None => render(LoginTemplate {
            viewer: None,
            next: form.next,
            // One message for unknown identifier and wrong password alike.
            error: Some("Invalid username/e-mail or password.".to_string()),
        })
        .map(IntoResponse::into_response),
    }
}

pub async fn logout(session: Session) -> Result<Html<String>, PageError> {
    session
        .flush()
        .await
        .map_err(|err| PageError::Internal(anyhow::anyhow!("session: {err}")))?;
    render(LoggedOutTemplate { viewer: None })
}

pub async fn signup_form(viewer: MaybeUser) -> Result<Html<String>, PageError> {
    render(SignupTemplate {
        viewer: viewer.viewer(),
        username: String::new(),
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        error: None,
    })
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    username: String,
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    password: String,
}

impl SignupForm {
    fn rerender(&self, error: String) -> SignupTemplate {
        SignupTemplate {
            viewer: None,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            error: Some(error),
        }
    }
}

pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, PageError> {
    let username = form.username.trim();
    let email = form.email.trim();
    if username.is_empty() || email.is_empty() || form.password.is_empty() {
        let template = form.rerender("username, e-mail and password are required".to_string());
        return render(template).map(IntoResponse::into_response);
    }

    let password_hash = state.auth.hash_password(&form.password)?;
    let new_user = NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash,
        first_name: Some(form.first_name.trim())
            .filter(|s| !s.is_empty())
            .map(String::from),
        last_name: Some(form.last_name.trim())
            .filter(|s| !s.is_empty())
            .map(String::from),
    };

    let user = match state.users.insert(new_user).await {
        Ok(user) => user,
        Err(AppError::Validation { message, .. }) => {
            let template = form.rerender(message);
            return render(template).map(IntoResponse::into_response);
        }
        Err(err) => return Err(err.into()),
    };

    // Best-effort verification mail; delivery failure never blocks signup.
    let mailer = state.mailer.clone();
    let to = user.email.clone();
    let token = Uuid::new_v4();
    tokio::spawn(async move {
        let body = format!("Welcome to Quill! Confirm your address with token {token}.");
        if let Err(err) = mailer.send(&to, "Confirm your Quill account", &body).await {
            tracing::warn!(error = %err, "verification mail failed");
        }
    });

    start_session(&session, user.id).await?;
    Ok(found("/"))
}

pub async fn account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, PageError> {
    let subscribers = state
        .follows
        .list_followers(user.id)
        .await?
        .into_iter()
        .map(|edge| edge.user_username)
        .collect();

    render(AccountTemplate {
        viewer: viewer_of(&user),
        username: user.username.clone(),
        email: user.email.clone(),
        display: user.display_name(),
        avatar_url: user.avatar.as_deref().map(|id| state.media.url(id)),
        subscribers,
    })
}

pub async fn account_update_form(
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, PageError> {
    render(AccountUpdateTemplate {
        viewer: viewer_of(&user),
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone().unwrap_or_default(),
        last_name: user.last_name.clone().unwrap_or_default(),
        error: None,
    })
}

pub async fn account_update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Response, PageError> {
    let form = forms::read_account_form(&mut multipart).await?;

    let rerender = |error: String| AccountUpdateTemplate {
        viewer: viewer_of(&user),
        username: form.username.clone(),
        email: form.email.clone(),
        first_name: form.first_name.clone().unwrap_or_default(),
        last_name: form.last_name.clone().unwrap_or_default(),
        error: Some(error),
    };

    if form.username.trim().is_empty() || form.email.trim().is_empty() {
        let template = rerender("username and e-mail are required".to_string());
        return render(template).map(IntoResponse::into_response);
    }

    let avatar = match &form.avatar {
        Some(bytes) => match state.media.save(bytes.clone()).await {
            Ok(id) => Some(id),
            Err(AppError::Validation { message, .. }) => {
                let template = rerender(message);
                return render(template).map(IntoResponse::into_response);
            }
            Err(err) => return Err(err.into()),
        },
        None => None,
    };

    let changes = ProfileChanges {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        avatar,
    };

    match state.users.update_profile(user.id, changes).await {
        Ok(_) => Ok(found("/auth/account/")),
        Err(AppError::Validation { message, .. }) => {
            let template = rerender(message);
            render(template).map(IntoResponse::into_response)
        }
        Err(err) => Err(err.into()),
    }
}
