//! Authentication route handlers.
//!
//! Handles signup, login, and logout with database-backed sessions. Form
//! failures redirect back to the page with an error code in the query string
//! rather than re-rendering inline, so a refresh never resubmits the form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::services::auth::AuthError;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Query parameters for error/notice display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
}

/// Translate a login error code into a display message.
fn login_error_message(code: &str) -> Option<String> {
    let message = match code {
        "credentials" => "Invalid email or password.",
        "session" => "Something went wrong saving your session. Please try again.",
        _ => return None,
    };
    Some(message.to_owned())
}

/// Translate a login notice code into a display message.
fn login_notice_message(code: &str) -> Option<String> {
    let message = match code {
        "login_required" => "Please log in to continue.",
        "checkout_expired" => "Your checkout session expired. Log in to see your orders.",
        "logged_out" => "You have been logged out.",
        _ => return None,
    };
    Some(message.to_owned())
}

/// Translate a signup error code into a display message.
fn signup_error_message(code: &str) -> Option<String> {
    let message = match code {
        "email_taken" => "An account with this email already exists.",
        "invalid_email" => "That doesn't look like a valid email address.",
        "password_too_short" => "Password must be at least 8 characters.",
        "name_required" => "Please tell us what to call you.",
        "session" => "Something went wrong saving your session. Please try again.",
        _ => return None,
    };
    Some(message.to_owned())
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().and_then(login_error_message),
        notice: query.notice.as_deref().and_then(login_notice_message),
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let result = AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await;

    match result {
        Ok(user) => establish_session(&session, &user).await,
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            tracing::warn!("login failed");
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "login error");
            crate::error::AppError::from(e).into_response()
        }
    }
}

/// Display the signup page.
pub async fn signup_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SignupTemplate {
        error: query.error.as_deref().and_then(signup_error_message),
    }
}

/// Handle signup form submission.
///
/// A successful signup logs the user straight in.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let result = AuthService::new(state.pool())
        .signup(&form.email, &form.password, &form.display_name)
        .await;

    match result {
        Ok(user) => establish_session(&session, &user).await,
        Err(AuthError::UserAlreadyExists) => {
            Redirect::to("/auth/signup?error=email_taken").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/signup?error=invalid_email").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/auth/signup?error=password_too_short").into_response()
        }
        Err(AuthError::InvalidDisplayName(_)) => {
            Redirect::to("/auth/signup?error=name_required").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "signup error");
            crate::error::AppError::from(e).into_response()
        }
    }
}

/// Handle logout.
///
/// Clears the session; the cart stays in the database for the next login.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "failed to clear session");
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "failed to flush session");
    }

    clear_sentry_user();

    Redirect::to("/auth/login?notice=logged_out").into_response()
}

/// Store the logged-in user in the session and send them to the catalog.
async fn establish_session(session: &Session, user: &User) -> Response {
    let current_user = CurrentUser::from(user);

    if let Err(e) = set_current_user(session, &current_user).await {
        tracing::error!(error = %e, "failed to set session");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_ref()));

    Redirect::to("/products").into_response()
}
