//! Session commands.
//!
//! ```bash
//! hh login -e asha@example.in -p 'secret'
//! hh register -n "Asha Rao" -e asha@example.in --phone 9800000000 -p 'secret'
//! hh whoami --refresh
//! hh logout
//! ```

use handyhub_client::api::RegisterRequest;
use handyhub_core::{Email, UserProfile};

use super::{App, CommandError};
use crate::output;

fn print_profile(user: &UserProfile) {
    output::line(&format!("{} <{}> ({})", user.name, user.email, user.role));
    if let Some(phone) = &user.phone {
        output::line(&format!("phone: {phone}"));
    }
    if user.role.is_staff() {
        output::line("Staff account: jobs and assignments are managed in the operations console");
    }
}

/// Log in and persist the session.
///
/// # Errors
///
/// Returns error if the email is malformed or the backend rejects the login.
pub async fn login(app: &App, email: &str, password: String) -> Result<(), CommandError> {
    let email = Email::parse(email)?;
    let user = app.api.login(email, password).await?;

    output::line(&format!("Logged in as {}", user.name));
    Ok(())
}

/// Register a customer account and persist the session.
///
/// # Errors
///
/// Returns error if the email is malformed or the backend rejects the
/// registration.
pub async fn register(
    app: &App,
    name: String,
    email: &str,
    phone: Option<String>,
    password: String,
) -> Result<(), CommandError> {
    let request = RegisterRequest {
        name,
        email: Email::parse(email)?,
        phone,
        password,
    };
    let user = app.api.register(request).await?;

    output::line(&format!("Welcome, {}", user.name));
    Ok(())
}

/// Forget the local session.
pub fn logout(app: &App) {
    app.api.logout();
    output::line("Logged out");
}

/// Show the cached profile, optionally refreshed from the backend.
///
/// # Errors
///
/// Returns error if anonymous or the refresh fails. A 401 on refresh also
/// ends the session.
pub async fn whoami(app: &App, refresh: bool) -> Result<(), CommandError> {
    app.require_session()?;

    let user = if refresh {
        app.api.me().await?
    } else {
        app.session.user().ok_or(CommandError::NotLoggedIn)?
    };

    print_profile(&user);
    Ok(())
}
