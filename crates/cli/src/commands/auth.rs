//! `login`, `logout` and `status`.

use secrecy::SecretString;
use tracing::info;

use super::App;
use crate::error::CliError;
use crate::output;

pub async fn login(app: &App, email: &str, password: SecretString) -> Result<(), CliError> {
    let user = app
        .session
        .login(email, &password)
        .await
        .map_err(CliError::LoginFailed)?;

    info!(user_id = %user.id, "session saved");
    output::line("Signed in.");
    output::user(&user);
    Ok(())
}

pub async fn logout(app: &App) {
    app.session.logout().await;
    output::line("Signed out.");
}

pub async fn status(app: &App) -> Result<(), CliError> {
    let state = app.session.check_auth_status().await;

    match state.user() {
        Some(user) => {
            output::line("Signed in.");
            output::user(user);
        }
        None => output::line("Not signed in."),
    }
    Ok(())
}
