//! Session commands.

use secrecy::SecretString;

use super::{App, CliError};

pub async fn login(app: &App, email: &str, password: String) -> Result<(), CliError> {
    let user = app.auth.login(email, SecretString::from(password)).await?;
    tracing::info!("Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn signup(app: &App, email: &str, password: String, name: &str) -> Result<(), CliError> {
    let user = app
        .auth
        .signup(email, SecretString::from(password), name)
        .await?;
    tracing::info!("Account created. Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

pub fn logout(app: &App) -> Result<(), CliError> {
    app.auth.logout()?;
    tracing::info!("Logged out");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn whoami(app: &App) -> Result<(), CliError> {
    let user = app.require_user()?;
    let role = if user.is_admin() { "admin" } else { "customer" };
    println!("{} <{}> ({role}, id {})", user.name, user.email, user.id);
    Ok(())
}
