//! User administration commands.

use bookstore_core::UserId;

use super::{App, CliError};

#[allow(clippy::print_stdout)]
pub async fn list(app: &App) -> Result<(), CliError> {
    app.require_admin()?;
    for user in app.users.list().await? {
        println!("{:<12} {:<24} {} ({})", user.id, user.name, user.email, user.role);
    }
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<(), CliError> {
    app.require_admin()?;
    app.users.delete(&UserId::new(id)).await?;
    tracing::info!("Deleted user {id}");
    Ok(())
}
