//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! mercata-cli admin create -e admin@example.com -n "Admin Name" -p 'pass1234'
//! ```
//!
//! # Environment Variables
//!
//! - `MERCATA_DATABASE_URL` - `PostgreSQL` connection string

use std::io::{BufRead, Write as _};

use mercata_core::{Email, UserRole};

use mercata_api::db::users::{NewUser, UserRepository};
use mercata_api::db::{RepositoryError, create_pool};
use mercata_api::services::auth::hash_password;

use super::CommandError;

/// Create a new admin user.
///
/// The password is prompted for on stdin when not supplied as a flag.
///
/// # Errors
///
/// Returns `CommandError::InvalidInput` for a bad email/password and
/// `CommandError::Database` for connection failures.
pub async fn create_user(
    email: &str,
    name: &str,
    password: Option<&str>,
) -> Result<(), CommandError> {
    let email = Email::parse(email)
        .map_err(|e| CommandError::InvalidInput(format!("invalid email: {e}")))?;

    let password = match password {
        Some(p) => p.to_owned(),
        None => prompt_password()?,
    };
    if password.len() < 8 {
        return Err(CommandError::InvalidInput(
            "password must be at least 8 characters".to_owned(),
        ));
    }

    let password_hash = hash_password(&password)
        .map_err(|e| CommandError::InvalidInput(format!("password hashing failed: {e}")))?;

    let database_url = super::database_url()?;
    let pool = create_pool(&database_url)
        .await
        .map_err(CommandError::Database)?;

    let user = UserRepository::new(&pool)
        .create(NewUser {
            email: &email,
            phone: None,
            name,
            password_hash: &password_hash,
            role: UserRole::Admin,
            email_verified: true,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                CommandError::InvalidInput(format!("admin already exists with email {email}"))
            }
            other => CommandError::InvalidInput(other.to_string()),
        })?;

    tracing::info!(id = %user.id, email = %user.email, "Admin user created");
    Ok(())
}

/// Read a password from stdin.
fn prompt_password() -> Result<String, CommandError> {
    #[allow(clippy::print_stdout)]
    {
        print!("Password: ");
    }
    std::io::stdout()
        .flush()
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    Ok(line.trim_end().to_owned())
}
