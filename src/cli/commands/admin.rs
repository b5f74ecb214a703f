use anyhow::{bail, Context};
use clap::Args;
use serde_json::json;

use super::open_store;
use crate::auth::hash_password;
use crate::cli::OutputFormat;
use crate::database::models::user::normalize_email;
use crate::database::models::{Role, User};
use crate::database::{Store, UserStore};
use crate::handlers::protected::users::MIN_PASSWORD_LEN;
use crate::handlers::validate::is_email;

#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    #[arg(long, help = "Login email")]
    pub email: String,

    #[arg(long, help = "Initial password (at least 6 characters)")]
    pub password: String,

    #[arg(long, default_value = "admin", help = "admin, manager, editor or viewer")]
    pub role: String,
}

pub async fn handle(args: CreateAdminArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let email = normalize_email(&args.email);
    if !is_email(&email) {
        bail!("'{}' is not a valid email", args.email);
    }
    if args.password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    let role: Role = args.role.parse()?;

    let store = open_store().await?;
    let result = create(store.as_ref(), &email, &args.password, role).await;
    store.close().await;

    match result? {
        Some(user) => output_format.print(
            &format!("Created {} ({})", user.email, user.role),
            json!({ "created": true, "id": user.id, "email": user.email, "role": user.role }),
        ),
        None => output_format.print(
            &format!("User {} already exists; nothing changed", email),
            json!({ "created": false, "email": email }),
        ),
    }
    Ok(())
}

/// `None` when the email is already registered.
async fn create(
    store: &dyn Store,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Option<User>> {
    if store.find_user_by_email(email).await?.is_some() {
        return Ok(None);
    }
    let hash = hash_password(password).await.context("failed to hash password")?;
    let user = User::new(email, hash, role);
    store.insert_user(&user).await?;
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn existing_email_is_left_alone() {
        let store = MemoryStore::new();
        let first = create(&store, "admin@novator.ru", "secret1", Role::Admin).await.unwrap();
        assert!(first.is_some());

        let second = create(&store, "admin@novator.ru", "other-pass", Role::Viewer).await.unwrap();
        assert!(second.is_none());

        let stored = store.find_user_by_email("admin@novator.ru").await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Admin);
    }
}
