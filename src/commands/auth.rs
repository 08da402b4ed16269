//! Login, logout, whoami and admin signup

use colored::Colorize;

use super::{secret_or_stdin, Context};
use crate::api::types::SignupRequest;
use crate::error::Result;
use crate::session::{Role, Session};

/// Log in and persist the session returned by the backend
///
/// The role is stored as reported. Logging in with a non-admin account
/// succeeds, but every admin command will then be refused.
///
/// # Errors
///
/// Returns error if the credentials are rejected or the session cannot be
/// stored
pub async fn login(ctx: &Context, login_id: &str, password: Option<String>) -> Result<()> {
    let password = secret_or_stdin(password, "Password")?;

    tracing::info!(login_id, "Logging in");
    let response = ctx.client.login(login_id, &password).await?;
    let session = Session::new(response.token, response.user.role);
    ctx.session().set_session(&session)?;

    if session.role == Role::Admin {
        println!("{}", format!("Logged in as {} ({})", login_id, session.role).green());
    } else {
        println!(
            "{}",
            format!(
                "Logged in as {} ({}). Admin commands require an ADMIN account.",
                login_id, session.role
            )
            .yellow()
        );
    }
    Ok(())
}

/// Remove the stored session
///
/// # Errors
///
/// Returns error if the session store cannot be cleared
pub fn logout(ctx: &Context) -> Result<()> {
    ctx.session().clear_session()?;
    println!("{}", "Logged out".green());
    Ok(())
}

/// Report whether a session is stored and with which role
///
/// # Errors
///
/// Returns error if the session store cannot be read
pub fn whoami(ctx: &Context) -> Result<()> {
    match ctx.session().get_session()? {
        Some(session) => {
            println!("Logged in: yes");
            println!("Role:      {}", session.role);
            println!(
                "Admin:     {}",
                if session.role == Role::Admin { "yes" } else { "no" }
            );
        }
        None => println!("{}", "Not logged in".yellow()),
    }
    Ok(())
}

/// Register a new admin account (no session needed)
///
/// # Errors
///
/// Returns error if the backend refuses the signup
pub async fn signup(
    ctx: &Context,
    email: &str,
    password: Option<String>,
    full_name: Option<String>,
) -> Result<()> {
    let password = secret_or_stdin(password, "New admin password")?;
    let request = SignupRequest {
        full_name: full_name.filter(|name| !name.trim().is_empty()),
        email: email.trim().to_string(),
        password,
    };

    tracing::info!(email = %request.email, "Registering admin account");
    let response = ctx.client.signup_admin(&request).await?;
    let message = response
        .message
        .unwrap_or_else(|| "Admin account created".to_string());
    println!("{}", message.green());
    Ok(())
}
