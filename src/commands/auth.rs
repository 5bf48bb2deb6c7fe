//! Account sign-in, sign-up and sign-out.

use cliclack::{input, intro, note, outro, password, select};
use console::style;

use crate::identity::IdentityProvider;

/// Interactive sign-in / sign-up flow, or sign-out with `logout`.
///
/// # Errors
/// - If a prompt is cancelled
/// - If the credentials are rejected
pub async fn handle_auth(provider: &IdentityProvider, logout: bool) -> Result<(), anyhow::Error> {
    tracing::info!("=== vortex Authentication ===");

    if logout {
        provider.sign_out()?;
        println!("Signed out.");
        return Ok(());
    }

    ctrlc::set_handler(move || {})
        .map_err(|e| anyhow::anyhow!("Failed to set Ctrl-C handler: {e}"))?;

    intro(style(" auth ").on_white().black())?;

    if let Some(current) = provider.current() {
        note("signed in as", current.display_name())?;
    }

    let create_account: bool = select("What would you like to do?")
        .item(false, "Sign in", "")
        .item(true, "Create an account", "")
        .interact()
        .map_err(|e| anyhow::anyhow!("Selection cancelled: {e}"))?;

    let email: String = input("Email")
        .placeholder("you@example.com")
        .interact()
        .map_err(|e| anyhow::anyhow!("Email input cancelled: {e}"))?;

    let secret = password("Password")
        .interact()
        .map_err(|e| anyhow::anyhow!("Password input cancelled: {e}"))?;

    let identity = if create_account {
        provider.sign_up(&email, &secret)?
    } else {
        provider.sign_in(&email, &secret)?
    };

    outro(format!("✅ Signed in as {}", identity.display_name()))?;
    Ok(())
}

/// Prints the signed-in account.
pub fn handle_whoami(provider: &IdentityProvider) -> Result<(), anyhow::Error> {
    match provider.current() {
        Some(identity) => println!("{} ({})", identity.display_name(), identity.uid),
        None => println!("Not signed in. Run 'vortex auth' to sign in."),
    }
    Ok(())
}
