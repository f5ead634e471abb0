//! Sign-in, registration, password and profile handlers.

use secrecy::{ExposeSecret, SecretString};

use mapper_api::types::{ProfileUpdate, User, UserRole};
use mapper_core::forms::MIN_PASSWORD_LENGTH;
use mapper_core::{GuardDecision, LoginForm, RegisterForm, Route, Studio};

use crate::cli::{
    GlobalOpts, LoginArgs, PasswordArgs, PasswordCommand, ProfileArgs, ProfileCommand,
    RegisterArgs, RoleArg,
};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

pub(super) fn role(arg: RoleArg) -> UserRole {
    match arg {
        RoleArg::Admin => UserRole::Admin,
        RoleArg::NetworkEngineer => UserRole::NetworkEngineer,
        RoleArg::ServiceDesigner => UserRole::ServiceDesigner,
        RoleArg::Operator => UserRole::Operator,
    }
}

fn detail(user: &User) -> String {
    let mut lines = vec![
        format!("ID:         {}", user.id),
        format!("Username:   {}", user.username),
        format!("Name:       {} {}", user.first_name, user.last_name),
        format!("Email:      {}", user.email),
        format!("Role:       {}", user.role),
        format!("Active:     {}", user.is_active),
    ];
    if let Some(ref last) = user.last_login {
        lines.push(format!("Last login: {}", output::timestamp(last)));
    }
    if !user.permissions.is_empty() {
        let names: Vec<&str> = user.permissions.iter().map(|p| p.name.as_str()).collect();
        lines.push(format!("Permissions: {}", names.join(", ")));
    }
    lines.join("\n")
}

fn show_user(user: &User, global: &GlobalOpts) -> Result<(), CliError> {
    output::show(global, user, detail, |u| u.username.clone())
}

// ── Session ──────────────────────────────────────────────────────────

pub async fn login(studio: &Studio, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    studio.bootstrap().await;
    if let GuardDecision::Redirect(_) = studio.navigate(Route::Login.path()) {
        let who = studio
            .auth()
            .user
            .map_or_else(String::new, |u| format!(" as {}", u.username));
        output::notice(global, &format!("Already signed in{who}"));
        return Ok(());
    }

    let cfg = config::load_config_or_default();
    let (profile_name, profile) = config::active_profile(global, &cfg)?;

    let username = match args.username.or_else(|| profile.username.clone()) {
        Some(name) => name,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Username")
            .allow_empty(true)
            .interact_text()?,
    };

    let password = if args.ask_password {
        util::prompt_password("Password: ")?
    } else {
        match config::resolve_password(&profile, &profile_name) {
            Ok(secret) => secret.expose_secret().to_owned(),
            Err(_) => util::prompt_password("Password: ")?,
        }
    };

    let user = studio.login(&LoginForm::new(username, password)).await?;
    output::notice(global, &format!("Signed in as {}", user.username));
    show_user(&user, global)
}

pub async fn register(
    studio: &Studio,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = new_password("Password: ")?;
    let form = RegisterForm {
        first_name: args.first_name,
        last_name: args.last_name,
        username: args.username,
        email: args.email,
        password: password.expose_secret().to_owned(),
        role: Some(role(args.role)),
    };
    let user = studio.register(&form).await?;
    output::notice(
        global,
        &format!("Account '{}' created. Sign in with: mapper login", user.username),
    );
    show_user(&user, global)
}

pub async fn logout(studio: &Studio, global: &GlobalOpts) -> Result<(), CliError> {
    studio.logout().await;
    output::notice(global, "Signed out");
    Ok(())
}

pub async fn refresh(studio: &Studio, global: &GlobalOpts) -> Result<(), CliError> {
    studio.refresh_token().await?;
    output::notice(global, "Session tokens refreshed");
    Ok(())
}

// ── Passwords ────────────────────────────────────────────────────────

/// Prompt twice for a new password and apply the length rule.
fn new_password(prompt: &str) -> Result<SecretString, CliError> {
    let first = util::prompt_password(prompt)?;
    let again = util::prompt_password("Confirm password: ")?;
    if first != again {
        return Err(CliError::Validation {
            lines: vec!["confirmPassword: Passwords do not match".into()],
        });
    }
    if first.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CliError::Validation {
            lines: vec![format!(
                "password: Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )],
        });
    }
    Ok(SecretString::from(first))
}

pub async fn password(
    studio: &Studio,
    args: PasswordArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PasswordCommand::Change => {
            util::enter(studio, Route::Profile).await?;
            let current = SecretString::from(util::prompt_password("Current password: ")?);
            let new = new_password("New password: ")?;
            studio.change_password(&current, &new).await?;
            output::notice(global, "Password changed");
        }
        PasswordCommand::Forgot { email } => {
            studio.forgot_password(&email).await?;
            output::notice(global, &format!("Reset instructions sent to {email}"));
        }
        PasswordCommand::Reset { token } => {
            let new = new_password("New password: ")?;
            studio.reset_password(&token, &new).await?;
            output::notice(global, "Password reset. Sign in with: mapper login");
        }
        PasswordCommand::VerifyEmail { token } => {
            studio.verify_email(&token).await?;
            output::notice(global, "Email address verified");
        }
    }
    Ok(())
}

// ── Profile ──────────────────────────────────────────────────────────

pub async fn profile(
    studio: &Studio,
    args: ProfileArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::enter(studio, Route::Profile).await?;

    match args.command.unwrap_or(ProfileCommand::Show) {
        ProfileCommand::Show => {
            let user = studio.current_user().await?;
            show_user(&user, global)
        }
        ProfileCommand::Update {
            first_name,
            last_name,
            email,
        } => {
            let update = ProfileUpdate {
                first_name,
                last_name,
                email,
            };
            if update == ProfileUpdate::default() {
                return Err(CliError::InvalidValue {
                    field: "profile".into(),
                    reason: "pass at least one of --first-name, --last-name, --email".into(),
                });
            }
            let user = studio.update_profile(&update).await?;
            output::notice(global, "Profile updated");
            show_user(&user, global)
        }
        ProfileCommand::Can { role: roles, permission } => {
            let roles: Vec<UserRole> = roles.into_iter().map(role).collect();
            let mut allowed = roles.is_empty() || studio.has_any_role(&roles);
            if let Some(ref name) = permission {
                allowed &= studio.has_permission(name);
            }
            let verdict = if allowed { "allowed" } else { "denied" };
            output::print_output(verdict, global.quiet);
            Ok(())
        }
    }
}
