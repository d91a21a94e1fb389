use clap::Subcommand;
use routinely_core::{App, AuthField, AuthMode, Database, VerifyOutcome};

use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Status {
        /// Ask the service whether the stored token is still valid
        #[arg(long)]
        verify: bool,
    },
}

pub async fn run(action: AuthAction) -> CmdResult {
    let ctx = Context::load()?;
    let mut app = ctx.open_app(None)?;

    match action {
        AuthAction::Login { email, password } => {
            if let Some(session) = app.session() {
                return Err(format!(
                    "already signed in as {}; run `routinely auth logout` first",
                    session.user().email
                )
                .into());
            }
            let form = app.auth_form_mut();
            form.set(AuthField::Email, &email);
            form.set(AuthField::Password, &password);
            submit(&mut app, &ctx).await
        }
        AuthAction::Register {
            email,
            username,
            password,
        } => {
            if app.is_authenticated() {
                return Err("already signed in; run `routinely auth logout` first".into());
            }
            let form = app.auth_form_mut();
            form.mode = AuthMode::Register;
            form.set(AuthField::Email, &email);
            form.set(AuthField::Username, &username);
            form.set(AuthField::Password, &password);
            submit(&mut app, &ctx).await
        }
        AuthAction::Logout => {
            let was_signed_in = app.is_authenticated();
            app.logout()?;
            if was_signed_in {
                println!("signed out");
            } else {
                println!("not signed in");
            }
            Ok(())
        }
        AuthAction::Status { verify } => {
            let Some(session) = app.session() else {
                println!("not signed in");
                return Ok(());
            };
            let user = session.user();
            println!("signed in as {} <{}> (id {})", user.username, user.email, user.id);
            if !verify {
                return Ok(());
            }
            match app.verify_session(&ctx.api).await? {
                VerifyOutcome::Valid(_) | VerifyOutcome::NoSession => println!("token: valid"),
                VerifyOutcome::Revoked => {
                    println!("token: rejected by server, signed out");
                }
                VerifyOutcome::Unreachable(err) => println!("token: not verified ({err})"),
            }
            Ok(())
        }
    }
}

async fn submit(app: &mut App<Database>, ctx: &Context) -> CmdResult {
    app.submit_auth(&ctx.api).await?;
    if let Some(error) = &app.auth_form().error {
        return Err(error.clone().into());
    }
    match app.session() {
        Some(session) => {
            println!("signed in as {}", session.user().username);
            Ok(())
        }
        None => Err("sign in did not complete".into()),
    }
}
