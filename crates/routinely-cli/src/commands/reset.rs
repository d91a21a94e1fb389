use clap::Subcommand;
use routinely_core::{ResetField, ResetStep, Screen};

use super::{CmdResult, Context};
use crate::render;

#[derive(Subcommand)]
pub enum ResetAction {
    /// Ask for a reset code to be sent to EMAIL
    Request { email: String },
    /// Set a new password using the code
    Confirm {
        email: String,
        code: String,
        new_password: String,
        confirm_password: String,
    },
}

pub async fn run(action: ResetAction) -> CmdResult {
    let ctx = Context::load()?;
    let mut app = ctx.open_app(None)?;
    app.show_password_reset();
    if app.screen() != Screen::PasswordReset {
        return Err("sign out before resetting the password".into());
    }

    match action {
        ResetAction::Request { email } => {
            app.reset_form_mut().set(ResetField::Email, &email);
            app.submit_reset_request(&ctx.api).await;
            let form = app.reset_form();
            if let Some(error) = &form.error {
                return Err(error.clone().into());
            }
            println!("reset code requested for {email}");
            if let Some(code) = &form.demo_code {
                println!("{}", render::demo_code_notice(code));
            }
        }
        ResetAction::Confirm {
            email,
            code,
            new_password,
            confirm_password,
        } => {
            let form = app.reset_form_mut();
            form.step = ResetStep::Code;
            form.set(ResetField::Email, &email);
            form.set(ResetField::Code, &code);
            form.set(ResetField::NewPassword, &new_password);
            form.set(ResetField::ConfirmPassword, &confirm_password);
            app.submit_reset_confirm(&ctx.api).await;
            if let Some(error) = &app.reset_form().error {
                return Err(error.clone().into());
            }
            println!("password changed; sign in with `routinely auth login`");
        }
    }
    Ok(())
}
