//! Interactive shell: one `App`, one line per user action, the current
//! screen re-rendered after each.

use std::io::{BufRead, Write};

use routinely_core::{
    ApiClient, App, AuthField, AuthMode, KeyValueStore, ResetField, ResetStep, RoutineId, Screen,
    StorageError, Tab,
};
use tracing::debug;

use super::{CmdResult, Context};
use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login { email: String, password: String },
    Register { email: String, username: String, password: String },
    Forgot,
    Back,
    ResetEmail { email: String },
    ResetConfirm { code: String, new_password: String, confirm_password: String },
    Tab(Tab),
    Pick(RoutineId),
    Add(RoutineId),
    Remove(RoutineId),
    Toggle(RoutineId),
    Resize(u32),
    Logout,
    Dismiss,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  login <email> <password>               sign in
  register <email> <username> <password> create an account
  forgot                                 open password reset
  back                                   leave password reset
  reset-email <email>                    request a reset code
  reset-confirm <code> <new> <confirm>   set a new password
  tab library|habits                     switch tab
  pick <id>                              track or untrack a routine
  add <id> / remove <id>                 track / untrack a routine
  toggle <id>                            mark a habit done or not done
  resize <width>                         change the viewport width
  logout                                 sign out
  dismiss                                hide the current error
  help                                   show this text
  quit                                   leave the shell";

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err("empty command".into());
        };
        let args: Vec<&str> = words.collect();

        let cmd = match (name, args.as_slice()) {
            ("login", [email, password]) => ShellCommand::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("register", [email, username, password]) => ShellCommand::Register {
                email: email.to_string(),
                username: username.to_string(),
                password: password.to_string(),
            },
            ("forgot", []) => ShellCommand::Forgot,
            ("back", []) => ShellCommand::Back,
            ("reset-email", [email]) => ShellCommand::ResetEmail {
                email: email.to_string(),
            },
            ("reset-confirm", [code, new_password, confirm_password]) => {
                ShellCommand::ResetConfirm {
                    code: code.to_string(),
                    new_password: new_password.to_string(),
                    confirm_password: confirm_password.to_string(),
                }
            }
            ("tab", [tab]) => ShellCommand::Tab(parse_tab(tab)?),
            ("pick", [id]) => ShellCommand::Pick(parse_id(id)?),
            ("add", [id]) => ShellCommand::Add(parse_id(id)?),
            ("remove", [id]) => ShellCommand::Remove(parse_id(id)?),
            ("toggle", [id]) => ShellCommand::Toggle(parse_id(id)?),
            ("resize", [width]) => ShellCommand::Resize(
                width
                    .parse()
                    .map_err(|_| format!("invalid width: {width}"))?,
            ),
            ("logout", []) => ShellCommand::Logout,
            ("dismiss", []) => ShellCommand::Dismiss,
            ("help" | "?", []) => ShellCommand::Help,
            ("quit" | "exit", []) => ShellCommand::Quit,
            (
                "login" | "register" | "forgot" | "back" | "reset-email" | "reset-confirm"
                | "tab" | "pick" | "add" | "remove" | "toggle" | "resize" | "logout"
                | "dismiss" | "help" | "quit",
                _,
            ) => return Err(format!("wrong arguments for '{name}' (try 'help')")),
            _ => return Err(format!("unknown command: {name} (try 'help')")),
        };
        Ok(cmd)
    }
}

fn parse_id(raw: &str) -> Result<RoutineId, String> {
    raw.parse().map_err(|_| format!("invalid routine id: {raw}"))
}

fn parse_tab(raw: &str) -> Result<Tab, String> {
    match raw {
        "library" | "lib" => Ok(Tab::Library),
        "habits" | "my-habits" | "mine" => Ok(Tab::MyHabits),
        _ => Err(format!("unknown tab: {raw} (library or habits)")),
    }
}

pub async fn run(width: Option<u32>) -> CmdResult {
    let ctx = Context::load()?;
    let mut app = ctx.open_app(width)?;
    app.load_catalog(&ctx.api).await;
    log_events(&mut app);

    println!("{}", render::screen(&app));
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let cmd = match ShellCommand::parse(&line) {
            Ok(cmd) => cmd,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };
        match cmd {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("{HELP}");
                continue;
            }
            cmd => {
                if let Some(notice) = apply(&mut app, &ctx.api, cmd).await {
                    println!("! {notice}");
                }
            }
        }
        log_events(&mut app);
        println!("{}", render::screen(&app));
    }
    Ok(())
}

/// Apply one command. The returned line (a hint, or a storage failure) is
/// printed above the screen; the shell keeps running either way.
async fn apply<S: KeyValueStore>(
    app: &mut App<S>,
    api: &ApiClient,
    cmd: ShellCommand,
) -> Option<String> {
    match cmd {
        ShellCommand::Login { email, password } => {
            let form = app.auth_form_mut();
            form.mode = AuthMode::Login;
            form.set(AuthField::Email, &email);
            form.set(AuthField::Password, &password);
            return submit_auth(app, api).await.err().map(|e| e.to_string());
        }
        ShellCommand::Register {
            email,
            username,
            password,
        } => {
            let form = app.auth_form_mut();
            form.mode = AuthMode::Register;
            form.set(AuthField::Email, &email);
            form.set(AuthField::Username, &username);
            form.set(AuthField::Password, &password);
            return submit_auth(app, api).await.err().map(|e| e.to_string());
        }
        ShellCommand::Forgot => app.show_password_reset(),
        ShellCommand::Back => app.back_to_login(),
        ShellCommand::ResetEmail { email } => {
            app.reset_form_mut().set(ResetField::Email, &email);
            app.submit_reset_request(api).await;
        }
        ShellCommand::ResetConfirm {
            code,
            new_password,
            confirm_password,
        } => {
            if app.screen() != Screen::PasswordReset {
                return Some("open password reset first: forgot".into());
            }
            if app.reset_form().step == ResetStep::Email {
                return Some("request a code first: reset-email <email>".into());
            }
            let form = app.reset_form_mut();
            form.set(ResetField::Code, &code);
            form.set(ResetField::NewPassword, &new_password);
            form.set(ResetField::ConfirmPassword, &confirm_password);
            app.submit_reset_confirm(api).await;
        }
        ShellCommand::Tab(tab) => app.select_tab(tab),
        ShellCommand::Pick(id) => app.toggle_tracked(id),
        ShellCommand::Add(id) => app.add_habit(id),
        ShellCommand::Remove(id) => app.remove_habit(id),
        ShellCommand::Toggle(id) => app.toggle_complete(id),
        ShellCommand::Resize(width) => app.resize(width),
        ShellCommand::Logout => return app.logout().err().map(|e| e.to_string()),
        ShellCommand::Dismiss => app.dismiss_error(),
        ShellCommand::Help | ShellCommand::Quit => {}
    }
    None
}

/// Sign in, then refresh the catalog for the new session.
async fn submit_auth<S: KeyValueStore>(
    app: &mut App<S>,
    api: &ApiClient,
) -> Result<(), StorageError> {
    let was_authenticated = app.is_authenticated();
    app.submit_auth(api).await?;
    if !was_authenticated && app.is_authenticated() {
        app.load_catalog(api).await;
    }
    Ok(())
}

fn log_events<S: KeyValueStore>(app: &mut App<S>) {
    for event in app.drain_events() {
        debug!(?event, "app event");
    }
}
