//! services/app/src/shell.rs
//!
//! A line-oriented front end over the `AppStore`. Each command stands in for
//! one of the app's screens: login / sign-up, the task list with its add and
//! edit forms, the profile page with the theme toggle, and support.

use crate::error::AppError;
use task_manager_core::auth;
use task_manager_core::domain::Task;
use task_manager_core::{AppStore, TaskDraft};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

const HELP: &str = "\
Commands:
  login <email> <password>
  signup <email> <password> <confirm-password>
  logout
  tasks                                   list tasks, latest due date first
  add <title> | <due date> [| <description>]
  edit <id> <title> | <due date> [| <description>]
  toggle <id>                             mark done / not done
  delete <id>
  profile
  theme                                   switch light / dark
  theme system                            follow / stop following the system theme
  support
  help
  quit";

const SUPPORT: &str = "\
How Can We Help You Today?
Describe the problem you ran into and include your account email.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Login { email: String, password: String },
    SignUp { email: String, password: String, confirm: String },
    Logout,
    Tasks,
    Add(TaskFields),
    Edit { id: String, fields: TaskFields },
    Toggle { id: String },
    Delete { id: String },
    Profile,
    Theme,
    SystemTheme,
    Support,
    Quit,
}

/// The `title | due date | description` part of `add` and `edit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub due_date: String,
    pub description: String,
}

impl TaskFields {
    fn parse(input: &str) -> Result<Self, String> {
        let mut parts = input.splitn(3, '|').map(str::trim);
        let title = parts.next().unwrap_or_default().to_string();
        let due_date = parts
            .next()
            .ok_or_else(|| "Expected: <title> | <due date> [| <description>]".to_string())?
            .to_string();
        let description = parts.next().unwrap_or_default().to_string();
        Ok(Self {
            title,
            due_date,
            description,
        })
    }

    fn into_draft(self) -> TaskDraft {
        TaskDraft {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
        }
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("help", _) => Command::Help,
            ("login", [email, password]) => Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("signup", [email, password, confirm]) => Command::SignUp {
                email: email.to_string(),
                password: password.to_string(),
                confirm: confirm.to_string(),
            },
            ("logout", []) => Command::Logout,
            ("tasks", []) => Command::Tasks,
            ("add", _) if !rest.is_empty() => Command::Add(TaskFields::parse(rest)?),
            ("edit", [id, ..]) if args.len() > 1 => {
                let fields = rest[id.len()..].trim_start();
                Command::Edit {
                    id: id.to_string(),
                    fields: TaskFields::parse(fields)?,
                }
            }
            ("toggle", [id]) => Command::Toggle { id: id.to_string() },
            ("delete", [id]) => Command::Delete { id: id.to_string() },
            ("profile", []) => Command::Profile,
            ("theme", []) => Command::Theme,
            ("theme", ["system"]) => Command::SystemTheme,
            ("support", []) => Command::Support,
            ("quit" | "exit", []) => Command::Quit,
            ("", _) => return Err("Type 'help' for a list of commands.".to_string()),
            _ => return Err(format!("Could not understand '{}'. Type 'help' for usage.", line)),
        };
        Ok(command)
    }

    /// The command word, safe to log (arguments may hold passwords).
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Login { .. } => "login",
            Command::SignUp { .. } => "signup",
            Command::Logout => "logout",
            Command::Tasks => "tasks",
            Command::Add(_) => "add",
            Command::Edit { .. } => "edit",
            Command::Toggle { .. } => "toggle",
            Command::Delete { .. } => "delete",
            Command::Profile => "profile",
            Command::Theme => "theme",
            Command::SystemTheme => "theme system",
            Command::Support => "support",
            Command::Quit => "quit",
        }
    }

    fn requires_auth(&self) -> bool {
        matches!(
            self,
            Command::Tasks
                | Command::Add(_)
                | Command::Edit { .. }
                | Command::Toggle { .. }
                | Command::Delete { .. }
                | Command::Profile
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    Quit,
}

/// Runs one command against the store and describes the result.
pub fn execute(store: &mut AppStore, command: Command) -> Outcome {
    if command.requires_auth() && !store.session.state().is_authenticated {
        return Outcome::Reply("Please log in first.".to_string());
    }
    debug!(command = command.name(), "Executing command");

    let reply = match command {
        Command::Help => HELP.to_string(),
        Command::Login { email, password } => match auth::login(&email, &password) {
            Ok(creds) => sign_in(store, creds),
            Err(e) => e.to_string(),
        },
        Command::SignUp {
            email,
            password,
            confirm,
        } => match auth::sign_up(&email, &password, &confirm) {
            Ok(creds) => sign_in(store, creds),
            Err(e) => e.to_string(),
        },
        Command::Logout => {
            store.session.logout();
            "Logged out.".to_string()
        }
        Command::Tasks => render_tasks(&store.tasks.sorted_by_due_date()),
        Command::Add(fields) => {
            let id = Uuid::new_v4().to_string();
            match fields.into_draft().into_task(id, false) {
                Ok(task) => {
                    let reply = format!("Added '{}' [{}].", task.title, task.id);
                    store.tasks.add_task(task);
                    reply
                }
                Err(e) => e.to_string(),
            }
        }
        Command::Edit { id, fields } => {
            let completed = match store.tasks.find(&id) {
                Some(existing) => existing.completed,
                None => return Outcome::Reply(format!("No task with id {}.", id)),
            };
            match fields.into_draft().into_task(id, completed) {
                Ok(task) => {
                    let reply = format!("Updated '{}'.", task.title);
                    store.tasks.update_task(task);
                    reply
                }
                Err(e) => e.to_string(),
            }
        }
        Command::Toggle { id } => match store.tasks.find(&id).cloned() {
            Some(mut task) => {
                task.completed = !task.completed;
                let reply = format!(
                    "'{}' marked {}.",
                    task.title,
                    if task.completed { "done" } else { "not done" }
                );
                store.tasks.update_task(task);
                reply
            }
            None => format!("No task with id {}.", id),
        },
        Command::Delete { id } => {
            if store.tasks.find(&id).is_none() {
                format!("No task with id {}.", id)
            } else {
                store.tasks.delete_task(&id);
                "Task deleted.".to_string()
            }
        }
        Command::Profile => render_profile(store),
        Command::Theme => {
            let theme = store.theme.toggle_theme();
            format!("Dark mode {}.", on_off(theme.is_dark_mode))
        }
        Command::SystemTheme => {
            let theme = store.theme.toggle_system_theme();
            format!("Follow system theme {}.", on_off(theme.is_system_theme))
        }
        Command::Support => SUPPORT.to_string(),
        Command::Quit => return Outcome::Quit,
    };
    Outcome::Reply(reply)
}

fn sign_in(store: &mut AppStore, creds: auth::Credentials) -> String {
    match store.session.login(creds.user, creds.token) {
        Ok(session) => {
            let name = session.user.as_ref().map(|u| u.name.as_str()).unwrap_or_default();
            format!("Welcome, {}!", name)
        }
        Err(e) => e.to_string(),
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn render_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks yet. Add one with 'add'.".to_string();
    }
    let mut out = String::new();
    for task in tasks {
        let mark = if task.completed { "[x]" } else { "[ ]" };
        let due = task
            .due_at()
            .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| task.due_date.clone());
        out.push_str(&format!("{} {}  (due {})  id={}\n", mark, task.title, due, task.id));
        if let Some(description) = &task.description {
            out.push_str(&format!("      {}\n", description));
        }
    }
    out.truncate(out.trim_end().len());
    out
}

fn render_profile(store: &AppStore) -> String {
    let session = store.session.state();
    let theme = store.theme.state();
    let (name, email) = session
        .user
        .as_ref()
        .map(|u| (u.name.as_str(), u.email.as_str()))
        .unwrap_or_default();
    let appearance = if theme.is_system_theme {
        "system"
    } else if theme.is_dark_mode {
        "dark"
    } else {
        "light"
    };
    format!("{}\n{}\nTheme: {}", name, email, appearance)
}

/// Reads commands from `input` until end of input or `quit`, writing replies to
/// `output`. Pending storage writes are flushed before returning.
pub async fn run<R, W>(store: &mut AppStore, input: R, mut output: W) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let outcome = match Command::parse(&line) {
            Ok(command) => execute(store, command),
            Err(message) => Outcome::Reply(message),
        };
        match outcome {
            Outcome::Reply(text) => {
                output.write_all(text.as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
            }
            Outcome::Quit => break,
        }
    }
    store.flush().await;
    Ok(())
}
