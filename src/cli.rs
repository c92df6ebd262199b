//! Command line arguments and the one-shot classic commands

use anyhow::{anyhow, bail, Result};
use crossterm::style::Stylize;

use crate::api::{HealthApi, Operation, SymptomCheckRequest};
use crate::location::{Coordinates, LocationProvider};
use crate::session_store::SessionStore;
use crate::state::reducer::{
    validate_credentials, CHAT_HISTORY_LOGIN_REQUIRED, SYMPTOM_HISTORY_LOGIN_REQUIRED,
};
use crate::state::AuthMode;
use crate::table_display;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Check {
        age: Option<String>,
        temperature: Option<String>,
        symptoms: String,
    },
    Chat(String),
    History,
    SymptomHistory,
    Hospitals,
    Login { email: String, password: String },
    Signup { email: String, password: String },
    Logout,
    Status,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub api: Option<String>,
    pub location: Option<Coordinates>,
    pub init_config: bool,
    pub generate_config: bool,
    pub help: bool,
    /// None starts the terminal UI
    pub command: Option<Command>,
}

impl CliArgs {
    /// Parse arguments, without the program name
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = CliArgs::default();
        let mut positional: Vec<String> = Vec::new();
        let mut age = None;
        let mut temperature = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value_for = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("{} needs a value", flag))
            };
            match arg.as_str() {
                "--api" => parsed.api = Some(value_for("--api")?),
                "--location" => {
                    let raw = value_for("--location")?;
                    parsed.location = Some(Coordinates::parse(&raw).ok_or_else(|| {
                        anyhow!("--location expects <lat>,<lon>, got '{}'", raw)
                    })?);
                }
                "--age" => age = Some(value_for("--age")?),
                "--temp" | "--temperature" => temperature = Some(value_for("--temp")?),
                "--init-config" => parsed.init_config = true,
                "--generate-config" => parsed.generate_config = true,
                "-h" | "--help" => parsed.help = true,
                flag if flag.starts_with("--") => bail!("Unknown option {}", flag),
                _ => positional.push(arg.clone()),
            }
        }

        let Some((name, rest)) = positional.split_first() else {
            return Ok(parsed);
        };
        let text = rest.join(" ");
        let credentials = |name: &str| -> Result<(String, String)> {
            match rest {
                [email, password] => Ok((email.clone(), password.clone())),
                _ => bail!("Usage: safelink {} <email> <password>", name),
            }
        };

        parsed.command = Some(match name.as_str() {
            "check" => {
                if text.trim().is_empty() {
                    bail!("Usage: safelink check [--age N] [--temp F] <symptoms>");
                }
                Command::Check {
                    age,
                    temperature,
                    symptoms: text,
                }
            }
            "chat" => {
                if text.trim().is_empty() {
                    bail!("Usage: safelink chat <message>");
                }
                Command::Chat(text)
            }
            "history" => Command::History,
            "symptom-history" => Command::SymptomHistory,
            "hospitals" => Command::Hospitals,
            "login" => {
                let (email, password) = credentials("login")?;
                Command::Login { email, password }
            }
            "signup" => {
                let (email, password) = credentials("signup")?;
                Command::Signup { email, password }
            }
            "logout" => Command::Logout,
            "status" => Command::Status,
            other => bail!("Unknown command '{}'. Try --help.", other),
        });
        Ok(parsed)
    }
}

pub fn print_help() {
    println!("{}", "SafeLink - health triage assistant".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  safelink [OPTIONS]             start the terminal UI");
    println!("  safelink [OPTIONS] <COMMAND>   run one command and exit");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}         backend base URL", "--api <url>".green());
    println!("  {} position used for the hospital finder", "--location <lat,lon>".green());
    println!("  {}       initialize configuration with a wizard", "--init-config".green());
    println!("  {}   write a commented default config file", "--generate-config".green());
    println!();
    println!("{}", "Commands:".yellow());
    println!("  {} check symptoms", "check [--age N] [--temp F] <text>".green());
    println!("  {}                    ask the AI helper", "chat <message>".green());
    println!("  {}                          saved chats", "history".green());
    println!("  {}                  saved symptom checks", "symptom-history".green());
    println!("  {}                        hospitals near you", "hospitals".green());
    println!("  {}         sign in", "login <email> <password>".green());
    println!("  {}        create an account", "signup <email> <password>".green());
    println!("  {}                           forget the saved login", "logout".green());
    println!("  {}                           check the backend", "status".green());
    println!();
    println!("{}", "Environment:".yellow());
    println!("  SAFELINK_API_BASE_URL  backend base URL");
    println!("  SAFELINK_LOG           log filter, e.g. debug");
}

fn fail(message: String) -> anyhow::Error {
    eprintln!("{}", message.as_str().red());
    anyhow!(message)
}

/// Run one classic command, printing the result
pub async fn run_command(
    command: Command,
    api: &dyn HealthApi,
    location: &dyn LocationProvider,
    store: &SessionStore,
    hospital_radius_meters: u32,
) -> Result<()> {
    let user_id = store.load_session().map(|s| s.user_id);

    match command {
        Command::Check {
            age,
            temperature,
            symptoms,
        } => {
            let request = SymptomCheckRequest::from_form(
                age.as_deref().unwrap_or(""),
                temperature.as_deref().unwrap_or(""),
                &symptoms,
            );
            let result = api
                .check_symptoms(&request, user_id)
                .await
                .map_err(|e| fail(e.user_message(Operation::SymptomCheck)))?;
            table_display::display_symptom_result(&result);
        }
        Command::Chat(message) => {
            let reply = api
                .send_chat_message(&message, user_id)
                .await
                .map_err(|e| fail(e.user_message(Operation::Chat)))?;
            println!("{}", reply);
        }
        Command::History => {
            if user_id.is_none() {
                return Err(fail(CHAT_HISTORY_LOGIN_REQUIRED.to_string()));
            }
            let entries = api
                .load_chat_history(user_id)
                .await
                .map_err(|e| fail(e.user_message(Operation::ChatHistory)))?;
            table_display::display_chat_history(&entries);
        }
        Command::SymptomHistory => {
            if user_id.is_none() {
                return Err(fail(SYMPTOM_HISTORY_LOGIN_REQUIRED.to_string()));
            }
            let entries = api
                .load_symptom_history(user_id)
                .await
                .map_err(|e| fail(e.user_message(Operation::SymptomHistory)))?;
            table_display::display_symptom_history(&entries);
        }
        Command::Hospitals => {
            let position = location
                .current_position()
                .await
                .map_err(|e| fail(e.user_message()))?;
            println!(
                "{}",
                format!("Searching near {}", location.describe()).cyan()
            );
            let hospitals = api
                .find_nearby_hospitals(position, hospital_radius_meters)
                .await
                .map_err(|e| fail(e.user_message(Operation::NearbyHospitals)))?;
            table_display::display_hospitals(&hospitals);
        }
        Command::Login { email, password } => {
            authenticate(api, store, AuthMode::Login, &email, &password).await?;
        }
        Command::Signup { email, password } => {
            authenticate(api, store, AuthMode::Signup, &email, &password).await?;
        }
        Command::Logout => {
            store.clear_session()?;
            println!("{}", "Signed out.".green());
        }
        Command::Status => {
            let status = api
                .backend_status()
                .await
                .map_err(|e| fail(e.user_message(Operation::Status)))?;
            println!("{}", status.message);
        }
    }
    Ok(())
}

async fn authenticate(
    api: &dyn HealthApi,
    store: &SessionStore,
    mode: AuthMode,
    email: &str,
    password: &str,
) -> Result<()> {
    let credentials =
        validate_credentials(mode, email, password).map_err(|m| fail(m.to_string()))?;
    let (result, op) = match mode {
        AuthMode::Login => (api.login(&credentials).await, Operation::Login),
        AuthMode::Signup => (api.signup(&credentials).await, Operation::Signup),
    };
    let session = result.map_err(|e| fail(e.user_message(op)))?;
    store.save_session(&session)?;
    println!("{}", format!("Signed in as {}", session.email).green());
    Ok(())
}
