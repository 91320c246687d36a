use clap::{Args, Parser, Subcommand};
use pushcast::config::{self, AppConfig, NotificationTemplate};
use std::net::SocketAddr;
use std::time::Duration;

pub(crate) enum RunOutcome {
    Serve {
        addr: SocketAddr,
        config: Box<AppConfig>,
    },
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    if let Some(Command::Init(args)) = cli.command {
        let code = run_init(args);
        return RunOutcome::Exit(code);
    }

    match resolve_app_config(&cli) {
        Ok(config) => RunOutcome::Serve {
            addr: cli.bind,
            config: Box::new(config),
        },
        Err(err) => {
            eprintln!("error: {err}");
            RunOutcome::Exit(2)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pushcast",
    version,
    about = "Web push subscription registry and notification dispatcher"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(long, env = "PUSHCAST_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
    #[arg(long, env = "PUSHCAST_VAPID_PRIVATE_KEY")]
    vapid_private_key: Option<String>,
    #[arg(long, env = "PUSHCAST_VAPID_PUBLIC_KEY")]
    vapid_public_key: Option<String>,
    #[arg(long, env = "PUSHCAST_CONTACT")]
    contact: Option<String>,
    #[arg(long, env = "PUSHCAST_ENCRYPTION_KEY")]
    encryption_key: Option<String>,
    #[arg(long, env = "PUSHCAST_RESOURCE_URL")]
    resource_url: Option<String>,
    #[arg(long, env = "PUSHCAST_NOTIFICATION_TITLE")]
    notification_title: Option<String>,
    #[arg(long, env = "PUSHCAST_NOTIFICATION_BODY")]
    notification_body: Option<String>,
    #[arg(long, env = "PUSHCAST_FILE_NAME")]
    file_name: Option<String>,
    #[arg(long, env = "PUSHCAST_REGISTRATION_DELAY")]
    registration_delay: Option<String>,
    #[arg(long, env = "PUSHCAST_DELIVERY_TIMEOUT")]
    delivery_timeout: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Init(InitArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(long)]
    contact: Option<String>,
}

fn run_init(args: InitArgs) -> i32 {
    let credentials = match pushcast::generate_vapid_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("failed to generate VAPID credentials: {err}");
            return 1;
        }
    };
    let (contact, show_contact_note) = match args.contact {
        Some(contact) => (contact, false),
        None => (config::DEFAULT_CONTACT.to_string(), true),
    };

    println!("VAPID credentials generated.");
    println!();
    println!("PUSHCAST_VAPID_PRIVATE_KEY=\"{}\"", credentials.private_key);
    println!("PUSHCAST_VAPID_PUBLIC_KEY=\"{}\"", credentials.public_key);
    println!("PUSHCAST_CONTACT=\"{contact}\"");
    if show_contact_note {
        println!();
        println!("Note: replace PUSHCAST_CONTACT with an address you control.");
    }
    0
}

fn resolve_app_config(cli: &Cli) -> Result<AppConfig, String> {
    let contact = non_empty(cli.contact.as_deref()).unwrap_or(config::DEFAULT_CONTACT);
    let vapid = pushcast::resolve_vapid_config(
        cli.vapid_private_key.as_deref(),
        cli.vapid_public_key.as_deref(),
        config::vapid_subject(contact),
    )
    .map_err(|err| err.to_string())?;

    let encryption_key = match non_empty(cli.encryption_key.as_deref()) {
        Some(key) => key.to_string(),
        None => {
            tracing::warn!("no encryption key configured, using the built-in default");
            config::DEFAULT_ENCRYPTION_KEY.to_string()
        }
    };

    let registration_delay = match cli.registration_delay.as_deref() {
        Some(raw) => parse_duration(raw)?,
        None => config::DEFAULT_REGISTRATION_DELAY,
    };
    let delivery_timeout = match cli.delivery_timeout.as_deref() {
        Some(raw) => parse_duration(raw)?,
        None => config::DEFAULT_DELIVERY_TIMEOUT,
    };
    if delivery_timeout.is_zero() {
        return Err("delivery timeout must be greater than 0".to_string());
    }

    let defaults = NotificationTemplate::default();
    let notification = NotificationTemplate {
        title: non_empty(cli.notification_title.as_deref())
            .map(str::to_string)
            .unwrap_or(defaults.title),
        body: non_empty(cli.notification_body.as_deref())
            .map(str::to_string)
            .unwrap_or(defaults.body),
        file_name: non_empty(cli.file_name.as_deref())
            .map(str::to_string)
            .unwrap_or(defaults.file_name),
    };

    Ok(AppConfig {
        vapid,
        encryption_key,
        resource_url: non_empty(cli.resource_url.as_deref())
            .unwrap_or(config::DEFAULT_RESOURCE_URL)
            .to_string(),
        notification,
        registration_delay,
        delivery_timeout,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("duration cannot be empty".to_string());
    }

    let split = value
        .find(|ch: char| ch.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);
    let invalid = || format!("invalid duration '{value}'; expected <number>[ms|s|m|h]");
    let amount: u64 = amount.parse().map_err(|_| invalid())?;

    match unit.to_ascii_lowercase().as_str() {
        "ms" => Ok(Duration::from_millis(amount)),
        "" | "s" => Ok(Duration::from_secs(amount)),
        "m" => amount
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(invalid),
        "h" => amount
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}
