use std::sync::Arc;

use nestflow_console::api::Credentials;
use nestflow_console::config::Settings;
use nestflow_console::notify::TracingNotifier;
use nestflow_console::pricing::PricingForm;
use nestflow_console::session::AuthStatus;
use nestflow_console::{Console, ConsoleError};
use tracing_subscriber::{EnvFilter, fmt};

const USAGE: &str = "usage: console [status | login <mail> <password> | logout | quote <plan> <duration> <unit> [channels]]";

fn parse_number(value: &str, what: &str) -> Result<i64, ConsoleError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConsoleError::Validation(format!("{} must be a whole number: {}", what, value)))
}

fn quote(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let [plan, duration, unit, rest @ ..] = args else {
        return Err(USAGE.into());
    };
    let form = PricingForm {
        subscription_type: plan.clone(),
        duration: parse_number(duration, "duration")?,
        time_unit: unit.clone(),
        channel_count: rest
            .first()
            .map(|c| parse_number(c, "channel count"))
            .transpose()?,
    };
    let result = form.quote()?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let settings = Settings::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("status");
    if command == "quote" {
        return quote(&args[1..]);
    }

    let console = Console::new(&settings, Arc::new(TracingNotifier))?;
    let session = console.session().restore().await;

    match command {
        "login" => {
            let (Some(mail), Some(password)) = (args.get(1), args.get(2)) else {
                return Err(USAGE.into());
            };
            let user = console
                .session()
                .login(&Credentials::new(mail.as_str(), password.as_str()))
                .await
                .map_err(|e| e.user_message())?;
            tracing::info!("signed in as {} ({})", user.display_name(), user.role.as_str());
        }
        "logout" => {
            if let Err(e) = console.session().logout().await {
                tracing::warn!("backend logout failed: {}", e.user_message());
            }
        }
        "status" => {
            if session.status != AuthStatus::Authenticated {
                tracing::warn!("not signed in; run `console login <mail> <password>`");
                return Ok(());
            }
            if let Err(e) = console.refresh().await {
                tracing::warn!("refresh incomplete: {}", e.user_message());
            }
            let summary = console.dashboard().await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        other => {
            return Err(format!("unknown command `{}`\n{}", other, USAGE).into());
        }
    }

    Ok(())
}
