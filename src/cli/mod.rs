use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::clients::osascript::{OsaScript, ScriptRunner};
use crate::domain::{parse_contacts, Contact};
use crate::infra::config::Config;
use crate::infra::runtime::limits::ScriptLimits;
use crate::tools::applescript;

#[derive(Parser)]
#[command(name = "imessage-mcp")]
#[command(about = "iMessage & Contacts MCP server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server (default)
    Serve,
    /// Health check a server running in HTTP mode
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// List contacts through the local automation bridge
    Contacts {
        /// Only contacts whose name contains this text
        #[arg(short, long)]
        query: Option<String>,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => {
            let result = match Config::load() {
                Ok(cfg) => crate::infra::boot::run_server(cfg).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "server exited with error");
                    eprintln!("❌ {e:#}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match validate_config() {
            Ok(cfg) => {
                println!("✅ Configuration is valid");
                print_config(&cfg);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Contacts { query } => {
            let runner = match validate_config() {
                Ok(cfg) => OsaScript::new(
                    cfg.osascript,
                    ScriptLimits::new(cfg.max_concurrent_scripts, cfg.script_timeout),
                ),
                Err(e) => {
                    eprintln!("❌ Configuration validation failed: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            match list_contacts(&runner, query.as_deref()).await {
                Ok(contacts) => {
                    print_contacts(&contacts);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("❌ Contact lookup failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url.trim_end_matches('/')))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

fn validate_config() -> Result<Config, Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    cfg.validate()?;
    Ok(cfg)
}

fn print_config(cfg: &Config) {
    println!("\n📋 Configuration:");
    println!("  Mode: {}", cfg.mode);
    if cfg.mode == "server" {
        println!("  Port: {}", cfg.port);
    }
    println!("  osascript: {}", cfg.osascript);
    println!("  Script timeout: {}s", cfg.script_timeout.as_secs());
    println!("  Max concurrent scripts: {}", cfg.max_concurrent_scripts);
    println!("  Query policy: {:?}", cfg.query_policy);
    println!(
        "  Log Level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );
}

async fn list_contacts(
    runner: &dyn ScriptRunner,
    query: Option<&str>,
) -> Result<Vec<Contact>, Box<dyn std::error::Error>> {
    let script = match query {
        Some(q) => applescript::search_contacts_script(&q.to_lowercase()),
        None => applescript::list_contacts_script(),
    };
    let raw = runner.run(&script).await?;
    Ok(parse_contacts(&raw)?)
}

fn print_contacts(contacts: &[Contact]) {
    println!("👥 {} contact(s)", contacts.len());
    for c in contacts {
        let mut line = format!("  {}", c.name);
        if !c.phones.is_empty() {
            line.push_str(&format!(" · {}", c.phones.join(", ")));
        }
        if !c.emails.is_empty() {
            line.push_str(&format!(" · {}", c.emails.join(", ")));
        }
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::osascript::{AutomationError, FnRunner};
    use serial_test::serial;
    use std::env;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn health_check_fails_when_nothing_listens() {
        let result = health_check("http://localhost:9").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn health_check_ok_and_error_paths() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200).body("ok");
        });
        assert!(health_check(&server.base_url()).await.is_ok());

        let bad = MockServer::start();
        bad.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(500);
        });
        let err = health_check(&bad.base_url()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn run_commands_health_success() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200).body("ok");
        });
        let code = run_commands(Commands::Health { url: server.base_url() }).await;
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    #[serial]
    fn validate_config_accepts_defaults() {
        env::remove_var("MODE");
        env::remove_var("IMESSAGE_MCP_CONFIG");
        assert!(validate_config().is_ok());
    }

    #[test]
    #[serial]
    fn validate_config_invalid_mode() {
        env::set_var("MODE", "invalid");
        let result = validate_config();
        assert!(result.unwrap_err().to_string().contains("Invalid MODE"));
        env::remove_var("MODE");
    }

    #[test]
    #[serial]
    fn validate_config_invalid_port() {
        env::set_var("MODE", "server");
        env::set_var("PORT", "0");
        let result = validate_config();
        assert!(result.unwrap_err().to_string().contains("PORT cannot be 0"));
        env::remove_var("MODE");
        env::remove_var("PORT");
    }

    #[tokio::test]
    #[serial]
    async fn run_commands_config_failure() {
        env::set_var("MODE", "nope");
        let code = run_commands(Commands::Config { validate: true }).await;
        assert_eq!(code, ExitCode::FAILURE);
        env::remove_var("MODE");
    }

    #[tokio::test]
    #[serial]
    async fn run_commands_contacts_fails_without_osascript() {
        env::set_var("OSASCRIPT_BIN", "/nonexistent/osascript");
        let code = run_commands(Commands::Contacts { query: None }).await;
        assert_eq!(code, ExitCode::FAILURE);
        env::remove_var("OSASCRIPT_BIN");
    }

    #[tokio::test]
    async fn list_contacts_decodes_and_lowercases() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let runner = FnRunner::new(move |script: String| {
            log.lock().unwrap().push(script);
            async move { Ok(r#"[{"name":"Marissa","phones":["555-0123"],"emails":[]}]"#.to_string()) }
        });
        let contacts = list_contacts(&runner, Some("MARISSA")).await.unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].phones, vec!["555-0123"]);
        assert!(seen.lock().unwrap()[0].contains(r#"contains "marissa""#));
    }

    #[tokio::test]
    async fn list_contacts_surfaces_script_and_decode_errors() {
        let failing = FnRunner::new(|_s: String| async move {
            Err(AutomationError::Failed { detail: "not authorized".into() })
        });
        let err = list_contacts(&failing, None).await.unwrap_err();
        assert!(err.to_string().contains("not authorized"));

        let garbled = FnRunner::new(|_s: String| async move { Ok("{not json".to_string()) });
        assert!(list_contacts(&garbled, None).await.is_err());
    }
}
