//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use mapinv_config::{AIRTABLE_KEYRING_USER, Config, ServerProfile};
use mapinv_core::EntityId;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_secret(prompt: &str, field: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(prompt).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

/// Keyring or plaintext. Returns the value to write to the file, if any.
fn store_secret(keyring_user: &str, secret: String, what: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {what}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        mapinv_config::store_secret(keyring_user, &secret)?;
        eprintln!("   ✓ {what} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

/// A copy with plaintext secrets masked, for display.
fn redacted(cfg: &Config) -> Config {
    let mask = |secret: &Option<String>| secret.as_ref().map(|_| "********".to_owned());
    let mut shown = cfg.clone();
    shown.airtable.api_key = mask(&cfg.airtable.api_key);
    for server in &mut shown.servers {
        server.password = mask(&server.password);
    }
    shown
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);

    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            eprintln!("Map inventory -- configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            let mut cfg = config::load(global)?;

            let base_id: String = Input::new()
                .with_prompt("Airtable base id (app…)")
                .interact_text()
                .map_err(prompt_err)?;
            cfg.airtable.base_id = Some(base_id);

            let key = prompt_secret("Airtable API key: ", "api_key")?;
            cfg.airtable.api_key = store_secret(AIRTABLE_KEYRING_USER, key, "API key")?;

            loop {
                let add = Confirm::new()
                    .with_prompt("Add a GeoServer instance?")
                    .default(cfg.servers.is_empty())
                    .interact()
                    .map_err(prompt_err)?;
                if !add {
                    break;
                }
                let server = prompt_server()?;
                cfg.servers.push(server);
            }

            mapinv_config::save_config_to(&cfg, &path)?;
            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("\n  Next: mapinv data fetch && mapinv airtable status");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n({e})")),
                |_| path.display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }

        // ── SetApiKey ───────────────────────────────────────────────
        ConfigCommand::SetApiKey => {
            let key = prompt_secret("Airtable API key: ", "api_key")?;
            mapinv_config::store_secret(AIRTABLE_KEYRING_USER, &key)?;
            eprintln!("✓ Airtable API key stored in system keyring");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { server } => {
            let cfg = config::load(global)?;
            let profile = cfg
                .servers
                .iter()
                .find(|s| s.label == server)
                .ok_or_else(|| {
                    let available: Vec<_> = cfg.servers.iter().map(|s| s.label.as_str()).collect();
                    CliError::ServerNotFound {
                        label: server.clone(),
                        available: if available.is_empty() {
                            "(none)".into()
                        } else {
                            available.join(", ")
                        },
                    }
                })?;

            let password = prompt_secret("Password: ", "password")?;
            mapinv_config::store_secret(&profile.keyring_user(), &password)?;
            eprintln!("✓ Password stored in system keyring for server '{server}'");
            Ok(())
        }
    }
}

fn prompt_server() -> Result<ServerProfile, CliError> {
    let label: String = Input::new()
        .with_prompt("Server label")
        .default("production".into())
        .interact_text()
        .map_err(prompt_err)?;
    let hostname: String = Input::new()
        .with_prompt("Hostname")
        .interact_text()
        .map_err(prompt_err)?;
    let api_path: String = Input::new()
        .with_prompt("REST API path")
        .default("/geoserver/rest".into())
        .interact_text()
        .map_err(prompt_err)?;
    let username: String = Input::new()
        .with_prompt("Username")
        .default("admin".into())
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = ServerProfile {
        id: EntityId::generate().to_string(),
        label,
        hostname,
        port: None,
        scheme: "https".into(),
        api_path,
        username,
        password: None,
        password_env: None,
        ca_cert: None,
        insecure: None,
        timeout: None,
    };
    let password = prompt_secret("Password: ", "password")?;
    profile.password = store_secret(&profile.keyring_user(), password, "password")?;
    Ok(profile)
}
