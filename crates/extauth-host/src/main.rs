//! Emulated browser-extension login flow, single binary.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod host;

use extauth_content::Observer;
use extauth_core::ExtAuthConfig;
use extauth_protocol::Message;
use host::HostEnv;

fn resolve_profile_dir() -> PathBuf {
    std::env::var("EXTAUTH_PROFILE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("profile"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "demo" => return run_demo().await,
            "login" => {
                if args.len() < 4 {
                    eprintln!("Usage: extauth login <username> <password>");
                    std::process::exit(1);
                }
                return run_login(&args[2], &args[3]).await;
            }
            "logout" => return run_logout().await,
            "status" => return run_status().await,
            "send" => {
                if args.len() < 3 {
                    eprintln!("Usage: extauth send <message-json>");
                    std::process::exit(1);
                }
                return run_send(&args[2]).await;
            }
            "--help" | "-h" | "help" => {
                println!("extauth: emulated browser-extension login flow");
                println!();
                println!("Usage: extauth [command]");
                println!();
                println!("Commands:");
                println!("  (none)                    Run the scripted demo flow");
                println!("  demo                      Run the scripted demo flow");
                println!("  login <user> <password>   Authenticate and record the session");
                println!("  logout                    Clear the recorded session");
                println!("  status                    Query the coordinator for current state");
                println!("  send <message-json>       Send a raw action-tagged message");
                println!("  help                      Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'extauth help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    run_demo().await
}

/// Scripted walk through the whole flow: restore, observe, login, observe,
/// logout with reload, observe again.
async fn run_demo() -> anyhow::Result<()> {
    let profile_dir = resolve_profile_dir();
    info!("Profile directory: {}", profile_dir.display());

    let config = ExtAuthConfig::from_env();
    let mut env = HostEnv::open(&profile_dir, config.clone())?;

    let observer = Observer::new(env.coordinator.clone());
    observer.observe().await;

    let page = env.open_page();
    page.load().await?;

    page.login("alice", "wonderland").await?;
    observer.observe().await;

    page.logout().await?;

    // Give the page's post-logout navigation time to land.
    tokio::time::sleep(Duration::from_millis(config.navigate_delay_ms + 100)).await;
    let href = page.window().href();
    info!("Page URL after logout: {}", href);
    drop(page);

    // The coordinator asks the host to reload; emulate it by reopening the
    // page at its current URL, the way a real browser would.
    if !config.test_mode {
        match tokio::time::timeout(
            Duration::from_millis(config.reload_delay_ms + 500),
            env.next_reload(),
        )
        .await
        {
            Ok(Some(())) => {
                info!("Reload request received; reloading page contexts");
                let page = env.open_page_at(&href);
                page.load().await?;
                info!("Page URL after reload: {}", page.window().href());
            }
            _ => info!("No reload request received"),
        }
    }

    observer.observe().await;
    drop(observer);

    env.shutdown().await;
    Ok(())
}

async fn run_login(username: &str, password: &str) -> anyhow::Result<()> {
    let env = HostEnv::open(&resolve_profile_dir(), ExtAuthConfig::from_env())?;
    let page = env.open_page();
    page.load().await?;

    if page.current_user().as_deref() == Some(username) {
        info!("Already logged in as {}", username);
    } else {
        page.login(username, password).await?;
    }

    let state = env.coordinator.auth_state().await?;
    println!("{}", serde_json::to_string_pretty(&state)?);

    drop(page);
    env.shutdown().await;
    Ok(())
}

async fn run_logout() -> anyhow::Result<()> {
    let env = HostEnv::open(&resolve_profile_dir(), ExtAuthConfig::from_env())?;
    let page = env.open_page();
    page.load().await?;

    match page.current_user() {
        Some(user) => {
            // One-shot CLI logout; there is no page left to reload after.
            page.perform_logout(true).await?;
            println!("User {} logged out", user);
        }
        None => println!("No user is logged in"),
    }

    drop(page);
    env.shutdown().await;
    Ok(())
}

async fn run_status() -> anyhow::Result<()> {
    let env = HostEnv::open(&resolve_profile_dir(), ExtAuthConfig::from_env())?;

    let observer = Observer::new(env.coordinator.clone());
    let report = observer.observe().await;
    match report.username {
        Some(user) => println!("Logged in as {}", user),
        None => println!("No user is logged in"),
    }

    drop(observer);
    env.shutdown().await;
    Ok(())
}

async fn run_send(raw: &str) -> anyhow::Result<()> {
    let message: Message = serde_json::from_str(raw)?;

    let env = HostEnv::open(&resolve_profile_dir(), ExtAuthConfig::from_env())?;
    let response = env.coordinator.send(message).await?;
    println!("{}", serde_json::to_string(&response)?);

    env.shutdown().await;
    Ok(())
}
