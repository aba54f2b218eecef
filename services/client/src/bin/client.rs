//! services/client/src/bin/client.rs

use client_lib::{
    adapters::{FileCredentialStore, HttpApiAdapter},
    auth::AuthFlow,
    config::Config,
    error::ClientError,
};
use std::sync::Arc;
use todo_feed_core::{
    CollectionSnapshot, CollectionSynchronizer, SessionStore, SyncError, TodoApi,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. API at {}", config.api_url);

    // --- 2. Initialize Collaborator Adapters ---
    let api: Arc<dyn TodoApi> = Arc::new(HttpApiAdapter::new(
        config.api_url.clone(),
        config.request_timeout,
    )?);
    let store = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));

    // --- 3. Build the Core ---
    let session = SessionStore::new(store);
    let auth = AuthFlow::new(api.clone(), session.clone());
    let sync = CollectionSynchronizer::new(session.clone(), api.clone());

    // --- 4. Dispatch the Subcommand ---
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["login", username, password] => {
            auth.login(username, password).await?;
            println!("Logged in.");
        }
        ["register", username, password, email] => {
            auth.register(username, password, email).await?;
            println!("Registered. Log in to continue.");
        }
        ["logout"] => {
            auth.logout().await;
            println!("Logged out.");
        }
        ["list"] => {
            sync.refresh().await?;
            print_items(&sync.snapshot(), None);
        }
        ["feed"] => {
            sync.refresh().await?;
            let token = session.get().await.ok_or(SyncError::Unauthenticated)?;
            let profile = api.fetch_profile(&token).await?;
            println!("Feed for @{}", profile.username);
            print_items(&sync.snapshot(), Some(profile.id.as_str()));
        }
        ["show", id] => {
            let item = sync.fetch_item(id).await?;
            println!("{}\n  {}\n  {}", item.id, item.title, item.description);
            println!("  {} like(s)", item.liked_by.len());
        }
        ["add", title, description] => {
            sync.refresh().await?;
            sync.create(title, description).await?;
            print_items(&sync.snapshot(), None);
        }
        ["edit", id, title, description] => {
            sync.refresh().await?;
            sync.update(id, title, description).await?;
            print_items(&sync.snapshot(), None);
        }
        ["rm", id] => {
            sync.refresh().await?;
            sync.delete(id).await?;
            print_items(&sync.snapshot(), None);
        }
        ["like", id] => {
            sync.refresh().await?;
            sync.toggle_like(id).await?;
            let token = session.get().await.ok_or(SyncError::Unauthenticated)?;
            let profile = api.fetch_profile(&token).await?;
            print_items(&sync.snapshot(), Some(profile.id.as_str()));
        }
        ["profile"] => {
            let token = session.get().await.ok_or(SyncError::Unauthenticated)?;
            let profile = api.fetch_profile(&token).await?;
            println!("{} <{}> (id {})", profile.username, profile.email, profile.id);
        }
        _ => print_usage(),
    }

    Ok(())
}

fn print_items(snapshot: &CollectionSnapshot, viewer: Option<&str>) {
    if snapshot.items.is_empty() {
        println!("(no todos)");
        return;
    }
    for item in &snapshot.items {
        let likes = match viewer {
            Some(user_id) if item.is_liked_by(user_id) => {
                format!("{} like(s), liked by you", item.liked_by.len())
            }
            _ => format!("{} like(s)", item.liked_by.len()),
        };
        println!("{}  {} - {}  [{}]", item.id, item.title, item.description, likes);
    }
}

fn print_usage() {
    eprintln!("Usage: client <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  login <username> <password>");
    eprintln!("  register <username> <password> <email>");
    eprintln!("  logout");
    eprintln!("  list");
    eprintln!("  feed");
    eprintln!("  show <id>");
    eprintln!("  add <title> <description>");
    eprintln!("  edit <id> <title> <description>");
    eprintln!("  rm <id>");
    eprintln!("  like <id>");
    eprintln!("  profile");
}
