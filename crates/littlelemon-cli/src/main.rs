//! Little Lemon - command-line driver for the storefront core.
//!
//! Maps the storefront's user actions (continue onboarding, save profile,
//! log out, toggle a menu section, type a search) onto the core library so
//! the whole flow can be exercised without the mobile shell.

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use littlelemon_core::utils::{format_phone, truncate_string};
use littlelemon_core::{
    AssetLocalizer, Config, JsonFileStore, KeyValueStore, MenuCache, MenuClient, MenuStore,
    OnboardingForm, OnboardingGate, ProfileStore, Screen, SearchDebouncer, Section,
};

// ============================================================================
// Constants
// ============================================================================

const LOG_FILE: &str = "littlelemon.log";

/// Width of the description column when listing the menu
const DESCRIPTION_WIDTH: usize = 60;

const USAGE: &str = "\
Usage: littlelemon [COMMAND]

Commands:
  (none)                          Show the start screen
  onboard <first-name> <email>    Complete onboarding
  menu [--category <section>]... [--search <text>]
                                  List the menu, optionally filtered
  browse                          Interactive search; ':<section>' toggles a
                                  section, ':clear' clears sections
  profile                         Show the saved profile
  profile set <field>=<value>...  Edit and save the profile
  logout                          Log out (profile is kept)";

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
///
/// Logs go to stderr and to a file in `log_dir`; keep the guard alive so the
/// file writer flushes on exit.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: failed to load config, using defaults: {e:#}");
        Config::default()
    });
    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let _guard = init_tracing(&data_dir);
    info!(data_dir = %data_dir.display(), "Little Lemon starting");

    let kv: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(config.key_value_path()?)?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None => start(&config, kv).await,
        Some("onboard") => onboard(kv, &args[1..]),
        Some("menu") => menu(&config, &args[1..]).await,
        Some("browse") => browse(&config).await,
        Some("profile") => profile(kv, &args[1..]),
        Some("logout") => logout(kv),
        Some("-h") | Some("--help") | Some("help") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => Err(anyhow::anyhow!("Unknown command: {other}\n\n{USAGE}")),
    };

    info!("Little Lemon shutting down");
    result
}

// ============================================================================
// Commands
// ============================================================================

async fn start(config: &Config, kv: Arc<dyn KeyValueStore>) -> Result<()> {
    let gate = OnboardingGate::load(kv)?;
    match gate.initial_screen() {
        Screen::Onboarding => {
            println!("Let us get to know you.");
            println!("Run: littlelemon onboard <first-name> <email>");
            Ok(())
        }
        Screen::Home => menu(config, &[]).await,
    }
}

fn onboard(kv: Arc<dyn KeyValueStore>, args: &[String]) -> Result<()> {
    let [first_name, email] = args else {
        anyhow::bail!("Usage: littlelemon onboard <first-name> <email>");
    };

    let mut gate = OnboardingGate::load(Arc::clone(&kv))?;
    let mut profile = ProfileStore::load(kv)?;

    let form = OnboardingForm::new(first_name.as_str(), email.as_str());
    if let Err(e) = form.validate() {
        println!("Cannot continue: {e}");
        return Ok(());
    }
    form.submit(&mut gate, &mut profile)?;
    println!("Welcome, {}!", profile.committed().first_name);
    Ok(())
}

fn logout(kv: Arc<dyn KeyValueStore>) -> Result<()> {
    let mut gate = OnboardingGate::load(kv)?;
    gate.logout()?;
    println!("Logged out.");
    Ok(())
}

async fn open_menu(config: &Config) -> Result<MenuCache<MenuClient, AssetLocalizer>> {
    let store = MenuStore::open(&config.database_path()?)?;
    let client = MenuClient::new(config.menu_url())?;
    let localizer = AssetLocalizer::new(config.assets_dir()?, config.image_base_url())?;

    let mut cache = MenuCache::new(store, client, localizer);
    if cache.activate().await.is_err() {
        if let Some(alert) = cache.take_alert() {
            eprintln!("Alert: {alert}");
        }
    }
    Ok(cache)
}

async fn menu(config: &Config, args: &[String]) -> Result<()> {
    let mut categories = Vec::new();
    let mut search = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--category" | "-c" => {
                let name = iter.next().context("--category needs a section name")?;
                let section = Section::from_name(name)
                    .with_context(|| format!("Unknown section: {name}"))?;
                categories.push(section);
            }
            "--search" | "-s" => {
                search = Some(iter.next().context("--search needs text")?.clone());
            }
            other => anyhow::bail!("Unknown menu option: {other}"),
        }
    }

    let mut cache = open_menu(config).await?;
    for section in categories {
        cache.toggle_category(section);
    }
    if let Some(query) = search {
        cache.set_search(&query);
    }

    print_menu(cache.view());
    Ok(())
}

enum BrowseCommand {
    Toggle(Section),
    Clear,
}

async fn browse(config: &Config) -> Result<()> {
    let mut cache = open_menu(config).await?;
    print_menu(cache.view());

    let (input, mut settled) = SearchDebouncer::new(config.search_debounce()).spawn();
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();

    // Stdin is blocking; read it on its own thread and feed the debouncer.
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match line.strip_prefix(':') {
                Some("clear") => {
                    let _ = cmd_tx.send(BrowseCommand::Clear);
                }
                Some(name) => match Section::from_name(name) {
                    Some(section) => {
                        let _ = cmd_tx.send(BrowseCommand::Toggle(section));
                    }
                    None => eprintln!("Unknown section: {name}"),
                },
                None => {
                    if !input.push(line) {
                        break;
                    }
                }
            }
        }
    });

    let mut commands_open = true;
    loop {
        tokio::select! {
            query = settled.recv() => match query {
                Some(query) => cache.set_search(&query),
                None => break,
            },
            command = cmd_rx.recv(), if commands_open => match command {
                Some(BrowseCommand::Toggle(section)) => cache.toggle_category(section),
                Some(BrowseCommand::Clear) => cache.clear_categories(),
                None => {
                    commands_open = false;
                    continue;
                }
            },
        }

        let sections: Vec<&str> = cache.selected_categories().iter().map(|s| s.title()).collect();
        println!(
            "\n-- sections: [{}]  search: {:?} --",
            sections.join(", "),
            cache.search_query()
        );
        print_menu(cache.view());
    }

    Ok(())
}

fn profile(kv: Arc<dyn KeyValueStore>, args: &[String]) -> Result<()> {
    let mut profile = ProfileStore::load(kv)?;

    match args.first().map(String::as_str) {
        None => {}
        Some("set") => {
            for assignment in &args[1..] {
                let (field, value) = assignment
                    .split_once('=')
                    .with_context(|| format!("Expected <field>=<value>, got: {assignment}"))?;
                apply_field(&mut profile, field, value)?;
            }

            if !profile.is_dirty() {
                println!("Nothing to save.");
            } else if let Err(e) = profile.validate_draft() {
                println!("Cannot save: {e}");
                profile.discard();
            } else {
                profile.commit()?;
                println!("Profile saved.");
            }
        }
        Some(other) => anyhow::bail!("Unknown profile command: {other}"),
    }

    print_profile(&profile);
    Ok(())
}

fn apply_field(profile: &mut ProfileStore, field: &str, value: &str) -> Result<()> {
    let parse_flag = |v: &str| -> Result<bool> {
        v.parse::<bool>()
            .with_context(|| format!("{field} must be true or false"))
    };

    let draft = profile.draft_mut();
    match field {
        "first_name" => draft.first_name = value.to_string(),
        "last_name" => draft.last_name = value.to_string(),
        "email" => draft.email = value.to_string(),
        "phone" | "number" => draft.number = value.to_string(),
        "order_status" => draft.is_order_status = parse_flag(value)?,
        "special_offers" => draft.is_special_offers = parse_flag(value)?,
        "newsletter" => draft.is_newsletter = parse_flag(value)?,
        "avatar" if value.is_empty() || value == "none" => draft.remove_avatar(),
        "avatar" => draft.set_avatar(value),
        other => {
            warn!(field = other, "Unknown profile field");
            anyhow::bail!("Unknown profile field: {other}");
        }
    }
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn print_menu(items: &[littlelemon_core::MenuItem]) {
    if items.is_empty() {
        println!("(no menu items)");
        return;
    }
    for item in items {
        println!(
            "{:<28} {:>8}  [{}]",
            item.name,
            item.display_price(),
            item.category
        );
        if !item.description.is_empty() {
            println!("    {}", truncate_string(&item.description, DESCRIPTION_WIDTH));
        }
    }
}

fn print_profile(profile: &ProfileStore) {
    let info = profile.committed();
    let avatar = match info.avatar {
        Some(ref path) => path.clone(),
        None if info.initials().is_empty() => "(none)".to_string(),
        None => format!("({})", info.initials()),
    };

    println!("Avatar:         {avatar}");
    println!("Name:           {}", info.full_name());
    println!("Email:          {}", info.email);
    println!("Phone:          {}", format_phone(&info.number));
    println!("Email notifications:");
    println!("  Order status:   {}", info.is_order_status);
    println!("  Special offers: {}", info.is_special_offers);
    println!("  Newsletter:     {}", info.is_newsletter);
}
