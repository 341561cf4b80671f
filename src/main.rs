use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Select};
use env_logger::Env;
use show_scout::{
    CatalogDetail, CatalogProvider, CatalogSummary, Config, DetailState, KeyValueStorage,
    Session, SessionEvent, ShowId, open_session,
};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(version, about = "Discover TV shows from the terminal")]
struct Cli {
    /// Base URL of the TVMaze API
    #[arg(long, global = true, env = "SHOW_SCOUT_API_URL")]
    api_url: Option<String>,

    /// Directory favorites are stored in
    #[arg(long, global = true, env = "SHOW_SCOUT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Idle time in milliseconds before suggestions are fetched
    #[arg(long, global = true, env = "SHOW_SCOUT_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,

    /// Enable informational logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print search suggestions for a text
    Search {
        /// Text to search for
        text: String,
    },

    /// Print the details of a show
    Show {
        /// Catalog id of the show
        id: ShowId,
    },

    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// Print popular shows
    Popular {
        /// Maximum number of shows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Browse interactively (default)
    Interactive,
}

#[derive(Subcommand, Debug)]
enum FavoritesAction {
    /// List favorites
    List,
    /// Add a show to the favorites
    Add { id: ShowId },
    /// Remove a show from the favorites
    Remove { id: ShowId },
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(millis) = self.debounce_ms {
            config.debounce_delay = Duration::from_millis(millis);
        }
        if let Some(Commands::Popular { limit: Some(limit) }) = &self.command {
            config.popular_limit = *limit;
        }
        config.data_dir = self.data_dir.clone();
        config
    }
}

/// Logs session events, and echoes progress when running interactively
fn handle_session_event(event: SessionEvent, interactive: bool) {
    match event {
        SessionEvent::SuggestionsLoading { query } => {
            log::info!("Searching suggestions for '{}'", query);
            if interactive {
                println!("Searching for '{}'...", query);
            }
        }
        SessionEvent::DetailLoading { id } => {
            log::info!("Loading show {}", id);
        }
        SessionEvent::DetailFailed { id, message } => {
            log::info!("Loading show {} failed: {}", id, message);
        }
        SessionEvent::Submitted { text } => {
            log::info!("Submitted: {}", text);
        }
        SessionEvent::FavoritesChanged { entries } => {
            log::info!("Favorites now contain {} show(s)", entries.len());
        }
        other => log::debug!("{:?}", other),
    }
}

/// Runs pending debounced searches, sleeping until each is due
fn settle<P, S, F>(session: &mut Session<P, S, F>)
where
    P: CatalogProvider,
    S: KeyValueStorage,
    F: FnMut(SessionEvent),
{
    while let Some(deadline) = session.next_deadline() {
        thread::sleep(deadline.saturating_duration_since(Instant::now()));
        session.tick(Instant::now());
    }
}

fn print_summaries(summaries: &[CatalogSummary]) {
    for summary in summaries {
        println!("{:>8}  {}", summary.id, summary.name);
    }
}

fn print_detail(detail: &CatalogDetail, is_favorite: bool) {
    let star = if is_favorite { " [favorite]" } else { "" };
    println!("\n=== {}{} ===", detail.name, star);

    let mut meta = Vec::new();
    if let Some(year) = detail.premiere_year {
        meta.push(format!("Premiered: {}", year));
    }
    if !detail.genres.is_empty() {
        meta.push(format!("Genres: {}", detail.genres.join(", ")));
    }
    if let Some(rating) = detail.rating_average {
        meta.push(format!("Rating: {}/10", rating));
    }
    if let Some(network) = &detail.network_name {
        meta.push(format!("Network: {}", network));
    }
    if !meta.is_empty() {
        println!("{}", meta.join("  |  "));
    }

    if let Some(summary) = detail.summary_text() {
        println!("\n{}\n", summary);
    }

    if let Some(status) = &detail.status {
        println!("Status:   {}", status);
    }
    if let Some(kind) = &detail.kind {
        println!("Type:     {}", kind);
    }
    if let Some(language) = &detail.language {
        println!("Language: {}", language);
    }
    if let Some(runtime) = detail.runtime_minutes {
        println!("Runtime:  {} minutes", runtime);
    }
    if let Some(poster) = &detail.poster_url {
        println!("Poster:   {}", poster);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config();
    let interactive = matches!(cli.command, None | Some(Commands::Interactive));

    let mut session = open_session(&config, |event| handle_session_event(event, interactive))
        .context("Failed to open session")?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Search { text } => {
            session.text_changed(&text, Instant::now());
            settle(&mut session);

            let results = session.suggestions().results();
            if results.is_empty() {
                println!("No suggestions for '{}'.", text.trim());
            } else {
                print_summaries(results);
            }
        }
        Commands::Show { id } => match session.open_detail(id).clone() {
            DetailState::Loaded(detail) => print_detail(&detail, session.is_favorite(id)),
            DetailState::Failed { message, .. } => bail!("{}", message),
            _ => {}
        },
        Commands::Favorites { action } => match action.unwrap_or(FavoritesAction::List) {
            FavoritesAction::List => {
                if session.favorites().is_empty() {
                    println!("No favorites yet.");
                }
                for favorite in session.favorites() {
                    println!("{:>8}  {}", favorite.id, favorite.name);
                }
            }
            FavoritesAction::Add { id } => {
                if session.is_favorite(id) {
                    println!("Show {} already is a favorite.", id);
                    return Ok(());
                }
                if let DetailState::Failed { message, .. } = session.open_detail(id) {
                    bail!("{}", message);
                }
                match (session.toggle_favorite(), session.detail()) {
                    (Some(true), DetailState::Loaded(detail)) => {
                        println!("Added '{}' to favorites.", detail.name);
                    }
                    _ => bail!("Failed to add show {} to favorites", id),
                }
            }
            FavoritesAction::Remove { id } => {
                if !session.is_favorite(id) {
                    println!("Show {} is not a favorite.", id);
                    return Ok(());
                }
                session.remove_favorite(id);
                println!("Removed show {} from favorites.", id);
            }
        },
        Commands::Popular { .. } => {
            let shows = session.background();
            if shows.is_empty() {
                println!("No popular shows available.");
            }
            print_summaries(&shows);
        }
        Commands::Interactive => interactive_loop(&mut session)?,
    }

    Ok(())
}

fn interactive_loop<P, S, F>(session: &mut Session<P, S, F>) -> anyhow::Result<()>
where
    P: CatalogProvider,
    S: KeyValueStorage,
    F: FnMut(SessionEvent),
{
    println!("ShowScout - search TVMaze for shows. Leave the search empty to return to the menu.");

    loop {
        let choice = Select::new()
            .with_prompt("What would you like to do?")
            .items(&["Search", "Favorites", "Quit"])
            .default(0)
            .interact_opt()?;

        match choice {
            Some(0) => search_prompt(session)?,
            Some(1) => favorites_prompt(session)?,
            _ => return Ok(()),
        }
    }
}

fn search_prompt<P, S, F>(session: &mut Session<P, S, F>) -> anyhow::Result<()>
where
    P: CatalogProvider,
    S: KeyValueStorage,
    F: FnMut(SessionEvent),
{
    loop {
        let text: String = Input::new()
            .with_prompt("Search")
            .with_initial_text(session.suggestions().current_text())
            .allow_empty(true)
            .interact_text()?;

        if text.trim().is_empty() {
            session.text_changed("", Instant::now());
            return Ok(());
        }

        if text == session.suggestions().current_text() {
            session.focus();
        } else {
            session.text_changed(&text, Instant::now());
            settle(session);
        }

        if !session.suggestions().is_open() {
            println!("No suggestions for '{}'.", text.trim());
            continue;
        }

        let mut items: Vec<String> = session
            .suggestions()
            .results()
            .iter()
            .map(|summary| summary.name.clone())
            .collect();
        let suggestion_count = items.len();
        items.push(format!("Search for \"{}\"", text.trim()));

        match Select::new()
            .with_prompt("Suggestions")
            .items(&items)
            .default(0)
            .interact_opt()?
        {
            Some(index) if index < suggestion_count => {
                session.select_suggestion(index);
                detail_prompt(session)?;
            }
            Some(_) => {
                let submitted = session.submit();
                println!("Submitted search for '{}'.", submitted.trim());
            }
            None => session.dismiss(),
        }
    }
}

fn favorites_prompt<P, S, F>(session: &mut Session<P, S, F>) -> anyhow::Result<()>
where
    P: CatalogProvider,
    S: KeyValueStorage,
    F: FnMut(SessionEvent),
{
    loop {
        if session.favorites().is_empty() {
            println!("No favorites yet.");
            return Ok(());
        }

        let items: Vec<String> = session
            .favorites()
            .iter()
            .map(|favorite| favorite.name.clone())
            .collect();

        let Some(index) = Select::new()
            .with_prompt("Your favorites (Esc to go back)")
            .items(&items)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };

        let id = session.favorites()[index].id;
        session.open_detail(id);
        detail_prompt(session)?;
    }
}

fn detail_prompt<P, S, F>(session: &mut Session<P, S, F>) -> anyhow::Result<()>
where
    P: CatalogProvider,
    S: KeyValueStorage,
    F: FnMut(SessionEvent),
{
    loop {
        match session.detail().clone() {
            DetailState::Loaded(detail) => {
                let is_favorite = session.is_favorite(detail.id);
                print_detail(&detail, is_favorite);

                let prompt = if is_favorite {
                    "Remove from favorites?"
                } else {
                    "Add to favorites?"
                };
                if Confirm::new().with_prompt(prompt).default(false).interact()? {
                    session.toggle_favorite();
                    continue;
                }
            }
            DetailState::Failed { message, .. } => {
                println!("Error: {}", message);
                Input::<String>::new()
                    .with_prompt("Press enter to close")
                    .allow_empty(true)
                    .interact_text()?;
            }
            DetailState::Loading { .. } | DetailState::NoSelection => {}
        }

        session.close_detail();
        return Ok(());
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger (overridden by RUST_LOG)
    let env = if cli.verbose {
        Env::default().default_filter_or("info")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        for cause in e.chain().skip(1) {
            eprintln!("  {}", cause);
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popular_limit_reaches_config() {
        let cli = Cli::parse_from(["show_scout", "popular", "--limit", "50"]);
        assert_eq!(cli.config().popular_limit, 50);

        let cli = Cli::parse_from(["show_scout", "popular"]);
        assert_eq!(cli.config().popular_limit, Config::default().popular_limit);
    }

    #[test]
    fn test_global_flags_reach_config() {
        let cli = Cli::parse_from([
            "show_scout",
            "search",
            "Lost",
            "--debounce-ms",
            "50",
            "--api-url",
            "http://localhost:8080",
        ]);
        let config = cli.config();

        assert_eq!(config.debounce_delay, Duration::from_millis(50));
        assert_eq!(config.api_base_url, "http://localhost:8080");
    }
}
