//! Command handlers for the Meal Finder CLI
//!
//! This module connects parsed CLI arguments to the search and favorites
//! coordinators and renders their results as plain text.

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::app::{
    cancel_on_interrupt, Category, FavoriteMeal, FavoritesCoordinator, LookupOutcome, Meal,
    MealDbClient, SearchCoordinator, SearchOutcome, SortKey, SqliteFavoritesStore,
};
use crate::cli::{Commands, FavoritesAction, GlobalArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Coordinators wired together for one CLI invocation
pub struct Session {
    pub search: Arc<SearchCoordinator>,
    pub favorites: Arc<FavoritesCoordinator>,
    quiet: bool,
}

impl Session {
    /// Open the favorites database and build the API client from `config`
    ///
    /// `--database` overrides the configured database path.
    pub async fn open(config: &AppConfig, global: &GlobalArgs) -> Result<Self> {
        let (client_config, search_config, database) = config.to_runtime_config();
        let database: PathBuf = global.database.clone().unwrap_or(database);
        debug!("Using favorites database {}", database.display());

        let store = SqliteFavoritesStore::open(&database).await?;
        let favorites = Arc::new(FavoritesCoordinator::new(Arc::new(store)).await?);

        let api = Arc::new(MealDbClient::with_config(client_config)?);
        let search = Arc::new(SearchCoordinator::new(
            search_config,
            api,
            favorites.favorite_ids(),
        ));

        Ok(Self {
            search,
            favorites,
            quiet: global.quiet,
        })
    }

    /// Await `fut` behind a spinner unless running quiet
    async fn with_spinner<F: Future>(&self, message: impl Into<String>, fut: F) -> F::Output {
        let spinner = (!self.quiet).then(|| spinner(message.into()));
        let output = fut.await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        output
    }

    fn favorite_ids(&self) -> HashSet<String> {
        self.favorites.favorite_ids().borrow().clone()
    }
}

/// Dispatch one CLI command
///
/// Ctrl+C cancels the in-flight request for the duration of the command.
pub async fn handle_command(session: &Session, command: Commands) -> Result<()> {
    let interrupt_watcher = cancel_on_interrupt(session.search.clone());

    let result = match command {
        Commands::Search { query, sort } => handle_search(session, &query, sort).await,
        Commands::Area { area, sort } => handle_area(session, &area, sort).await,
        Commands::Category { category, sort } => handle_category(session, &category, sort).await,
        Commands::Random { count } => handle_random(session, count).await,
        Commands::Show { id } => handle_show(session, &id).await,
        Commands::Areas => handle_areas(session).await,
        Commands::Categories => handle_categories(session).await,
        Commands::Favorites(args) => handle_favorites(session, args.action).await,
    };

    interrupt_watcher.abort();
    result
}

/// Handle the search command
pub async fn handle_search(session: &Session, query: &str, sort: Option<SortKey>) -> Result<()> {
    if let Some(sort) = sort {
        session.search.apply_sort(sort);
    }

    let outcome = session
        .with_spinner(
            format!("Searching for \"{}\"...", query.trim()),
            session.search.search_by_name_cascading(query),
        )
        .await;
    print_outcome(session, outcome)
}

/// Handle the area command
pub async fn handle_area(session: &Session, area: &str, sort: Option<SortKey>) -> Result<()> {
    if let Some(sort) = sort {
        session.search.apply_sort(sort);
    }

    let outcome = session
        .with_spinner(
            format!("Loading {} meals...", area.trim()),
            session.search.search_by_area(area),
        )
        .await;
    print_outcome(session, outcome)
}

/// Handle the category command
pub async fn handle_category(
    session: &Session,
    category: &str,
    sort: Option<SortKey>,
) -> Result<()> {
    if let Some(sort) = sort {
        session.search.apply_sort(sort);
    }

    let outcome = session
        .with_spinner(
            format!("Loading {} meals...", category.trim()),
            session.search.search_by_category(category),
        )
        .await;
    print_outcome(session, outcome)
}

/// Handle the random command
pub async fn handle_random(session: &Session, count: Option<usize>) -> Result<()> {
    let count = count.unwrap_or(session.search.config().random_count);
    let outcome = session
        .with_spinner(
            format!("Picking {} random meals...", count),
            session.search.fetch_random_meals(count),
        )
        .await;
    print_outcome(session, outcome)
}

/// Handle the show command
pub async fn handle_show(session: &Session, id: &str) -> Result<()> {
    println!("{}", show_meal(session, id).await?);
    Ok(())
}

/// Recipe card for `id`, marked when it is a favorite
async fn show_meal(session: &Session, id: &str) -> Result<String> {
    let id = id.trim();
    let meal = fetch_meal(session, id).await?;
    let is_favorite = session.favorites.is_favorite(id).await?;
    Ok(format_meal_details(&meal, is_favorite))
}

/// Handle the areas command
pub async fn handle_areas(session: &Session) -> Result<()> {
    let areas = session
        .with_spinner("Loading areas...", session.search.list_areas())
        .await?;
    for area in areas {
        println!("{}", area);
    }
    Ok(())
}

/// Handle the categories command
pub async fn handle_categories(session: &Session) -> Result<()> {
    let categories = session
        .with_spinner("Loading categories...", session.search.list_categories())
        .await?;
    for category in &categories {
        println!("{}", format_category_line(category));
    }
    Ok(())
}

/// Handle favorites management
pub async fn handle_favorites(session: &Session, action: FavoritesAction) -> Result<()> {
    match action {
        FavoritesAction::List => {
            let favorites = session.favorites.snapshot();
            if favorites.is_empty() {
                println!("No favorites yet");
            }
            for favorite in &favorites {
                println!("{}", format_favorite_line(favorite));
            }
        }
        FavoritesAction::Add { id } => {
            let meal = fetch_meal(session, &id).await?;
            session.favorites.add(&meal).await?;
            info!("Added {} to favorites", id);
            println!("Added \"{}\" to favorites", meal.display_name());
        }
        FavoritesAction::Remove { id } => {
            let id = id.trim();
            session.favorites.remove(id).await?;
            info!("Removed {} from favorites", id);
            println!("Removed {} from favorites", id);
        }
        FavoritesAction::Toggle { id } => {
            let id = id.trim();
            // Removal only needs the id, so skip the lookup when already a favorite
            let meal = if session.favorites.is_favorite(id).await? {
                Meal::partial(id, id)
            } else {
                fetch_meal(session, id).await?
            };
            if session.favorites.toggle(&meal).await? {
                println!("Added \"{}\" to favorites", meal.display_name());
            } else {
                println!("Removed {} from favorites", id);
            }
        }
    }
    Ok(())
}

async fn fetch_meal(session: &Session, id: &str) -> Result<Meal> {
    let outcome = session
        .with_spinner(
            format!("Loading meal {}...", id),
            session.search.fetch_meal_by_id(id),
        )
        .await;

    match outcome {
        LookupOutcome::Found(meal) => Ok(meal),
        LookupOutcome::NotFound => Err(AppError::generic(format!("Meal {} not found", id))),
        LookupOutcome::Failed(message) => Err(AppError::generic(message)),
    }
}

fn print_outcome(session: &Session, outcome: SearchOutcome) -> Result<()> {
    match outcome {
        SearchOutcome::Found { source, meals } => {
            debug!("{} meals matched by {}", meals.len(), source);
            let favorites = session.favorite_ids();
            for meal in &meals {
                let is_favorite = meal.id().is_some_and(|id| favorites.contains(id));
                println!("{}", format_meal_line(meal, is_favorite));
            }
            Ok(())
        }
        SearchOutcome::NoResults { message } => {
            println!("{}", message);
            Ok(())
        }
        SearchOutcome::Failed { message } => Err(AppError::generic(message)),
        SearchOutcome::Cancelled => {
            eprintln!("Cancelled");
            Ok(())
        }
        SearchOutcome::Debounced | SearchOutcome::Ignored => {
            println!("Nothing to search for");
            Ok(())
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["◐", "◓", "◑", "◒"]),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// One result row: favorite marker, id, name, then category and area when known
pub fn format_meal_line(meal: &Meal, is_favorite: bool) -> String {
    let marker = if is_favorite { '*' } else { ' ' };
    let mut line = format!(
        "{} {:>6}  {}",
        marker,
        meal.id().unwrap_or("-"),
        meal.display_name()
    );

    let details: Vec<&str> = [meal.category.as_deref(), meal.area.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !details.is_empty() {
        line.push_str(&format!("  ({})", details.join(", ")));
    }
    line
}

/// Full recipe card
pub fn format_meal_details(meal: &Meal, is_favorite: bool) -> String {
    let mut out = String::new();
    out.push_str(meal.display_name());
    if is_favorite {
        out.push_str("  [favorite]");
    }
    out.push('\n');

    if let Some(category) = &meal.category {
        out.push_str(&format!("Category: {}\n", category));
    }
    if let Some(area) = &meal.area {
        out.push_str(&format!("Area: {}\n", area));
    }
    if !meal.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", meal.tags.join(", ")));
    }

    if !meal.ingredients.is_empty() {
        out.push_str("\nIngredients:\n");
        for ingredient in &meal.ingredients {
            match &ingredient.measure {
                Some(measure) => out.push_str(&format!("  - {} {}\n", measure, ingredient.name)),
                None => out.push_str(&format!("  - {}\n", ingredient.name)),
            }
        }
    }

    if let Some(instructions) = &meal.instructions {
        out.push_str("\nInstructions:\n");
        out.push_str(instructions.trim());
        out.push('\n');
    }

    for (label, link) in [("Video", &meal.youtube), ("Source", &meal.source)] {
        if let Some(link) = link {
            out.push_str(&format!("{}: {}\n", label, link));
        }
    }

    out.trim_end().to_string()
}

fn format_category_line(category: &Category) -> String {
    match &category.description {
        Some(description) => {
            let summary = description.lines().next().unwrap_or_default();
            format!("{}  {}", category.name, summary)
        }
        None => category.name.clone(),
    }
}

fn format_favorite_line(favorite: &FavoriteMeal) -> String {
    format!(
        "{:>6}  {}  (added {})",
        favorite.id,
        favorite.name,
        favorite.created_at.format("%Y-%m-%d %H:%M")
    )
}
