//! Command-line argument parsing for Meal Finder
//!
//! This module defines the CLI structure using clap derive macros: searches,
//! random suggestions, meal details, and favorites management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::SortKey;

/// Meal Finder - search TheMealDB and keep a list of favorite recipes
#[derive(Parser, Debug)]
#[command(
    name = "meal_finder",
    version,
    about = "Search TheMealDB recipes and manage local favorites",
    long_about = "Search recipes by name, cuisine or category, browse random suggestions,
and keep a local list of favorite meals."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - no spinner, errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Favorites database path
    #[arg(long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search by name, falling back to area then category
    Search {
        /// Meal name, cuisine or category
        query: String,

        /// Result ordering (insertion, name-asc, name-desc, category, area, favorites-first)
        #[arg(short, long, value_name = "KEY")]
        sort: Option<SortKey>,
    },

    /// List meals from one cuisine
    Area {
        /// Area name, e.g. "Italian"
        area: String,

        /// Result ordering
        #[arg(short, long, value_name = "KEY")]
        sort: Option<SortKey>,
    },

    /// List meals from one category
    Category {
        /// Category name, e.g. "Seafood"
        category: String,

        /// Result ordering
        #[arg(short, long, value_name = "KEY")]
        sort: Option<SortKey>,
    },

    /// Suggest random meals
    Random {
        /// Number of meals (defaults to the configured count)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Show full details of one meal
    Show {
        /// Meal identifier
        id: String,
    },

    /// List all areas / cuisines
    Areas,

    /// List all categories
    Categories,

    /// Manage favorite meals
    Favorites(FavoritesArgs),
}

/// Arguments for favorites management
#[derive(Args, Debug)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub action: FavoritesAction,
}

/// Favorites management actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FavoritesAction {
    /// List favorites, most recently added first
    List,

    /// Add a meal to favorites
    Add {
        /// Meal identifier
        id: String,
    },

    /// Remove a meal from favorites
    Remove {
        /// Meal identifier
        id: String,
    },

    /// Add the meal if absent, otherwise remove it
    Toggle {
        /// Meal identifier
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log level for the crate's filter directive
    ///
    /// Command-line flags win over the configured level.
    pub fn log_level(&self, configured: &str) -> String {
        if self.global.quiet {
            "error".to_string()
        } else if self.global.very_verbose {
            "debug".to_string()
        } else if self.global.verbose {
            "info".to_string()
        } else {
            configured.to_string()
        }
    }
}
