//! Command-line interface components
//!
//! This module contains CLI-specific code for the Meal Finder application:
//! argument parsing and the command handlers that print results.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, FavoritesAction, FavoritesArgs, GlobalArgs};
pub use commands::{
    format_meal_details, format_meal_line, handle_area, handle_areas, handle_categories,
    handle_category, handle_command, handle_favorites, handle_random, handle_search, handle_show,
    Session,
};
