// Taco Cloud - Core Library
// Exposes all modules for use in the admin CLI, the web server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod repository;
pub mod security;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use db::{
    count_rows, import_ingredients, load_ingredients_csv, open_database, seed_ingredients,
    setup_database,
};
pub use entities::{Ingredient, IngredientType, Taco, TacoOrder, User, DEFAULT_ROLE};
pub use repository::taco::RECENT_PAGE_SIZE;
pub use repository::{
    IngredientRepository, OrderError, OrderRepository, TacoError, TacoRepository, UserRepository,
};
pub use security::{AccessPolicy, Decision, Principal, Requirement, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
