// Entity Models
//
// Plain data carried between the repositories and the web layer:
// - Ingredient: immutable, seeded at startup
// - Taco: a named design referencing ingredients
// - TacoOrder: delivery/payment header owning an ordered list of tacos
// - User: a login principal

pub mod ingredient;
pub mod order;
pub mod taco;
pub mod user;

pub use ingredient::{Ingredient, IngredientType, UnknownIngredientType};
pub use order::{Record, TacoOrder};
pub use taco::Taco;
pub use user::{User, DEFAULT_ROLE};
