pub mod cities;
pub mod extract;
pub mod intent;
pub mod models;
pub mod prompt;

pub use cities::{alias_collisions, is_location_code, resolve_location, AliasCollision};
pub use extract::{extract_flight_query, extract_flight_query_on, has_flight_intent};
pub use intent::{
    classify_query, classify_query_on, detect_language, language_info, normalize_text,
};
pub use models::*;
pub use prompt::build_system_prompt;
