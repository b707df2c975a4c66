pub const RECIPE_COUNT_PER_PAGE: i64 = 6;
pub const SUBSCRIPTION_COUNT_PER_PAGE: i64 = 6;
pub const INGREDIENT_SEARCH_LIMIT: i64 = 50;

/// Default number of recipes previewed for each author in a subscription listing.
pub const SUBSCRIPTION_RECIPES_PREVIEW: i64 = 3;

pub const COOKING_TIME_MIN: i64 = 1;
pub const COOKING_TIME_MAX: i64 = 500;
pub const INGREDIENT_AMOUNT_MIN: i64 = 1;
pub const INGREDIENT_AMOUNT_MAX: i64 = i32::MAX as i64;
pub const RECIPE_NAME_MAX_LENGTH: usize = 255;

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub const MEASUREMENT_UNITS: &[(&str, &str)] = &[
    ("g", "Gram"),
    ("kg", "Kilogram"),
    ("ml", "Millilitre"),
    ("l", "Litre"),
    ("pcs", "Piece"),
    ("tbsp", "Tablespoon"),
    ("tsp", "Teaspoon"),
    ("pack", "Pack"),
    ("serving", "Serving"),
    ("bottle", "Bottle"),
];
