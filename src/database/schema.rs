use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::TypeError;

pub type Id = i64;

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
pub enum MeasurementUnit {
    #[sqlx(rename = "g")]
    #[serde(rename = "g")]
    Gram,
    #[sqlx(rename = "kg")]
    #[serde(rename = "kg")]
    Kilogram,
    #[sqlx(rename = "ml")]
    #[serde(rename = "ml")]
    Millilitre,
    #[sqlx(rename = "l")]
    #[serde(rename = "l")]
    Litre,
    #[sqlx(rename = "pcs")]
    #[serde(rename = "pcs")]
    Piece,
    #[sqlx(rename = "tbsp")]
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[sqlx(rename = "tsp")]
    #[serde(rename = "tsp")]
    Teaspoon,
    #[sqlx(rename = "pack")]
    #[serde(rename = "pack")]
    Pack,
    #[sqlx(rename = "serving")]
    #[serde(rename = "serving")]
    Serving,
    #[sqlx(rename = "bottle")]
    #[serde(rename = "bottle")]
    Bottle,
}

impl MeasurementUnit {
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementUnit::Gram => "g",
            MeasurementUnit::Kilogram => "kg",
            MeasurementUnit::Millilitre => "ml",
            MeasurementUnit::Litre => "l",
            MeasurementUnit::Piece => "pcs",
            MeasurementUnit::Tablespoon => "tbsp",
            MeasurementUnit::Teaspoon => "tsp",
            MeasurementUnit::Pack => "pack",
            MeasurementUnit::Serving => "serving",
            MeasurementUnit::Bottle => "bottle",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "g" => Some(Self::Gram),
            "kg" => Some(Self::Kilogram),
            "ml" => Some(Self::Millilitre),
            "l" => Some(Self::Litre),
            "pcs" => Some(Self::Piece),
            "tbsp" => Some(Self::Tablespoon),
            "tsp" => Some(Self::Teaspoon),
            "pack" => Some(Self::Pack),
            "serving" => Some(Self::Serving),
            "bottle" => Some(Self::Bottle),
            _ => None,
        }
    }
}

impl Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<Value> for MeasurementUnit {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => {
                Self::from_label(value).ok_or_else(|| TypeError::new("Invalid measurement unit"))
            }
            None => Err(TypeError::new("Failed to parse value as string")),
        }
    }
}

/// The three user-relationship edges. All of them share the `(user_id, target)` shape and
/// differ only in the table they live in, what they point at and their self-reference policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Favorite,
    Cart,
    Subscription,
}

impl EdgeKind {
    pub fn table(&self) -> &'static str {
        match self {
            EdgeKind::Favorite => "favorites",
            EdgeKind::Cart => "shopping_cart",
            EdgeKind::Subscription => "subscriptions",
        }
    }

    pub fn target_column(&self) -> &'static str {
        match self {
            EdgeKind::Favorite | EdgeKind::Cart => "recipe_id",
            EdgeKind::Subscription => "author_id",
        }
    }

    pub fn target_table(&self) -> &'static str {
        match self {
            EdgeKind::Favorite | EdgeKind::Cart => "recipes",
            EdgeKind::Subscription => "users",
        }
    }

    pub fn target_name(&self) -> &'static str {
        match self {
            EdgeKind::Favorite | EdgeKind::Cart => "recipe",
            EdgeKind::Subscription => "author",
        }
    }

    pub fn forbids_self_reference(&self) -> bool {
        matches!(self, EdgeKind::Subscription)
    }
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeKind::Favorite => "favorite",
            EdgeKind::Cart => "shopping cart entry",
            EdgeKind::Subscription => "subscription",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleMethod {
    Add,
    Remove,
}

impl TryFrom<Value> for ToggleMethod {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_str().map(|v| v.to_ascii_lowercase()) {
            Some(value) => match value.as_str() {
                "add" | "post" => Ok(Self::Add),
                "remove" | "delete" => Ok(Self::Remove),
                _ => Err(TypeError::new("Invalid variant")),
            },
            None => Err(TypeError::new("Failed to parse value as string")),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Public view of a user as seen by `viewer`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthorProfile {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl AuthorProfile {
    pub fn from_user(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
    pub measurement_unit: MeasurementUnit,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub slug: String,
    pub color: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Recipe {
    pub id: Id,
    pub author_id: Id,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct RecipeRow {
    #[sqlx(flatten)]
    pub recipe: Recipe,
    pub count: i64,
}

/// One ingredient line of a recipe, resolved against the catalog.
#[derive(sqlx::FromRow, Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipePart {
    pub id: Id,
    pub name: String,
    pub measurement_unit: MeasurementUnit,
    pub amount: i64,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: Id,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeView {
    pub id: Id,
    pub author: AuthorProfile,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipePart>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilter {
    pub author: Option<Id>,
    /// Tag slugs; a recipe matches when it carries any of them.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub is_in_shopping_cart: bool,
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubscriptionInfo {
    #[serde(flatten)]
    pub author: AuthorProfile,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SubscriptionRow {
    #[sqlx(flatten)]
    pub author: User,
    pub count: i64,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub amount: i64,
    pub measurement_unit: MeasurementUnit,
}

impl ShoppingListLine {
    pub fn new(name: &str, amount: i64, measurement_unit: MeasurementUnit) -> Self {
        Self {
            name: name.to_string(),
            amount,
            measurement_unit,
        }
    }
}

impl Display for ShoppingListLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.measurement_unit, self.amount)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ShoppingList {
    pub lines: Vec<ShoppingListLine>,
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
