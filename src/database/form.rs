use std::{collections::HashMap, collections::HashSet, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    error::{TypeError, ValidationError},
    schema::Id,
};
use crate::constants::{
    COOKING_TIME_MAX, COOKING_TIME_MIN, INGREDIENT_AMOUNT_MAX, INGREDIENT_AMOUNT_MIN,
    RECIPE_NAME_MAX_LENGTH,
};

pub type FormData = HashMap<String, Value>;

pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    pub fn get_value<T>(&self, key: &str) -> Result<T, TypeError>
    where
        T: TryFrom<Value>,
    {
        match self.inner.get(key) {
            Some(value) => value
                .to_owned()
                .try_into()
                .map_err(|_e| TypeError::new("Invalid type conversion")),
            None => Err(TypeError::new("Invalid key")),
        }
    }

    pub fn get_number<T>(&self, key: &str) -> Result<T, TypeError>
    where
        T: FromStr,
    {
        match self.inner.get(key) {
            Some(value) => parse_number(value),
            None => Err(TypeError::new("Invalid key")),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<String, TypeError> {
        match self.inner.get(key) {
            Some(value) => match value.as_str() {
                Some(v) => Ok(v.to_string()),
                None => Err(TypeError::new("Failed to parse value as str")),
            },
            None => Err(TypeError::new("Invalid key")),
        }
    }

    pub fn get_optional_str(&self, key: &str) -> Result<Option<String>, TypeError> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.get_str(key).map(Some),
        }
    }

    /// Only a missing key or `null` reads as absent. Any other non-list value is an error.
    pub fn get_optional_list(&self, key: &str) -> Result<Option<&Vec<Value>>, TypeError> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.get_list(key).map(Some),
        }
    }

    pub fn get_list(&self, key: &str) -> Result<&Vec<Value>, TypeError> {
        match self.inner.get(key) {
            Some(value) => value
                .as_array()
                .ok_or_else(|| TypeError::new("Failed to parse value as list")),
            None => Err(TypeError::new("Invalid key")),
        }
    }
}

fn parse_number<T: FromStr>(value: &Value) -> Result<T, TypeError> {
    match value {
        Value::Number(n) => n
            .to_string()
            .parse()
            .map_err(|_e| TypeError::new("Invalid type conversion")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_e| TypeError::new("Invalid type conversion")),
        _ => Err(TypeError::new("Failed to parse value as number")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub id: Id,
    pub amount: i64,
}

impl TryFrom<&Value> for IngredientLine {
    type Error = TypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let line = value
            .as_object()
            .ok_or_else(|| TypeError::new("Ingredient line must be an object"))?;

        let id = line
            .get("id")
            .ok_or_else(|| TypeError::new("Ingredient line is missing id"))
            .and_then(parse_number)?;
        let amount = line
            .get("amount")
            .ok_or_else(|| TypeError::new("Ingredient line is missing amount"))
            .and_then(parse_number)?;

        Ok(Self { id, amount })
    }
}

/// The whole declared state of a recipe. Used for both create and update; an update replaces
/// every field, tag and ingredient line with what the draft declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub image: Option<String>,
    pub tags: Vec<Id>,
    pub ingredients: Vec<IngredientLine>,
}

impl TryFrom<&Form> for RecipeDraft {
    type Error = TypeError;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        let tags = match form.get_optional_list("tags")? {
            Some(tags) => tags.iter().map(parse_number).collect::<Result<_, _>>()?,
            None => vec![],
        };
        let ingredients = form
            .get_list("ingredients")?
            .iter()
            .map(IngredientLine::try_from)
            .collect::<Result<_, _>>()?;

        Ok(Self {
            name: form.get_str("name")?,
            text: form.get_str("text")?,
            cooking_time: form.get_number("cooking_time")?,
            image: form.get_optional_str("image")?,
            tags,
            ingredients,
        })
    }
}

impl RecipeDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name_length = self.name.trim().chars().count();
        if name_length == 0 || name_length > RECIPE_NAME_MAX_LENGTH {
            return Err(ValidationError::Name {
                max: RECIPE_NAME_MAX_LENGTH,
            });
        }

        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        if !(COOKING_TIME_MIN..=COOKING_TIME_MAX).contains(&self.cooking_time) {
            return Err(ValidationError::CookingTime {
                value: self.cooking_time,
                min: COOKING_TIME_MIN,
                max: COOKING_TIME_MAX,
            });
        }

        if self.ingredients.is_empty() {
            return Err(ValidationError::NoIngredients);
        }

        let mut seen = HashSet::new();
        for line in &self.ingredients {
            if !seen.insert(line.id) {
                return Err(ValidationError::DuplicateIngredient(line.id));
            }
            if !(INGREDIENT_AMOUNT_MIN..=INGREDIENT_AMOUNT_MAX).contains(&line.amount) {
                return Err(ValidationError::Amount {
                    ingredient_id: line.id,
                    value: line.amount,
                    min: INGREDIENT_AMOUNT_MIN,
                    max: INGREDIENT_AMOUNT_MAX,
                });
            }
        }

        Ok(())
    }

    /// Tag ids in request order with repeats collapsed.
    pub fn tag_ids(&self) -> Vec<Id> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{MeasurementUnit, ToggleMethod};

    fn draft() -> RecipeDraft {
        RecipeDraft {
            name: String::from("Pancakes"),
            text: String::from("Mix and fry."),
            cooking_time: 20,
            image: None,
            tags: vec![1],
            ingredients: vec![
                IngredientLine { id: 1, amount: 200 },
                IngredientLine { id: 2, amount: 2 },
            ],
        }
    }

    fn form(value: Value) -> Form {
        Form::from_data(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn parses_payload_with_numeric_strings() {
        let form = form(json!({
            "name": "Pancakes",
            "text": "Mix and fry.",
            "cooking_time": "20",
            "tags": [1, "1"],
            "ingredients": [{ "id": 1, "amount": "200" }, { "id": "2", "amount": 2 }],
        }));

        let parsed = RecipeDraft::try_from(&form).unwrap();

        assert_eq!(parsed.cooking_time, 20);
        assert_eq!(parsed.image, None);
        assert_eq!(parsed.tag_ids(), vec![1]);
        assert_eq!(parsed.ingredients, draft().ingredients);
    }

    #[test]
    fn absent_or_null_tags_mean_no_tags() {
        for tags in [None, Some(Value::Null)] {
            let mut payload = json!({
                "name": "Pancakes",
                "text": "Mix and fry.",
                "cooking_time": 20,
                "ingredients": [{ "id": 1, "amount": 200 }],
            });
            if let Some(tags) = tags {
                payload["tags"] = tags;
            }

            let parsed = RecipeDraft::try_from(&form(payload)).unwrap();
            assert!(parsed.tags.is_empty());
        }
    }

    #[test]
    fn malformed_tags_are_a_type_error() {
        let form = form(json!({
            "name": "Pancakes",
            "text": "Mix and fry.",
            "cooking_time": 20,
            "tags": "1,2",
            "ingredients": [{ "id": 1, "amount": 200 }],
        }));

        assert!(RecipeDraft::try_from(&form).is_err());
    }

    #[test]
    fn get_value_converts_through_try_from() {
        let form = form(json!({ "method": "delete", "unit": "kg", "count": 3 }));

        assert_eq!(form.get_value::<ToggleMethod>("method"), Ok(ToggleMethod::Remove));
        assert_eq!(
            form.get_value::<MeasurementUnit>("unit"),
            Ok(MeasurementUnit::Kilogram)
        );
        assert!(form.get_value::<MeasurementUnit>("count").is_err());
        assert!(form.get_value::<ToggleMethod>("missing").is_err());
    }

    #[test]
    fn missing_ingredients_is_a_type_error() {
        let form = form(json!({ "name": "x", "text": "y", "cooking_time": 1 }));

        assert!(RecipeDraft::try_from(&form).is_err());
    }

    #[test]
    fn valid_draft_passes() {
        assert_eq!(draft().validate(), Ok(()));
    }

    #[test]
    fn duplicate_ingredient_is_rejected_not_merged() {
        let mut draft = draft();
        draft.ingredients.push(IngredientLine { id: 1, amount: 5 });

        assert_eq!(
            draft.validate(),
            Err(ValidationError::DuplicateIngredient(1))
        );
    }

    #[test]
    fn amount_below_one_is_rejected() {
        let mut draft = draft();
        draft.ingredients[1].amount = 0;

        assert!(matches!(
            draft.validate(),
            Err(ValidationError::Amount { ingredient_id: 2, value: 0, .. })
        ));
    }

    #[test]
    fn amount_above_the_limit_is_rejected() {
        let mut draft = draft();

        draft.ingredients[0].amount = INGREDIENT_AMOUNT_MAX;
        assert_eq!(draft.validate(), Ok(()));

        draft.ingredients[0].amount = INGREDIENT_AMOUNT_MAX + 1;
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::Amount { ingredient_id: 1, .. })
        ));
    }

    #[test]
    fn cooking_time_bounds() {
        let mut draft = draft();

        draft.cooking_time = 0;
        assert!(matches!(draft.validate(), Err(ValidationError::CookingTime { .. })));

        draft.cooking_time = COOKING_TIME_MAX + 1;
        assert!(matches!(draft.validate(), Err(ValidationError::CookingTime { .. })));

        draft.cooking_time = COOKING_TIME_MAX;
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn empty_ingredient_list_is_rejected() {
        let mut draft = draft();
        draft.ingredients.clear();

        assert_eq!(draft.validate(), Err(ValidationError::NoIngredients));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut draft = draft();
        draft.name = String::from("   ");

        assert!(matches!(draft.validate(), Err(ValidationError::Name { .. })));
    }
}
