//! Request payloads, validated before they reach the database.

use entity::{ingredient::StockLevel, recipe::RecipeStatus};
use serde::{Deserialize, Deserializer, de::DeserializeOwned, de::value::StringDeserializer};

use crate::{ServiceError, ServiceResult};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Highest page whose row offset still fits a signed 64-bit SQL `OFFSET`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

/// One `{ingredient, quantity}` pair of a recipe's ingredient list.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct IngredientLine {
    pub ingredient: i32,
    pub quantity: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    pub name: String,
    pub category: String,
    pub servings: i32,
    pub prep_time: i32,
    pub cook_time: i32,
    pub instructions: String,
    pub price: f64,
    #[serde(default)]
    pub status: RecipeStatus,
    /// `None` keeps the current links on update; `Some(vec![])` removes them all.
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientLine>>,
    /// Version the client last read. Only checked on update.
    #[serde(default)]
    pub version: Option<i32>,
}

impl RecipeInput {
    pub fn validate(&self) -> ServiceResult<()> {
        non_empty("name", &self.name)?;
        non_empty("category", &self.category)?;
        non_empty("instructions", &self.instructions)?;
        if self.servings < 1 {
            return Err(invalid("servings must be at least 1"));
        }
        if self.prep_time < 0 {
            return Err(invalid("prepTime must not be negative"));
        }
        if self.cook_time < 0 {
            return Err(invalid("cookTime must not be negative"));
        }
        non_negative("price", self.price)?;
        for (index, line) in self.ingredients.iter().flatten().enumerate() {
            if !line.quantity.is_finite() || line.quantity < 0.0 {
                return Err(ServiceError::Validation(format!(
                    "ingredients[{index}].quantity must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientInput {
    pub name: String,
    pub unit: String,
    pub category: String,
    pub supplier: String,
    pub current_stock: f64,
    pub min_level: f64,
    pub max_level: f64,
    pub cost_per_unit: f64,
}

impl IngredientInput {
    pub fn validate(&self) -> ServiceResult<()> {
        non_empty("name", &self.name)?;
        non_empty("unit", &self.unit)?;
        non_empty("category", &self.category)?;
        non_empty("supplier", &self.supplier)?;
        non_negative("currentStock", self.current_stock)?;
        non_negative("minLevel", self.min_level)?;
        non_negative("maxLevel", self.max_level)?;
        non_negative("costPerUnit", self.cost_per_unit)?;
        if self.min_level > self.max_level {
            return Err(invalid("minLevel must not exceed maxLevel"));
        }
        Ok(())
    }
}

/// Signed change to an ingredient's `current_stock`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StockAdjustment {
    pub delta: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RecipeFilter {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<RecipeStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl RecipeFilter {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.page() > MAX_PAGE {
            return Err(ServiceError::Validation(format!(
                "page must not exceed {MAX_PAGE}"
            )));
        }
        Ok(())
    }

    /// 1-based
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct IngredientFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub stock: Option<StockLevel>,
}

/// Query strings send `?status=` for "any"; treat blank values as absent.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => {
            T::deserialize(StringDeserializer::<D::Error>::new(value.trim().to_owned())).map(Some)
        }
        _ => Ok(None),
    }
}

fn invalid(message: &str) -> ServiceError {
    ServiceError::Validation(message.to_owned())
}

fn non_empty(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        Err(ServiceError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

fn non_negative(field: &str, value: f64) -> ServiceResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "{field} must be a non-negative number"
        )))
    }
}
