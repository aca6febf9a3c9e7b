use crate::domain::{MarketError, MarketResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Image URL used when a listing is posted without a photo.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300";

/// Category filter value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Sold,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Sold => "sold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProductStatus::Active),
            "sold" => Some(ProductStatus::Sold),
            _ => None,
        }
    }
}

/// A listing as stored and as sent over the wire.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub contact_phone: String,
    pub image_url: String,
    pub seller_name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProductStatus,
    /// Creation timestamp; listings sort newest-first on it.
    pub date: DateTime<Utc>,
}

/// Validated input for a new listing (image already resolved to a URL).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub contact_phone: String,
    pub seller_name: String,
    pub image_url: String,
}

impl NewProduct {
    pub fn validate(&self) -> MarketResult<()> {
        super::user::require_field("name", &self.name)?;
        super::user::require_field("category", &self.category)?;
        super::user::require_field("sellerName", &self.seller_name)?;
        validate_price(self.price)
    }

    /// Materializes the listing as an active product stamped with the current time.
    pub fn into_product(self) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: self.name,
            price: self.price,
            category: self.category,
            contact_phone: self.contact_phone,
            image_url: self.image_url,
            seller_name: self.seller_name,
            description: self.description,
            status: ProductStatus::Active,
            date: Utc::now(),
        }
    }
}

/// Partial edit of the mutable listing fields. Absent fields are untouched.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_price"
    )]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductPatch {
    pub fn validate(&self) -> MarketResult<()> {
        if let Some(name) = &self.name {
            super::user::require_field("name", name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
    }
}

/// Filters for the public feed.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    search: Option<String>,
    category: Option<String>,
}

impl ProductQuery {
    /// Empty values and the exact `"All"` category collapse to "no filter".
    /// Values are used as given; padded input is not trimmed.
    pub fn new(search: Option<&str>, category: Option<&str>) -> Self {
        let search = search.filter(|s| !s.is_empty()).map(str::to_string);
        let category = category
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);
        Self { search, category }
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Literal, case-insensitive match on name plus exact category match.
    /// Does not look at status; callers restrict to active listings.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search {
            if !product.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        match &self.category {
            Some(category) => product.category == *category,
            None => true,
        }
    }
}

pub fn validate_price(price: f64) -> MarketResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(MarketError::validation("price must be a non-negative number"));
    }
    Ok(())
}

/// Parses a price that may arrive as a JSON number or a numeric string
/// (HTML form inputs submit strings).
pub fn parse_price(raw: &str) -> MarketResult<f64> {
    let price = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| MarketError::validation(format!("invalid price: {}", raw)))?;
    validate_price(price)?;
    Ok(price)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceInput {
    Number(f64),
    Text(String),
}

fn deserialize_optional_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<PriceInput>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PriceInput::Number(n)) => Ok(Some(n)),
        Some(PriceInput::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(PriceInput::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid price: {}", s))),
    }
}
