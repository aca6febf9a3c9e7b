//! Marketplace records: accounts and listings.

pub mod product;
pub mod user;

pub use product::{
    NewProduct, Product, ProductPatch, ProductQuery, ProductStatus, ALL_CATEGORIES,
    PLACEHOLDER_IMAGE_URL,
};
pub use user::{validate_mobile, ProfileCascade, User, DEFAULT_INSTITUTE, MOBILE_DIGITS};
