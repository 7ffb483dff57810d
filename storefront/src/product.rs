//! Catalog products with embedded reviews and derived pricing.
//!
//! `final_price` and the review aggregates (`rating`, `num_reviews`) are pure
//! functions of the rest of the document. They are cached on the product for
//! querying but recomputed by [`Product::recompute_derived`] before every
//! persistence, never trusted as independently authoritative.

use crate::errors::{ServiceError, ServiceResult};
use crate::types::{
    Brand, DiscountPercent, ImageId, Money, ProductDescription, ProductId, ProductName, Rating,
    ReviewComment, ReviewId, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Closed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Mobile phones
    Mobiles,
    /// Laptops and notebooks
    Laptops,
    /// Tablets
    Tablets,
    /// Headphones and earphones
    Headphones,
    /// Speakers
    Speakers,
    /// Smartwatches and bands
    Smartwatches,
    /// Cameras
    Cameras,
    /// Gaming consoles and accessories
    Gaming,
    /// General accessories
    Accessories,
    /// Everything else
    Other,
}

impl Category {
    /// All known categories, in display order.
    pub const ALL: [Self; 10] = [
        Self::Mobiles,
        Self::Laptops,
        Self::Tablets,
        Self::Headphones,
        Self::Speakers,
        Self::Smartwatches,
        Self::Cameras,
        Self::Gaming,
        Self::Accessories,
        Self::Other,
    ];
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Mobiles => "Mobiles",
            Self::Laptops => "Laptops",
            Self::Tablets => "Tablets",
            Self::Headphones => "Headphones",
            Self::Speakers => "Speakers",
            Self::Smartwatches => "Smartwatches",
            Self::Cameras => "Cameras",
            Self::Gaming => "Gaming",
            Self::Accessories => "Accessories",
            Self::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// A hosted product image: the media host's stable reference plus its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Local identifier within the product document.
    pub id: ImageId,
    /// Stable reference at the media host, used for deletion.
    pub reference: String,
    /// Public URL.
    pub url: String,
}

/// A customer review embedded in a product document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Local identifier within the product document.
    pub id: ReviewId,
    /// Author account.
    pub user: UserId,
    /// Author display name, captured at submission time.
    pub author_name: String,
    /// Star rating, 1-5.
    pub rating: Rating,
    /// Free-text comment.
    pub comment: ReviewComment,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// A catalog product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Identity.
    pub id: ProductId,
    /// Display name.
    pub name: ProductName,
    /// Long description.
    pub description: ProductDescription,
    /// List price before discount.
    pub price: Money,
    /// Discount percentage applied to the list price.
    pub discount: DiscountPercent,
    /// Derived: `price - price * discount / 100`, rounded to the cent.
    pub final_price: Money,
    /// Category.
    pub category: Category,
    /// Brand.
    pub brand: Brand,
    /// Units in stock.
    pub stock: u32,
    /// Hosted images, at most [`Product::MAX_IMAGES`].
    pub images: Vec<ProductImage>,
    /// Free-form specification key/value pairs.
    pub specifications: BTreeMap<String, String>,
    /// Embedded reviews.
    pub reviews: Vec<Review>,
    /// Derived: arithmetic mean of review ratings, 0 with no reviews.
    pub rating: f64,
    /// Derived: number of reviews.
    pub num_reviews: u32,
    /// Shown on the featured shelf.
    pub featured: bool,
    /// Soft-delete / visibility flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a product's editable fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    /// Display name.
    pub name: ProductName,
    /// Long description.
    pub description: ProductDescription,
    /// List price.
    pub price: Money,
    /// Discount percentage.
    #[serde(default)]
    pub discount: DiscountPercent,
    /// Category.
    pub category: Category,
    /// Brand.
    pub brand: Brand,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Specification key/value pairs.
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    /// Featured shelf flag.
    #[serde(default)]
    pub featured: bool,
    /// Visibility flag; defaults to visible.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// Maximum number of hosted images per product.
    pub const MAX_IMAGES: usize = 5;

    /// Create a product from a draft. Derived fields are computed; images
    /// start empty and are attached through the media upload flow.
    pub fn create(draft: ProductDraft) -> Self {
        let now = Utc::now();
        let mut product = Self {
            id: ProductId::new(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            discount: draft.discount,
            final_price: Money::ZERO,
            category: draft.category,
            brand: draft.brand,
            stock: draft.stock,
            images: Vec::new(),
            specifications: draft.specifications,
            reviews: Vec::new(),
            rating: 0.0,
            num_reviews: 0,
            featured: draft.featured,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        product.recompute_derived();
        product
    }

    /// Overwrite the editable fields from a draft, keeping identity, images,
    /// reviews and timestamps.
    pub fn apply_draft(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.discount = draft.discount;
        self.category = draft.category;
        self.brand = draft.brand;
        self.stock = draft.stock;
        self.specifications = draft.specifications;
        self.featured = draft.featured;
        self.is_active = draft.is_active;
        self.recompute_derived();
    }

    /// Recompute every derived field from its inputs. Must run before each
    /// persistence of the document.
    pub fn recompute_derived(&mut self) {
        self.final_price = self.price.discounted_by(self.discount);
        if self.reviews.is_empty() {
            self.rating = 0.0;
            self.num_reviews = 0;
        } else {
            let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating.value())).sum();
            #[allow(clippy::cast_precision_loss)]
            {
                self.rating = f64::from(sum) / self.reviews.len() as f64;
            }
            #[allow(clippy::cast_possible_truncation)]
            {
                self.num_reviews = self.reviews.len() as u32;
            }
        }
        self.updated_at = Utc::now();
    }

    /// Append a review. One review per user per product.
    pub fn add_review(
        &mut self,
        user: UserId,
        author_name: String,
        rating: Rating,
        comment: ReviewComment,
    ) -> ServiceResult<ReviewId> {
        if self.reviews.iter().any(|r| r.user == user) {
            return Err(ServiceError::business("Product already reviewed"));
        }
        let review = Review {
            id: ReviewId::new(),
            user,
            author_name,
            rating,
            comment,
            created_at: Utc::now(),
        };
        let id = review.id;
        self.reviews.push(review);
        self.recompute_derived();
        Ok(id)
    }

    /// Remove a review by its local id, returning it if present.
    pub fn remove_review(&mut self, review_id: ReviewId) -> Option<Review> {
        let position = self.reviews.iter().position(|r| r.id == review_id)?;
        let review = self.reviews.remove(position);
        self.recompute_derived();
        Some(review)
    }

    /// First image URL, used for order line snapshots.
    pub fn primary_image_url(&self) -> String {
        self.images.first().map(|i| i.url.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: ProductName::try_new("Noise Buds Alpha").unwrap(),
            description: ProductDescription::try_new("Wireless earbuds with long battery life")
                .unwrap(),
            price: Money::new(dec!(100.00)).unwrap(),
            discount: DiscountPercent::new(25).unwrap(),
            category: Category::Headphones,
            brand: Brand::try_new("Noise").unwrap(),
            stock: 5,
            specifications: BTreeMap::new(),
            featured: false,
            is_active: true,
        }
    }

    #[test]
    fn final_price_is_recomputed_on_create_and_edit() {
        let mut product = Product::create(draft());
        assert_eq!(product.final_price.to_cents(), 7500);

        product.price = Money::new(dec!(80.00)).unwrap();
        product.discount = DiscountPercent::NONE;
        product.recompute_derived();
        assert_eq!(product.final_price.to_cents(), 8000);
    }

    #[test]
    fn rating_is_mean_of_reviews() {
        let mut product = Product::create(draft());
        assert_eq!(product.rating, 0.0);
        assert_eq!(product.num_reviews, 0);

        let alice = UserId::new();
        let bob = UserId::new();
        let comment = ReviewComment::try_new("Excellent sound quality").unwrap();

        let first = product
            .add_review(alice, "Alice".to_string(), Rating::new(4).unwrap(), comment.clone())
            .unwrap();
        product
            .add_review(bob, "Bob".to_string(), Rating::new(5).unwrap(), comment)
            .unwrap();

        assert!((product.rating - 4.5).abs() < f64::EPSILON);
        assert_eq!(product.num_reviews, 2);

        product.remove_review(first).unwrap();
        assert!((product.rating - 5.0).abs() < f64::EPSILON);
        assert_eq!(product.num_reviews, 1);
    }

    #[test]
    fn duplicate_review_is_rejected() {
        let mut product = Product::create(draft());
        let user = UserId::new();
        let comment = ReviewComment::try_new("Excellent sound quality").unwrap();

        product
            .add_review(user, "Alice".to_string(), Rating::new(4).unwrap(), comment.clone())
            .unwrap();
        let err = product
            .add_review(user, "Alice".to_string(), Rating::new(5).unwrap(), comment)
            .unwrap_err();
        assert_eq!(err, ServiceError::business("Product already reviewed"));
        assert_eq!(product.num_reviews, 1);
    }

    #[test]
    fn removing_unknown_review_is_a_no_op() {
        let mut product = Product::create(draft());
        assert!(product.remove_review(ReviewId::new()).is_none());
    }

    #[test]
    fn primary_image_defaults_to_empty() {
        let product = Product::create(draft());
        assert_eq!(product.primary_image_url(), "");
    }
}
