//! Catalog Store
//!
//! Product CRUD and listing. Mutations are admin-gated; the review list
//! and its cached aggregate are owned by [`reviews`] and never writable
//! through the catalog payloads.

pub mod reviews;

pub use reviews::{ReviewInput, ReviewService};

use crate::auth::{Identity, require_admin};
use crate::db::models::{ListQuery, Product, ProductCreate, ProductPage, ProductUpdate};
use crate::db::repository::ProductRepository;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_URL_LEN, validate_count, validate_optional_text,
    validate_price, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Products per page when the caller does not say
const DEFAULT_PAGE_SIZE: u64 = 12;

/// Default carousel size for top-rated products
const DEFAULT_TOP_COUNT: i64 = 3;

#[derive(Clone)]
pub struct CatalogService {
    products: ProductRepository,
}

impl CatalogService {
    pub fn new(products: ProductRepository) -> Self {
        Self { products }
    }

    /// Fetch one product
    pub async fn get_product(&self, id: &str) -> AppResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))
    }

    /// Paginated listing with optional case-insensitive keyword match on
    /// name and optional category filter. Ordering is stable: newest
    /// first, ties broken by id.
    pub async fn list_products(&self, mut query: ListQuery) -> AppResult<ProductPage> {
        if query.page == 0 {
            query.page = 1;
        }
        if query.page_size == 0 {
            query.page_size = DEFAULT_PAGE_SIZE;
        }
        let (products, total) = self.products.list(&query).await?;
        Ok(ProductPage {
            products,
            total,
            page: query.page,
            pages: total.div_ceil(query.page_size),
        })
    }

    /// Highest-rated products for the storefront carousel
    pub async fn top_products(&self, limit: Option<i64>) -> AppResult<Vec<Product>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_COUNT).clamp(1, 20);
        Ok(self.products.top_rated(limit).await?)
    }

    /// Create a product (admin only)
    pub async fn create_product(
        &self,
        actor: &Identity,
        data: ProductCreate,
    ) -> AppResult<Product> {
        require_admin(actor)?;
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_price(data.price, "price")?;
        validate_count(data.count_in_stock.unwrap_or(0), "count_in_stock")?;
        if data.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::validation("description is too long"));
        }
        if let Some(image) = &data.image
            && image.url.len() > MAX_URL_LEN
        {
            return Err(AppError::validation("image url is too long"));
        }

        let product = self.products.create(data).await?;
        tracing::info!(
            product = %product.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            by = %actor.user_id,
            "Product created"
        );
        Ok(product)
    }

    /// Update catalog fields of a product (admin only)
    pub async fn update_product(
        &self,
        actor: &Identity,
        id: &str,
        data: ProductUpdate,
    ) -> AppResult<Product> {
        require_admin(actor)?;
        validate_optional_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.brand, "brand", MAX_NAME_LEN)?;
        validate_optional_text(&data.category, "category", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;
        if let Some(price) = data.price {
            validate_price(price, "price")?;
        }
        if let Some(count) = data.count_in_stock {
            validate_count(count, "count_in_stock")?;
        }
        if let Some(name) = &data.name
            && name.trim().is_empty()
        {
            return Err(AppError::validation("name must not be empty"));
        }

        Ok(self.products.update(id, data).await?)
    }

    /// Delete a product (admin only)
    pub async fn delete_product(&self, actor: &Identity, id: &str) -> AppResult<()> {
        require_admin(actor)?;
        self.products.delete(id).await?;
        tracing::info!(product = %id, by = %actor.user_id, "Product deleted");
        Ok(())
    }
}
