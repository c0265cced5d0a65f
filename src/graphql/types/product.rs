use crate::domain::{
    InspectionStatus, Product as DomainProduct, ProductCategory, ProductCondition,
};
use crate::graphql::schema::GraphQLContext;
use async_graphql::{Context, FieldResult, Object, ID};

/// GraphQL representation of a Product
#[derive(Clone)]
pub struct Product {
    pub inner: DomainProduct,
}

impl From<DomainProduct> for Product {
    fn from(product: DomainProduct) -> Self {
        Self { inner: product }
    }
}

pub fn category_name(category: ProductCategory) -> &'static str {
    match category {
        ProductCategory::Figure => "FIGURE",
        ProductCategory::ModelKit => "MODEL_KIT",
        ProductCategory::TradingCard => "TRADING_CARD",
        ProductCategory::Plush => "PLUSH",
        ProductCategory::Game => "GAME",
        ProductCategory::Etc => "ETC",
    }
}

pub fn condition_name(condition: ProductCondition) -> &'static str {
    match condition {
        ProductCondition::Misb => "MISB",
        ProductCondition::Nisb => "NISB",
        ProductCondition::Misp => "MISP",
        ProductCondition::Used => "USED",
    }
}

pub fn inspection_name(status: InspectionStatus) -> &'static str {
    match status {
        InspectionStatus::Pending => "PENDING",
        InspectionStatus::Approved => "APPROVED",
        InspectionStatus::Rejected => "REJECTED",
    }
}

#[Object]
impl Product {
    /// The unique identifier for the product
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    /// The name of the product
    async fn name(&self) -> &str {
        &self.inner.name
    }

    /// Seller-provided description
    async fn description(&self) -> &str {
        &self.inner.description
    }

    async fn category(&self) -> &str {
        category_name(self.inner.category)
    }

    /// Collector condition grade
    async fn condition(&self) -> &str {
        condition_name(self.inner.condition)
    }

    /// Where the product is in the inspection workflow
    async fn inspection_status(&self) -> &str {
        inspection_name(self.inner.inspection_status)
    }

    /// Public URLs of the product's images, in display order
    async fn image_urls(&self, ctx: &Context<'_>) -> FieldResult<Vec<String>> {
        let context = ctx.data::<GraphQLContext>()?;
        let product_id = match self.inner.id {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };
        let images = context.storage.list_product_images(product_id).await?;
        Ok(images
            .iter()
            .map(|i| context.objects.public_url(&i.object_key))
            .collect())
    }

    async fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.created_at
    }
}
