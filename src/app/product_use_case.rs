use crate::app::ports::{ObjectStore, PresignedUpload};
use crate::domain::{
    Inspection, InspectionStatus, Member, MemberRole, Product, ProductCategory, ProductCondition,
    ProductImage,
};
use crate::error::{DomainError, Result};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Product registration, the inspection workflow and image handling.
pub struct ProductUseCase {
    storage: Arc<dyn Storage>,
    objects: Arc<dyn ObjectStore>,
}

impl ProductUseCase {
    pub fn new(storage: Arc<dyn Storage>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { storage, objects }
    }

    /// Shared handle for read layers that resolve image URLs themselves.
    pub fn objects_handle(&self) -> Arc<dyn ObjectStore> {
        self.objects.clone()
    }

    pub async fn create(
        &self,
        seller: &Member,
        name: &str,
        description: &str,
        category: ProductCategory,
        condition: ProductCondition,
    ) -> Result<Product> {
        require_seller(seller)?;
        if name.trim().is_empty() {
            return Err(DomainError::InvalidInput("product name must not be blank".into()).into());
        }

        let mut product = Product::new(
            seller.id.ok_or(DomainError::MemberNotFound)?,
            name,
            description,
            category,
            condition,
        );
        self.storage.create_product(&mut product).await?;
        Ok(product)
    }

    pub async fn get(&self, id: Uuid) -> Result<Product> {
        self.storage
            .get_product(id)
            .await?
            .ok_or_else(|| DomainError::ProductNotFound.into())
    }

    /// Update name/description while the product is still awaiting
    /// inspection; a decided product is immutable.
    pub async fn update(
        &self,
        owner: &Member,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Product> {
        let mut product = self.owned(owner, id).await?;
        if product.inspection_status != InspectionStatus::Pending {
            return Err(DomainError::InspectionAlreadyDecided.into());
        }

        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(DomainError::InvalidInput("product name must not be blank".into()).into());
            }
            product.name = name;
        }
        if let Some(description) = description {
            product.description = description;
        }
        self.storage.update_product(&product).await?;
        Ok(product)
    }

    pub async fn delete(&self, owner: &Member, id: Uuid) -> Result<()> {
        let product = self.owned(owner, id).await?;
        if product.inspection_status != InspectionStatus::Pending {
            return Err(DomainError::InspectionAlreadyDecided.into());
        }
        self.storage.delete_product(id).await
    }

    pub async fn list_awaiting_inspection(&self) -> Result<Vec<Product>> {
        self.storage
            .list_products_by_inspection(InspectionStatus::Pending)
            .await
    }

    /// Record an inspector's verdict; moves the product out of Pending.
    pub async fn record_inspection(
        &self,
        inspector: &Member,
        product_id: Uuid,
        approved: bool,
        comment: Option<String>,
    ) -> Result<Inspection> {
        if inspector.role != MemberRole::Admin {
            return Err(DomainError::Forbidden.into());
        }

        let mut product = self.get(product_id).await?;
        product.apply_verdict(approved)?;
        self.storage.update_product(&product).await?;

        let mut inspection = Inspection::new(product_id, approved, comment);
        self.storage.create_inspection(&mut inspection).await?;

        info!(
            "inspection recorded for product {}: {}",
            product_id,
            if approved { "approved" } else { "rejected" }
        );
        Ok(inspection)
    }

    /// Hand the owner an upload target for a new image of their product.
    pub async fn presign_image(
        &self,
        owner: &Member,
        product_id: Uuid,
        filename: &str,
        content_type: &str,
    ) -> Result<PresignedUpload> {
        self.owned(owner, product_id).await?;
        let key = image_key(product_id, filename);
        self.objects.presign_upload(&key, content_type).await
    }

    /// Store image bytes server-side and attach the row in one step.
    pub async fn upload_image(
        &self,
        owner: &Member,
        product_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ProductImage> {
        self.owned(owner, product_id).await?;
        let key = image_key(product_id, filename);
        self.objects.put(&key, bytes).await?;
        self.attach_image(owner, product_id, &key).await
    }

    /// Attach an already-uploaded object key to the product.
    pub async fn attach_image(
        &self,
        owner: &Member,
        product_id: Uuid,
        object_key: &str,
    ) -> Result<ProductImage> {
        self.owned(owner, product_id).await?;
        let existing = self.storage.list_product_images(product_id).await?;
        let mut image = ProductImage::new(product_id, object_key, existing.len() as u32);
        self.storage.create_product_image(&mut image).await?;
        Ok(image)
    }

    /// Images of a product with their public URLs, in sort order.
    pub async fn image_urls(&self, product_id: Uuid) -> Result<Vec<String>> {
        let images = self.storage.list_product_images(product_id).await?;
        Ok(images
            .iter()
            .map(|i| self.objects.public_url(&i.object_key))
            .collect())
    }

    async fn owned(&self, member: &Member, product_id: Uuid) -> Result<Product> {
        let product = self.get(product_id).await?;
        if Some(product.seller_id) != member.id {
            return Err(DomainError::NotProductOwner.into());
        }
        Ok(product)
    }
}

fn require_seller(member: &Member) -> Result<()> {
    match member.role {
        MemberRole::Seller | MemberRole::Admin => Ok(()),
        MemberRole::User => Err(DomainError::SellerRoleRequired.into()),
    }
}

fn image_key(product_id: Uuid, filename: &str) -> String {
    format!("products/{}/{}-{}", product_id, Uuid::new_v4().simple(), filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::object_store_fs::FsObjectStore;
    use crate::storage::InMemoryStorage;

    struct Fixture {
        products: ProductUseCase,
        seller: Member,
        admin: Member,
        buyer: Member,
        _dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let storage = Arc::new(InMemoryStorage::new());
        let dir = tempfile::tempdir().unwrap();
        let objects = Arc::new(FsObjectStore::new(dir.path(), "http://localhost:8080/objects"));

        let mut seller = Member::new("seller");
        seller.promote_to_seller();
        storage.create_member(&mut seller).await.unwrap();

        let mut admin = Member::new("inspector");
        admin.role = MemberRole::Admin;
        storage.create_member(&mut admin).await.unwrap();

        let mut buyer = Member::new("buyer");
        storage.create_member(&mut buyer).await.unwrap();

        Fixture {
            products: ProductUseCase::new(storage, objects),
            seller,
            admin,
            buyer,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn only_sellers_register_products() {
        let f = fixture().await;
        let err = f
            .products
            .create(
                &f.buyer,
                "MG Freedom",
                "unopened",
                ProductCategory::ModelKit,
                ProductCondition::Misb,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::PlatformError::Domain(DomainError::SellerRoleRequired)
        ));
    }

    #[tokio::test]
    async fn inspection_approves_and_locks_the_product() {
        let f = fixture().await;
        let product = f
            .products
            .create(
                &f.seller,
                "MG Freedom",
                "unopened",
                ProductCategory::ModelKit,
                ProductCondition::Misb,
            )
            .await
            .unwrap();
        let id = product.id.unwrap();

        f.products
            .record_inspection(&f.admin, id, true, Some("seal intact".into()))
            .await
            .unwrap();

        let approved = f.products.get(id).await.unwrap();
        assert!(approved.is_approved());

        // Decided products cannot be edited or deleted
        let err = f
            .products
            .update(&f.seller, id, Some("renamed".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::PlatformError::Domain(DomainError::InspectionAlreadyDecided)
        ));
    }

    #[tokio::test]
    async fn inspection_requires_admin() {
        let f = fixture().await;
        let product = f
            .products
            .create(
                &f.seller,
                "MG Freedom",
                "unopened",
                ProductCategory::ModelKit,
                ProductCondition::Misb,
            )
            .await
            .unwrap();

        let err = f
            .products
            .record_inspection(&f.seller, product.id.unwrap(), true, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::PlatformError::Domain(DomainError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn images_upload_and_resolve_in_order() {
        let f = fixture().await;
        let product = f
            .products
            .create(
                &f.seller,
                "MG Freedom",
                "unopened",
                ProductCategory::ModelKit,
                ProductCondition::Misb,
            )
            .await
            .unwrap();
        let id = product.id.unwrap();

        f.products
            .upload_image(&f.seller, id, "front.jpg", b"front")
            .await
            .unwrap();
        f.products
            .upload_image(&f.seller, id, "back.jpg", b"back")
            .await
            .unwrap();

        let urls = f.products.image_urls(id).await.unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("front.jpg"));
        assert!(urls[1].contains("back.jpg"));

        // Not the owner: no uploads, no presigns
        let err = f
            .products
            .presign_image(&f.buyer, id, "x.jpg", "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::PlatformError::Domain(DomainError::NotProductOwner)
        ));
    }
}
