use crate::domain::AuctionStatus;
use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{Auction, Bid, Product};
use async_graphql::{Context, FieldResult, Object, ID};
use uuid::Uuid;

/// Root query object for GraphQL
pub struct Query;

fn parse_status(status: &str) -> Option<AuctionStatus> {
    match status {
        "SCHEDULED" => Some(AuctionStatus::Scheduled),
        "IN_PROGRESS" => Some(AuctionStatus::InProgress),
        "ENDED" => Some(AuctionStatus::Ended),
        _ => None,
    }
}

#[Object]
impl Query {
    /// Get an auction by ID
    async fn auction(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<Auction>> {
        let context = ctx.data::<GraphQLContext>()?;
        let auction_id = Uuid::parse_str(&id)?;

        match context.storage.get_auction(auction_id).await {
            Ok(auction) => Ok(auction.map(|a| a.into())),
            Err(e) => Err(e.into()),
        }
    }

    /// List auctions, optionally filtered by status, soonest-ending first
    async fn auctions(
        &self,
        ctx: &Context<'_>,
        status: Option<String>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> FieldResult<Vec<Auction>> {
        let context = ctx.data::<GraphQLContext>()?;

        let status = match status.as_deref() {
            Some(s) => match parse_status(s) {
                Some(parsed) => Some(parsed),
                None => {
                    return Err(async_graphql::Error::new(format!(
                        "unknown auction status '{s}'"
                    )))
                }
            },
            None => None,
        };
        let limit = limit.map(|l| l as usize);
        let offset = offset.map(|o| o as usize);

        match context.storage.list_auctions(status, limit, offset).await {
            Ok(auctions) => Ok(auctions.into_iter().map(|a| a.into()).collect()),
            Err(e) => Err(e.into()),
        }
    }

    /// Bid history of an auction, oldest first
    async fn bids(&self, ctx: &Context<'_>, auction_id: ID) -> FieldResult<Vec<Bid>> {
        let context = ctx.data::<GraphQLContext>()?;
        let auction_id = Uuid::parse_str(&auction_id)?;

        match context.storage.list_bids(auction_id).await {
            Ok(bids) => Ok(bids.into_iter().map(|b| b.into()).collect()),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a product by ID
    async fn product(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<Product>> {
        let context = ctx.data::<GraphQLContext>()?;
        let product_id = Uuid::parse_str(&id)?;

        match context.storage.get_product(product_id).await {
            Ok(product) => Ok(product.map(|p| p.into())),
            Err(e) => Err(e.into()),
        }
    }

    /// List products with optional pagination
    async fn products(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> FieldResult<Vec<Product>> {
        let context = ctx.data::<GraphQLContext>()?;

        let limit = limit.map(|l| l as usize);
        let offset = offset.map(|o| o as usize);

        match context.storage.list_products(limit, offset).await {
            Ok(products) => Ok(products.into_iter().map(|p| p.into()).collect()),
            Err(e) => Err(e.into()),
        }
    }
}
