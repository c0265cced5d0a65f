pub mod auction;
pub mod product;

pub use auction::{Auction, Bid};
pub use product::Product;
