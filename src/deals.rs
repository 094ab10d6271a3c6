//! Deal book: the demo item source.
//!
//! A [`DealBook`] holds a product catalog, the products currently listed for sale and
//! the open contracts of the player and their dealers. Each snapshot sums the open
//! quantities per product and turns them into one formatted list row per product.
//! [`MarketSimulator`] mutates a book between ticks so the demo has something to show.

pub mod book;
pub mod market;
pub mod product;

pub use book::{Contract, DealBook};
pub use market::{MarketEvent, MarketSimulator};
pub use product::{DealLine, Product, MUTED_COLOR};
