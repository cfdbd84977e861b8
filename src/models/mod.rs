// src/models/mod.rs

//! Data structures representing database entities and cart payloads.

pub mod cart_item;
pub mod farmer;
pub mod order;
pub mod order_item;
pub mod product;
pub mod wallet;

// Re-export the model structs for convenient access
pub use cart_item::{CartLine, PriceField, RawCartItem};
pub use farmer::Farmer;
pub use order::{Order, OrderStatus};
pub use order_item::OrderItem;
pub use product::{Product, ProductWithFarmer};
pub use wallet::{TransactionStatus, TransactionType, Wallet, WalletTransaction};
