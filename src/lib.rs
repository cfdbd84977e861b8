// src/lib.rs

//! FarmBridge marketplace backend.
//!
//! Connects farmers listing crops with merchants buying them. The core is
//! the order placement and wallet settlement flow: price the cart, verify
//! the wallet covers it, then create the order, its line items and the
//! wallet debit as one transactional unit.

pub mod cart;
pub mod config;
pub mod errors;
pub mod models;
pub mod pricing;
pub mod services;
pub mod state;
pub mod web;
