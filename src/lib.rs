//! AdBridge - A campaign endorsement platform
//!
//! Advertisers publish campaigns, publishers apply and submit videos,
//! and each video passes a two-stage review (SP team, then advertiser)
//! before it counts as endorsed. Layers from the bottom up: [`models`],
//! [`db`], [`services`], [`api`].

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
