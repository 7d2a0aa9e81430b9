//! # deckgen - Budget-Constrained Commander Deck Generator
//!
//! deckgen builds a 99-card Commander deck around a chosen commander from a
//! card catalog, keeping to the commander's color identity and a total price
//! ceiling.
//!
//! ## Core Concepts
//!
//! - **ColorIdentity**: the colors a commander allows, parsed leniently from storage
//! - **Category**: a deck role (ramp, card draw, removal, ...) with a quota
//! - **CardRepository**: the catalog the generator samples from
//! - **DeckAssembler**: lands first, then categories, within budget
//! - **DeckService**: assembly plus enhancement and catalog lookups
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use deckgen::{CardId, DeckConstraints, DeckService, InMemoryCardRepository};
//!
//! let repo = Arc::new(InMemoryCardRepository::new()?);
//! // ... load cards ...
//! let service = DeckService::new(repo);
//! let deck = service.generate_deck(&CardId::new("commander-id"), &DeckConstraints::new(150.0))?;
//! println!("{} cards, ${:.2}", deck.card_count(), deck.total_price);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod card;
pub mod category;
pub mod color;
pub mod config;
pub mod deck;
pub mod error;

// Storage and assembly
pub mod engine;
pub mod enhance;
pub mod land;
pub mod selector;
pub mod service;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use card::{Card, CardId, CardRecord, Commander};
pub use category::{CardClassifier, Category, ClassifierRegistry, PatternClassifier};
pub use color::{Color, ColorIdentity};
pub use config::{AllocationConfig, CategoryQuota};
pub use deck::{Deck, DeckAnalysis, DeckConstraints, DeckId, DEFAULT_MAX_PRICE};
pub use engine::runtime::{BuildHandle, DeckRuntime, DeckRuntimeConfig};
pub use engine::DeckAssembler;
pub use enhance::{BasicEnhancer, DeckEnhancer};
pub use error::{DeckError, DeckResult, ExecutionError, ValidationError};
pub use land::{basic_land_counts, BasicLand, BasicLandPlan};
pub use selector::CategoryFill;
pub use service::DeckService;
pub use storage::{CardQuery, CardRepository, CommanderFilter, InMemoryCardRepository, RepositoryError};
