#![doc = "sticker-sync-core: core logic library for sticker-sync."]

//! This crate contains the data model, client contracts and pipeline stages
//! for synchronising a Notion sticker database into a stickertrade profile.
//! Concrete HTTP clients live in the `sticker-sync` binary crate.
//!
//! # Usage
//! Implement the traits in [`contract`] (or use the generated mocks), build a
//! [`config::SyncConfig`] and hand both to [`synchronise::synchronise`].

pub mod catalog;
pub mod config;
pub mod contract;
pub mod error;
pub mod fetch;
pub mod synchronise;
pub mod upload;
pub mod validate;
