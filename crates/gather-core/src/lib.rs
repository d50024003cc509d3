//! # gather-core
//!
//! Foundation types for the Gather client event-state engine.
//!
//! This crate provides the shared vocabulary the other Gather crates depend on:
//!
//! - **Records**: [`record::EventRecord`], the canonical cached shape of one
//!   event, plus [`record::Permissions`], [`record::Pricing`], and the
//!   [`record::FilterPreset`] query vocabulary
//! - **Wire shapes**: [`wire::RawEvent`], [`wire::FeedPage`],
//!   [`wire::AttendResponse`] — the duck-typed JSON the server actually sends
//! - **Normalization**: [`normalize::normalize_event`], the single boundary
//!   where raw server objects become canonical records
//! - **Push updates**: [`push::PushUpdate`], the discriminated incremental
//!   update ingested by the store without a network call
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `gather-api` and `gather-store`.

#![deny(unsafe_code)]

pub mod normalize;
pub mod push;
pub mod record;
pub mod wire;
