//! # Board Shared
//! This crate defines shared data structures and types used across the board ecosystem.
//! It includes common definitions for votable targets, pseudo-identities, edit tokens,
//! posts, comments, reports and the public projections returned to clients.
pub mod types;
