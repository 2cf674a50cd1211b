#![doc = "solid-context-core: core pipeline library for solid-context."]

//! This crate turns SolidJS ecosystem repositories into a classified,
//! indexed knowledge base for AI agents. It holds the data model, every
//! pipeline stage and the [`synchronise::synchronise`] orchestrator; the
//! CLI crate only adds configuration files and a filesystem publisher.
//!
//! # Usage
//! Implement or reuse a [`contract::Downloader`] and a
//! [`contract::Publisher`], build a [`config::SynchroniseConfig`] and call
//! [`synchronise::synchronise`]. The per-file stages (`transform`,
//! `classify`, `aggregate`) are pure apart from reading the source file and
//! can be used on their own.

pub mod aggregate;
pub mod classify;
pub mod comments;
pub mod config;
pub mod contract;
pub mod discover;
pub mod download;
pub mod frontmatter;
pub mod index;
pub mod layout;
pub mod normalize;
pub mod synchronise;
pub mod transform;
pub mod validate;
