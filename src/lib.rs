//! Orchestration layer around three viromics command-line tools: CheckV
//! (genome quality), geNomad (virus/plasmid classification) and VirSorter2
//! (viral sequence detection). The tools do the science; this crate fetches
//! and validates their reference databases, drives per-sample runs, and
//! republishes the heterogeneous outputs as one uniform metadata table.

pub mod aggregate;
pub mod checkv;
pub mod config;
pub mod domain;
pub mod error;
pub mod formats;
pub mod genomad;
pub mod output;
pub mod profile;
pub mod runner;
pub mod samples;
pub mod schema;
pub mod store;
pub mod virsorter2;
