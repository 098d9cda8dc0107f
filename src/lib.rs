//! wdi_explore
//!
//! Exploratory analysis of World Bank development indicators: download the
//! per-indicator spreadsheets, reshape them into country × year tables, then
//! summarize, correlate and chart them. Pairs with the `wdi-explore` CLI.
//!
//! ### Features
//! - Load `.xls`/`.xlsx` indicator workbooks from the World Bank or from disk
//! - Descriptive statistics (count, mean, std, quartiles) per series
//! - Pearson correlations with two-tailed p-values, correlation matrices
//! - SVG/PNG line charts, grouped bar charts and correlation heatmaps
//!
//! ### Example
//! ```no_run
//! use wdi_explore::{api::Client, config::AnalysisConfig, pipeline};
//! use wdi_explore::viz::{OutputFormat, PlottersRenderer};
//!
//! let config = AnalysisConfig::default();
//! let loaded = pipeline::load_all(&config, &Client::default(), None)?;
//! let mut renderer = PlottersRenderer::new(OutputFormat::Svg, 1000, 800).with_out_dir("figures");
//! pipeline::analyze(&config, &loaded, &mut renderer, &mut std::io::stdout(), false)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod config;
pub mod correlate;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod stats;
pub mod viz;

pub use api::Client;
pub use error::AnalysisError;
pub use models::{Series, Table};
