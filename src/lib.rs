//! Population trends dashboard: CSV loading, report sections and terminal chart widgets.

pub mod braille;
pub mod chart;
pub mod config;
pub mod data;
pub mod report;
