//! Demographic and socioeconomic analysis of resident census tables.

pub mod logic;
