pub mod config;
pub mod logging;

pub mod artifact;
pub mod batch;
pub mod checkpoint;
pub mod controller;
pub mod dedup;
pub mod extract;
pub mod fetch;
pub mod identity;
pub mod pipeline;
pub mod target;
pub mod text;
