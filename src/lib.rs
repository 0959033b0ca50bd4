#![forbid(unsafe_code)]

pub mod assemble;
pub mod chapters;
pub mod classify;
pub mod cli;
pub mod collapse;
pub mod commands;
pub mod config;
pub mod execute;
pub mod extract;
pub mod formats;
pub mod logging;
pub mod metadata;
pub mod naming;
pub mod plan;
pub mod quiz;
pub mod report;
pub mod snapshot;
pub mod sql;
