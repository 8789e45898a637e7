pub mod chain;
pub mod cli;
pub mod config;
pub mod display;
pub mod distribution;
pub mod error;
pub mod rational;
pub mod simulate;
pub mod solver;
pub mod state;
pub mod strategy;
pub mod tournament;
