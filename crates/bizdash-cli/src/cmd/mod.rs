pub mod associations;
pub mod calendar;
pub mod config;
pub mod issues;
pub mod level10;
pub mod rocks;
pub mod serve;
pub mod targets;
pub mod vto;
pub mod week;
