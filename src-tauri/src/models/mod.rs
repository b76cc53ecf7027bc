pub mod bar;
pub mod chart;
pub mod config;
pub mod range;
pub mod view;
