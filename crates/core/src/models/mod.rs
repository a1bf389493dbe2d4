pub mod chart;
pub mod coin;
pub mod intent;
pub mod notice;
pub mod settings;
pub mod trend;
