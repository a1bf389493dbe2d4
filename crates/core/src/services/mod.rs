pub mod catalogue_service;
pub mod intent_service;
pub mod market_service;
pub mod resolver_service;
pub mod similarity;
pub mod trend_service;
