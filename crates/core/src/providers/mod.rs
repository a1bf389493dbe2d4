pub mod traits;

// Collaborator implementations
pub mod coingecko;
pub mod gemini;
