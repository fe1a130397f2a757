pub mod notice;
pub mod quote;
pub mod settings;
pub mod symbol;
pub mod watchlist;
