pub mod quote_poller;
pub mod search_controller;
pub mod watchlist_controller;
