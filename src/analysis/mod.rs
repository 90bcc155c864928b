pub mod orderbook;
pub mod sentiment;
pub mod signals;
pub mod velocity;
