pub mod insider;
pub mod orderflow;
pub mod velocity;
