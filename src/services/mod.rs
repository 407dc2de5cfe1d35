pub mod delivery;
pub mod telegram;
