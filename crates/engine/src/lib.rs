pub mod delivery;
pub mod interval;
pub mod resolver;
