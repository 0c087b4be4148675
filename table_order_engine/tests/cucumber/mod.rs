mod setups;
mod steps;
pub mod table_world;

pub use table_world::TableWorld;
