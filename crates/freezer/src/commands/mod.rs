pub mod dump;
pub mod freeze;
pub mod list;
pub mod unfreeze;
