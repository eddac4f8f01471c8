pub mod block;
pub mod events;
pub mod variant;
