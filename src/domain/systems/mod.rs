pub mod arena;

pub use arena::{Puck, PuckArena};
