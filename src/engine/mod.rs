// Engine modules: geometry, physics and the loop that drives them

pub mod game_loop;
pub mod geometry;
pub mod lifecycle;
pub mod physics;
