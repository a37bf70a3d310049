// Core value types shared across the engine

pub mod math;
