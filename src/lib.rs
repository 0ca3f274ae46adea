pub mod ai;
pub mod config;
pub mod data;
pub mod game;
pub mod map;
pub mod persist;
pub mod render;
pub mod scripted_input;
pub mod session;
