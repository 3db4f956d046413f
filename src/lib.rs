pub mod axis;
pub mod config;
pub mod dispatcher;
pub mod line_server;
pub mod movement;
pub mod protocol;
