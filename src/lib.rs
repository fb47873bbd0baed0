pub mod assets;
pub mod config;
pub mod http_client;
pub mod logging;
pub mod predict_client;
pub mod prediction;
pub mod provider;
pub mod registry;
pub mod render;
pub mod selection;
pub mod simulator;
pub mod state;
