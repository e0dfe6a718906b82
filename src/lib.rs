pub mod config;
pub mod control;
pub mod lookup;
pub mod network;
pub mod networks;
pub mod telemetry;
pub mod timeseries;
