// src/lib.rs

// Tous les modules sont publics pour être utilisables par le binaire
// (src/bin/spread_scanner.rs) et par les tests d'intégration.
pub mod config;
pub mod decoders;
pub mod engine;
pub mod error;
pub mod execution;
pub mod monitoring;
pub mod quoting;
pub mod rpc;
pub mod state;
pub mod strategies;
pub mod wallet;
