// Graphviz Render - Core Library
//
// Wire models and filename rules shared by the API client and the API server.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
