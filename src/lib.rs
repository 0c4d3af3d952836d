pub mod aggregate;
pub mod cli;
pub mod errors;
pub mod normalize;
pub mod options;
pub mod organize;
pub mod output;
pub mod root;
pub mod runner;
pub mod sources;
