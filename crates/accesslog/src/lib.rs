// Module structure for the accesslog parser.

// Core
pub mod parser;
pub mod stream;

// Process glue
pub mod conf;
pub mod runtime;
