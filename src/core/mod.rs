// Core modules implementing schema registration, population, and emission.
pub mod coerce;
pub mod emit;
pub mod error;
pub mod object;
pub mod populate;
pub mod registry;
pub mod schema;
pub mod value;
