// Data structures and types

pub mod connection;
pub mod entity;

pub use connection::ConnectionInfo;
pub use entity::{Entity, EntitySet, Property, Verb, VerbArgument, cmp_full_name};
