pub mod assignment;
pub mod circuit;
pub mod component;
pub mod expr;
pub mod gate;
pub mod layout;
pub mod lookup;
pub mod manifest;
pub mod var;
