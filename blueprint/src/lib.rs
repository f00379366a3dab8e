#![doc = include_str!("../README.md")]

pub mod circuits;
pub mod components;
pub mod error;

#[cfg(test)]
mod tests;

