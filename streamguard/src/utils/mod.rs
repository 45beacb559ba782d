// streamguard/src/utils/mod.rs
pub mod fragments;
