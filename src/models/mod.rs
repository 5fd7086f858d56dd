// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod click;
pub mod shortened_url;
pub mod user;

pub use click::*;
pub use shortened_url::*;
pub use user::*;
