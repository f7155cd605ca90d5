pub mod webhook;
pub mod whatsapp;

pub use webhook::*;
