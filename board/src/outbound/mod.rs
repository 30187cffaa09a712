//! Outbound adapters for the domain ports.

pub mod memory;
pub mod supabase;
