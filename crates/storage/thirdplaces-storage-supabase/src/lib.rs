//! Third Places Supabase store
//!
//! Place store backed by the Supabase REST API (PostgREST).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod rows;
pub mod supabase;

pub use supabase::{SupabaseConfig, SupabasePlaceStore};
