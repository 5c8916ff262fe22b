pub mod user_cache;
