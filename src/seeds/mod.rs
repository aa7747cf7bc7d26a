pub mod users_seed;
