pub mod experience;
pub mod memory;
pub mod sqlx_repo;
