pub mod config;
pub mod decode_unlock;
pub mod generate;
pub mod verify_proof;
