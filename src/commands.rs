pub mod accounts;
pub mod export;
pub mod rotate;
pub mod status;
