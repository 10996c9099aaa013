pub mod health;
pub mod status;
pub mod stitched;
pub mod upload;
