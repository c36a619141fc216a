pub mod ask;
pub mod users;
