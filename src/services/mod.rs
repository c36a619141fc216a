pub mod assistant;
pub mod users;
