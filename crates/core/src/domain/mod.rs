pub mod agent;
pub mod company;
pub mod selection;
