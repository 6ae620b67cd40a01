pub mod form;
pub mod health;
pub mod uploads;
