pub mod blueprint;
pub mod question;
pub mod submission;
pub mod test;
