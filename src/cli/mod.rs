pub mod budget;
pub mod dashboard;
pub mod report;
pub mod scan;
pub mod session;
pub mod setup;
pub mod ui;
