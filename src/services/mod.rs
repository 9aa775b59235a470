pub mod access_control;
pub mod survey_service;
pub mod tabulator;
