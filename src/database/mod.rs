pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use memory::MemorySurveyRepository;
pub use postgres::PgSurveyRepository;
pub use repository::SurveyRepository;
