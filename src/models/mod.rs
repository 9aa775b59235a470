pub mod question;
pub mod response;
pub mod survey;

pub use question::{NewQuestion, Question};
pub use response::Response;
pub use survey::Survey;
