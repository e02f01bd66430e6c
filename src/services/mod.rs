pub mod course_service;
pub mod message_service;

pub use course_service::CourseService;
pub use message_service::MessageService;
