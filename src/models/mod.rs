pub mod course;
pub mod enrollment;
pub mod message;

pub use course::{Course, CourseImage, CourseQueryParams, CourseRow, Instructor, NewCourse};
pub use enrollment::{EnrollRequest, EnrolledInstructor, EnrolledStudent, Enrollment};
pub use message::{Message, MessageRow, MessageTarget, NewMessage, SendMessageRequest};
