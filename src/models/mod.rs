pub mod course;
pub mod recommendation;

pub use course::{normalize_course_code, CourseInfo, CourseRecord, Percentage};
pub use recommendation::{Recommendation, RecommendationRequest, RecommendationResponse};
