use crate::{
    catalog::Catalog,
    error::{AppError, AppResult},
    services::vector,
};

/// Query vectors summarizing a student's completed courses
#[derive(Debug, Clone, PartialEq)]
pub struct StudentProfile {
    /// Mean content embedding of the completed courses
    pub content: Vec<f32>,
    /// Mean review aggregate of the completed courses that have one.
    /// `None` means no review signal: no completed course has reviews, or
    /// their mean is the zero vector.
    pub review: Option<Vec<f32>>,
}

/// Builds the content and review profiles for a validated completed set
///
/// Every code must already be a normalized catalog key.
pub fn build_profile(catalog: &Catalog, completed: &[String]) -> AppResult<StudentProfile> {
    let courses = completed
        .iter()
        .map(|code| {
            catalog.get(code).ok_or_else(|| {
                AppError::Computation(format!("completed course {} is not in the catalog", code))
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    if courses.is_empty() {
        return Err(AppError::NoValidCourses);
    }

    let dim = catalog.dimensions();
    let content_embeddings: Vec<&[f32]> = courses.iter().map(|c| c.embedding.as_slice()).collect();
    let content = vector::mean(&content_embeddings, dim)?;

    let review_embeddings: Vec<&[f32]> = courses
        .iter()
        .filter_map(|c| c.review_embedding.as_deref())
        .collect();

    let review = if review_embeddings.is_empty() {
        None
    } else {
        Some(vector::mean(&review_embeddings, dim)?).filter(|mean| !vector::is_zero(mean))
    };

    Ok(StudentProfile { content, review })
}
