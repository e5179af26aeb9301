use regex::Regex;

use crate::error::{AppError, AppResult};

/// Courses found in a transcript's text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedCourses {
    /// Department codes, in document order (e.g. "CS")
    pub course_codes: Vec<String>,
    /// Course numbers, in document order (e.g. "101A")
    pub course_numbers: Vec<String>,
    /// Codes and numbers joined positionally (e.g. "CS101A")
    pub full_courses: Vec<String>,
}

/// Pulls completed course identifiers out of extracted transcript text
///
/// Transcripts list each course as a `Course` block whose lines hold the
/// department code and the course number on their own lines. A block ends at
/// the next `Description`, `Term GPA` or `Grade` heading.
#[derive(Debug, Clone)]
pub struct TranscriptScraper {
    section: Regex,
    department: Regex,
    number: Regex,
}

impl TranscriptScraper {
    pub fn new() -> AppResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| AppError::Internal(format!("invalid transcript pattern: {}", e)))
        };

        Ok(Self {
            section: compile(r"(?s)Course\s*(.*?)(?:Description|Term GPA|Grade|\z)")?,
            department: compile(r"^[A-Z]{2,5}$")?,
            number: compile(r"^\d+[A-Z]*$")?,
        })
    }

    /// Returns department codes and course numbers as two independent lists
    pub fn extract_course_lists(&self, text: &str) -> (Vec<String>, Vec<String>) {
        let mut codes = Vec::new();
        let mut numbers = Vec::new();

        for section in self.section.captures_iter(text) {
            let Some(body) = section.get(1) else {
                continue;
            };

            for line in body.as_str().lines().map(str::trim).filter(|l| !l.is_empty()) {
                if self.department.is_match(line) {
                    codes.push(line.to_string());
                } else if self.number.is_match(line) {
                    numbers.push(line.to_string());
                }
            }
        }

        (codes, numbers)
    }

    pub fn extract(&self, text: &str) -> ExtractedCourses {
        let (course_codes, course_numbers) = self.extract_course_lists(text);
        let full_courses = pair_course_codes(&course_codes, &course_numbers);

        ExtractedCourses {
            course_codes,
            course_numbers,
            full_courses,
        }
    }
}

/// Joins the i-th department code with the i-th course number, stopping at
/// the shorter list
pub fn pair_course_codes(codes: &[String], numbers: &[String]) -> Vec<String> {
    codes
        .iter()
        .zip(numbers)
        .map(|(code, number)| format!("{}{}", code, number))
        .collect()
}
