use super::models::UploadForm;
use crate::common::{ValidationResult, Validator};

pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
pub const MAX_TITLE_LENGTH: usize = 200;

pub struct UploadValidator;

impl Validator<UploadForm> for UploadValidator {
    fn validate(&self, form: &UploadForm) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.check_text("title", form.title.as_deref().unwrap_or(""), MAX_TITLE_LENGTH);

        match &form.data {
            None => result.add_error("video", "No video file provided"),
            Some(data) if data.is_empty() => result.add_error("video", "Video file is empty"),
            Some(data) if data.len() > MAX_UPLOAD_BYTES => {
                result.add_error("video", "Video file too large. Maximum size is 100MB")
            }
            Some(data) => {
                if detect_video_mime(data).is_none() {
                    result.add_error("video", "Unsupported video format");
                }
            }
        }

        result
    }
}

/// Sniffs the payload; declared content types are not trusted
pub fn detect_video_mime(data: &[u8]) -> Option<(&'static str, &'static str)> {
    infer::get(data)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Video)
        .map(|kind| (kind.mime_type(), kind.extension()))
}
