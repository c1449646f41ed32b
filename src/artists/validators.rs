use super::models::{CreateArtistProfileRequest, UpdateArtistProfileRequest};
use crate::common::{ValidationResult, Validator};

const MAX_BIO_LENGTH: usize = 2000;
const MAX_LANGUAGES: usize = 10;

pub struct ProfileValidator;

fn check_optional(result: &mut ValidationResult, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        if value.chars().count() > max {
            result.add_error(field, &format!("{} must be at most {} characters", field, max));
        }
    }
}

fn check_languages(result: &mut ValidationResult, languages: &[String]) {
    if languages.len() > MAX_LANGUAGES {
        result.add_error("languages", "At most 10 languages can be listed");
    }
    if languages.iter().any(|l| l.trim().is_empty()) {
        result.add_error("languages", "Languages cannot be blank");
    }
}

pub fn check_prices(result: &mut ValidationResult, min: Option<i64>, max: Option<i64>) {
    if min.map_or(false, |p| p < 0) || max.map_or(false, |p| p < 0) {
        result.add_error("price", "Prices cannot be negative");
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            result.add_error("price_min", "price_min cannot exceed price_max");
        }
    }
}

impl Validator<CreateArtistProfileRequest> for ProfileValidator {
    fn validate(&self, data: &CreateArtistProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_text("stage_name", &data.stage_name, 100);
        result.check_text("artist_type", &data.artist_type, 50);
        check_optional(&mut result, "bio", data.bio.as_deref(), MAX_BIO_LENGTH);
        check_optional(&mut result, "location", data.location.as_deref(), 200);
        check_languages(&mut result, &data.languages);
        check_prices(&mut result, data.price_min, data.price_max);
        result
    }
}

impl Validator<UpdateArtistProfileRequest> for ProfileValidator {
    fn validate(&self, data: &UpdateArtistProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(stage_name) = &data.stage_name {
            result.check_text("stage_name", stage_name, 100);
        }
        if let Some(artist_type) = &data.artist_type {
            result.check_text("artist_type", artist_type, 50);
        }
        check_optional(&mut result, "bio", data.bio.as_deref(), MAX_BIO_LENGTH);
        check_optional(&mut result, "location", data.location.as_deref(), 200);
        if let Some(languages) = &data.languages {
            check_languages(&mut result, languages);
        }
        check_prices(&mut result, data.price_min, data.price_max);
        result
    }
}
