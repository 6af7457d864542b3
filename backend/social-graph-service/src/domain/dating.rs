use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::interaction::InteractionType;
use crate::error::AppError;

pub const MIN_DATING_AGE: i64 = 18;
pub const MAX_DATING_AGE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non_binary",
            Gender::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "non_binary" => Some(Gender::NonBinary),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sexuality {
    Straight,
    Gay,
    Lesbian,
    Bisexual,
    Pansexual,
    Asexual,
    Other,
}

impl Sexuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sexuality::Straight => "straight",
            Sexuality::Gay => "gay",
            Sexuality::Lesbian => "lesbian",
            Sexuality::Bisexual => "bisexual",
            Sexuality::Pansexual => "pansexual",
            Sexuality::Asexual => "asexual",
            Sexuality::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatingProfile {
    pub user_id: Uuid,
    pub bio: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub sexuality: Sexuality,
    #[serde(default)]
    pub photos: Vec<String>,
    pub max_distance_miles: f64,
    pub min_age_preference: i64,
    pub max_age_preference: i64,
    pub gender_preference: Vec<Gender>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DatingProfile {
    pub fn age_on(&self, today: NaiveDate) -> i64 {
        age_on(self.birth_date, today)
    }
}

/// Whole years between `birth_date` and `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    let mut age = (today.year() - birth_date.year()) as i64;
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

fn default_max_distance() -> f64 {
    50.0
}

fn default_min_age() -> i64 {
    MIN_DATING_AGE
}

fn default_max_age() -> i64 {
    MAX_DATING_AGE
}

fn default_visible() -> bool {
    true
}

fn default_exclude() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DatingProfileCreate {
    #[validate(length(max = 500))]
    pub bio: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub sexuality: Sexuality,
    #[serde(default)]
    #[validate(length(max = 5))]
    pub photos: Vec<String>,
    #[serde(default = "default_max_distance")]
    #[validate(range(min = 1.0, max = 100.0))]
    pub max_distance_miles: f64,
    #[serde(default = "default_min_age")]
    #[validate(range(min = 18, max = 100))]
    pub min_age_preference: i64,
    #[serde(default = "default_max_age")]
    #[validate(range(min = 18, max = 100))]
    pub max_age_preference: i64,
    #[validate(length(min = 1))]
    pub gender_preference: Vec<Gender>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

impl DatingProfileCreate {
    /// Field rules plus the cross-field checks the derive cannot express
    pub fn check(&self, today: NaiveDate) -> Result<(), AppError> {
        self.validate()?;
        check_birth_date(self.birth_date, today)?;
        check_age_window(self.min_age_preference, self.max_age_preference)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DatingProfileUpdate {
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub sexuality: Option<Sexuality>,
    #[validate(length(max = 5))]
    pub photos: Option<Vec<String>>,
    #[validate(range(min = 1.0, max = 100.0))]
    pub max_distance_miles: Option<f64>,
    #[validate(range(min = 18, max = 100))]
    pub min_age_preference: Option<i64>,
    #[validate(range(min = 18, max = 100))]
    pub max_age_preference: Option<i64>,
    #[validate(length(min = 1))]
    pub gender_preference: Option<Vec<Gender>>,
    pub is_visible: Option<bool>,
}

impl DatingProfileUpdate {
    /// Apply onto the stored profile, re-checking the age window
    pub fn apply(&self, profile: &mut DatingProfile) -> Result<(), AppError> {
        self.validate()?;
        if let Some(bio) = &self.bio {
            profile.bio = bio.clone();
        }
        if let Some(s) = self.sexuality {
            profile.sexuality = s;
        }
        if let Some(photos) = &self.photos {
            profile.photos = photos.clone();
        }
        if let Some(d) = self.max_distance_miles {
            profile.max_distance_miles = d;
        }
        if let Some(a) = self.min_age_preference {
            profile.min_age_preference = a;
        }
        if let Some(a) = self.max_age_preference {
            profile.max_age_preference = a;
        }
        if let Some(g) = &self.gender_preference {
            profile.gender_preference = g.clone();
        }
        if let Some(v) = self.is_visible {
            profile.is_visible = v;
        }
        check_age_window(profile.min_age_preference, profile.max_age_preference)
    }
}

pub fn check_birth_date(birth_date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    let age = age_on(birth_date, today);
    if age < MIN_DATING_AGE {
        return Err(AppError::Validation(
            "Must be at least 18 years old".to_string(),
        ));
    }
    if age > MAX_DATING_AGE {
        return Err(AppError::Validation("Invalid birth date".to_string()));
    }
    Ok(())
}

pub fn check_age_window(min_age: i64, max_age: i64) -> Result<(), AppError> {
    if max_age < min_age {
        return Err(AppError::Validation(
            "Maximum age must be greater than minimum age".to_string(),
        ));
    }
    Ok(())
}

/// Dating action restricted to the swipe family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatingAction {
    SwipeRight,
    SwipeLeft,
    SuperLike,
}

impl DatingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatingAction::SwipeRight => "SWIPE_RIGHT",
            DatingAction::SwipeLeft => "SWIPE_LEFT",
            DatingAction::SuperLike => "SUPER_LIKE",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, DatingAction::SwipeRight | DatingAction::SuperLike)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SWIPE_RIGHT" => Some(DatingAction::SwipeRight),
            "SWIPE_LEFT" => Some(DatingAction::SwipeLeft),
            "SUPER_LIKE" => Some(DatingAction::SuperLike),
            _ => None,
        }
    }
}

impl TryFrom<InteractionType> for DatingAction {
    type Error = AppError;

    fn try_from(value: InteractionType) -> Result<Self, Self::Error> {
        match value {
            InteractionType::SwipeRight => Ok(DatingAction::SwipeRight),
            InteractionType::SwipeLeft => Ok(DatingAction::SwipeLeft),
            InteractionType::SuperLike => Ok(DatingAction::SuperLike),
            other => Err(AppError::bad_request(format!(
                "Invalid dating action: {}",
                other.as_str()
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatingMatch {
    pub match_id: Uuid,
    pub user_id_a: Uuid,
    pub user_id_b: Uuid,
    pub user_a_action: Option<InteractionType>,
    pub user_b_action: Option<InteractionType>,
    pub distance_miles: Option<f64>,
    pub compatibility_score: f64,
    pub is_mutual: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for potential matches; list-valued fields arrive comma separated
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DatingFilter {
    #[serde(default = "default_max_distance")]
    #[validate(range(min = 1.0, max = 100.0))]
    pub max_distance: f64,
    #[serde(default = "default_min_age")]
    #[validate(range(min = 18, max = 100))]
    pub min_age: i64,
    #[serde(default = "default_max_age")]
    #[validate(range(min = 18, max = 100))]
    pub max_age: i64,
    #[serde(default)]
    pub gender_preference: Option<String>,
    #[serde(default = "default_exclude")]
    pub exclude_seen: bool,
    #[serde(default = "default_exclude")]
    pub exclude_matched: bool,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_compatibility: f64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Default for DatingFilter {
    fn default() -> Self {
        Self {
            max_distance: default_max_distance(),
            min_age: default_min_age(),
            max_age: default_max_age(),
            gender_preference: None,
            exclude_seen: default_exclude(),
            exclude_matched: default_exclude(),
            min_compatibility: 0.0,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl DatingFilter {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        check_age_window(self.min_age, self.max_age)?;
        self.genders().map(|_| ())
    }

    /// Parsed gender preference; `None` means "use the profile's own"
    pub fn genders(&self) -> Result<Option<Vec<Gender>>, AppError> {
        let Some(raw) = &self.gender_preference else {
            return Ok(None);
        };
        let mut out = Vec::new();
        for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
            let g = Gender::parse(part)
                .ok_or_else(|| AppError::Validation(format!("Unknown gender: {}", part.trim())))?;
            if !out.contains(&g) {
                out.push(g);
            }
        }
        if out.is_empty() {
            return Err(AppError::Validation(
                "Must specify at least one gender preference".to_string(),
            ));
        }
        Ok(Some(out))
    }
}

/// A candidate profile with its ranking outcome
#[derive(Debug, Clone, Serialize)]
pub struct ScoredProfile {
    pub profile: DatingProfile,
    pub username: String,
    pub display_name: String,
    pub age: i64,
    pub distance_miles: Option<f64>,
    pub compatibility_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatingActionRequest {
    pub action: InteractionType,
}

/// Mutual match joined with the partner's profile
#[derive(Debug, Clone, Serialize)]
pub struct MutualMatch {
    pub match_id: Uuid,
    pub partner_id: Uuid,
    pub partner_username: String,
    pub partner_display_name: String,
    pub partner_profile: Option<DatingProfile>,
    pub distance_miles: Option<f64>,
    pub compatibility_score: f64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let birth = date(2000, 6, 15);
        assert_eq!(age_on(birth, date(2018, 6, 14)), 17);
        assert_eq!(age_on(birth, date(2018, 6, 15)), 18);
    }

    #[test]
    fn test_birth_date_checks() {
        let today = date(2024, 1, 1);
        assert!(check_birth_date(date(2006, 1, 2), today).is_err());
        assert!(check_birth_date(date(2006, 1, 1), today).is_ok());
        assert!(check_birth_date(date(1900, 1, 1), today).is_err());
    }

    #[test]
    fn test_age_window_order() {
        assert!(check_age_window(25, 30).is_ok());
        assert!(check_age_window(30, 30).is_ok());
        assert!(check_age_window(31, 30).is_err());
    }

    #[test]
    fn test_dating_action_from_interaction() {
        assert_eq!(
            DatingAction::try_from(InteractionType::SuperLike).unwrap(),
            DatingAction::SuperLike
        );
        assert!(DatingAction::try_from(InteractionType::Like).is_err());
        assert!(DatingAction::SuperLike.is_positive());
        assert!(!DatingAction::SwipeLeft.is_positive());
        assert_eq!(DatingAction::parse("SWIPE_RIGHT"), Some(DatingAction::SwipeRight));
    }

    #[test]
    fn test_filter_defaults_from_empty_query() {
        let filter: DatingFilter = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(filter.exclude_seen);
        assert!(filter.exclude_matched);
        assert_eq!(filter.min_compatibility, 0.0);
        assert_eq!(filter.limit, 50);

        let keep_seen: DatingFilter =
            serde_json::from_value(serde_json::json!({"exclude_seen": false})).unwrap();
        assert!(!keep_seen.exclude_seen);
        assert!(keep_seen.exclude_matched);
    }

    #[test]
    fn test_filter_gender_parsing() {
        let mut filter = DatingFilter::default();
        assert_eq!(filter.genders().unwrap(), None);

        filter.gender_preference = Some("female, non_binary,female".to_string());
        assert_eq!(
            filter.genders().unwrap(),
            Some(vec![Gender::Female, Gender::NonBinary])
        );

        filter.gender_preference = Some("robot".to_string());
        assert!(filter.check().is_err());
    }

    #[test]
    fn test_filter_rejects_inverted_ages() {
        let filter = DatingFilter {
            min_age: 40,
            max_age: 30,
            ..Default::default()
        };
        assert!(filter.check().is_err());
    }

    #[test]
    fn test_profile_update_rechecks_window() {
        let mut profile = DatingProfile {
            user_id: Uuid::new_v4(),
            bio: String::new(),
            birth_date: date(1995, 1, 1),
            gender: Gender::Female,
            sexuality: Sexuality::Bisexual,
            photos: vec![],
            max_distance_miles: 50.0,
            min_age_preference: 25,
            max_age_preference: 35,
            gender_preference: vec![Gender::Male],
            is_visible: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let bad = DatingProfileUpdate {
            min_age_preference: Some(40),
            ..Default::default()
        };
        assert!(bad.apply(&mut profile).is_err());

        let good = DatingProfileUpdate {
            bio: Some("hiking".into()),
            max_age_preference: Some(45),
            ..Default::default()
        };
        good.apply(&mut profile).unwrap();
        assert_eq!(profile.bio, "hiking");
        assert_eq!(profile.max_age_preference, 45);
    }
}
