//! Request payloads accepted by the Entity Store and the rules that admit them.
//!
//! Every field is optional on the wire so that a missing field is reported
//! with a precise message instead of a generic deserialization failure.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Result, ServiceError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    F,
    M,
    Female,
    Male,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::F => "f",
            Gender::M => "m",
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

impl FromStr for Gender {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "f" => Ok(Gender::F),
            "m" => Ok(Gender::M),
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            _ => Err(ServiceError::validation(format!(
                "gender must be one of f, m, female, male (got {s:?})"
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewActor {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActorChanges {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewMovie {
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub cast: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub cast: Option<Vec<String>>,
}

#[derive(Debug)]
pub(crate) struct ActorFields {
    pub name: String,
    pub age: i32,
    pub gender: Gender,
}

#[derive(Debug, Default)]
pub(crate) struct ActorPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
}

#[derive(Debug)]
pub(crate) struct MovieFields {
    pub title: String,
    pub release_date: NaiveDate,
    pub cast: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct MoviePatch {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub cast: Option<Vec<String>>,
}

impl NewActor {
    pub(crate) fn validate(self) -> Result<ActorFields> {
        Ok(ActorFields {
            name: non_blank("name", required("name", self.name)?)?,
            age: positive_age(required("age", self.age)?)?,
            gender: required("gender", self.gender)?.parse()?,
        })
    }
}

impl ActorChanges {
    pub(crate) fn validate(self) -> Result<ActorPatch> {
        if self.name.is_none() && self.age.is_none() && self.gender.is_none() {
            return Err(ServiceError::validation(
                "at least one of name, age, gender must be supplied",
            ));
        }

        Ok(ActorPatch {
            name: self.name.map(|v| non_blank("name", v)).transpose()?,
            age: self.age.map(positive_age).transpose()?,
            gender: self.gender.map(|v| v.parse()).transpose()?,
        })
    }
}

impl NewMovie {
    pub(crate) fn validate(self) -> Result<MovieFields> {
        Ok(MovieFields {
            title: non_blank("title", required("title", self.title)?)?,
            release_date: release_date(required("release_date", self.release_date)?)?,
            cast: cast_list(required("cast", self.cast)?)?,
        })
    }
}

impl MovieChanges {
    pub(crate) fn validate(self) -> Result<MoviePatch> {
        if self.title.is_none() && self.release_date.is_none() && self.cast.is_none() {
            return Err(ServiceError::validation(
                "at least one of title, release_date, cast must be supplied",
            ));
        }

        Ok(MoviePatch {
            title: self.title.map(|v| non_blank("title", v)).transpose()?,
            release_date: self.release_date.map(release_date).transpose()?,
            cast: self.cast.map(cast_list).transpose()?,
        })
    }
}

fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| ServiceError::validation(format!("missing required field: {field}")))
}

fn non_blank(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn positive_age(age: i64) -> Result<i32> {
    match i32::try_from(age) {
        Ok(age) if age > 0 => Ok(age),
        _ => Err(ServiceError::validation(format!(
            "age must be a positive integer (got {age})"
        ))),
    }
}

fn release_date(value: String) -> Result<NaiveDate> {
    let value = non_blank("release_date", value)?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ServiceError::validation(format!(
            "release_date must be a date formatted YYYY-MM-DD (got {value:?})"
        ))
    })
}

fn cast_list(cast: Vec<String>) -> Result<Vec<String>> {
    if cast.is_empty() {
        return Err(ServiceError::validation("cast must list at least one actor"));
    }
    Ok(cast)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ServiceError) -> String {
        match err {
            ServiceError::Validation(msg) => msg,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_gender_is_case_insensitive() {
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::F);
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("MALE".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(Gender::Female.to_string(), "female");
        assert!("X".parse::<Gender>().is_err());
        assert!("".parse::<Gender>().is_err());
    }

    #[test]
    fn test_new_actor_requires_every_field() {
        let err = NewActor {
            name: Some("Emma Stone".to_owned()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(message(err), "missing required field: age");

        let fields = NewActor {
            name: Some("Emma Stone".to_owned()),
            age: Some(32),
            gender: Some("F".to_owned()),
        }
        .validate()
        .unwrap();
        assert_eq!(fields.age, 32);
        assert_eq!(fields.gender, Gender::F);
    }

    #[test]
    fn test_age_bounds() {
        assert!(positive_age(0).is_err());
        assert!(positive_age(-4).is_err());
        assert!(positive_age(i64::from(i32::MAX) + 1).is_err());
        assert_eq!(positive_age(1).unwrap(), 1);
    }

    #[test]
    fn test_empty_changes_are_rejected() {
        assert!(ActorChanges::default().validate().is_err());
        assert!(MovieChanges::default().validate().is_err());
    }

    #[test]
    fn test_movie_changes() {
        let patch = MovieChanges {
            title: Some("Disney Cruella".to_owned()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.title.as_deref(), Some("Disney Cruella"));
        assert!(patch.release_date.is_none());
        assert!(patch.cast.is_none());

        let err = MovieChanges {
            title: Some("   ".to_owned()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(message(err), "title must not be empty");

        let err = MovieChanges {
            cast: Some(vec![]),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(message(err), "cast must list at least one actor");
    }

    #[test]
    fn test_release_date_format() {
        assert_eq!(
            release_date("2021-05-22".to_owned()).unwrap(),
            NaiveDate::from_ymd_opt(2021, 5, 22).unwrap()
        );
        assert!(release_date("22-05-2021".to_owned()).is_err());
        assert!(release_date("".to_owned()).is_err());
    }
}
