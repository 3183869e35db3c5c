use crate::{Environment, LogLevel};

use std::str::FromStr;

use googletest::assert_that;
use googletest::prelude::{anything, eq, err};
use log::LevelFilter;

#[test]
fn given_level_names_in_any_case_when_parsed_then_matching_filter() {
    assert_that!(*LogLevel::from_str("WARN").unwrap(), eq(LevelFilter::Warn));
    assert_that!(*LogLevel::from_str(" trace ").unwrap(), eq(LevelFilter::Trace));
    assert_that!(*LogLevel::from_str("off").unwrap(), eq(LevelFilter::Off));
}

#[test]
fn given_unknown_level_when_parsed_then_error() {
    assert_that!(LogLevel::from_str("verbose"), err(anything()));
}

#[test]
fn given_environment_names_when_parsed_then_round_trip_through_display() {
    let dev = Environment::from_str("dev").unwrap();

    assert_that!(dev, eq(Environment::Development));
    assert!(dev.is_development());
    assert_that!(dev.to_string(), eq("development"));
    assert_that!(Environment::from_str("staging"), err(anything()));
}
