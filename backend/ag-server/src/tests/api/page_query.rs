use crate::{PageQuery, SecurityLogQuery};

use chrono::{TimeZone, Utc};
use googletest::prelude::*;

#[test]
fn given_empty_query_when_resolved_then_first_page_of_twenty() {
    assert_that!(PageQuery::default().resolve().unwrap(), eq((1u32, 20u32)));
}

#[test]
fn given_out_of_range_values_when_resolved_then_validation_error() {
    for (page, limit) in [(Some(0), None), (None, Some(0)), (None, Some(201))] {
        let query = PageQuery { page, limit };
        assert!(query.resolve().is_err(), "page={page:?} limit={limit:?}");
    }
}

#[test]
fn given_max_limit_when_resolved_then_accepted() {
    let query = PageQuery {
        page: Some(3),
        limit: Some(200),
    };

    assert_that!(query.resolve().unwrap(), eq((3u32, 200u32)));
}

#[test]
fn given_inverted_range_when_filter_built_then_validation_error() {
    let query = SecurityLogQuery {
        from: Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()),
        to: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
        ..Default::default()
    };

    assert!(query.filter().is_err());
}

#[test]
fn given_mixed_case_email_when_filter_built_then_normalized() {
    let query = SecurityLogQuery {
        email: Some(" Alice@Example.com".to_string()),
        ..Default::default()
    };

    let filter = query.filter().unwrap();

    assert_that!(filter.email, some(eq("alice@example.com")));
}
