//! Administrative operations on the license service

#[path = "../common/mod.rs"]
mod common;

use common::*;
use license_gate::error::AppError;
use std::collections::HashSet;

#[test]
fn test_generate_many_creates_distinct_keys() {
    let (clock, _) = manual_clock(T0);
    let service = test_service(clock);

    let keys = service.generate_many(MAX_BULK_KEYS, Some(7)).unwrap();

    assert_eq!(keys.len(), MAX_BULK_KEYS);
    let codes: HashSet<&str> = keys.iter().map(|k| k.code.as_str()).collect();
    assert_eq!(codes.len(), MAX_BULK_KEYS);
    assert!(keys.iter().all(|k| k.expires_at == Some(T0 + 7 * ONE_DAY)));
    assert_eq!(service.list().unwrap().len(), MAX_BULK_KEYS);
}

#[test]
fn test_generate_many_rejects_out_of_range_counts() {
    let (clock, _) = manual_clock(T0);
    let service = test_service(clock);

    for count in [0, MAX_BULK_KEYS + 1] {
        let err = service.generate_many(count, None).unwrap_err();
        assert!(
            matches!(err, AppError::BadRequest(_)),
            "count {} should be rejected, got: {}",
            count,
            err
        );
    }
    assert!(service.list().unwrap().is_empty(), "nothing should be created");
}

#[test]
fn test_get_unknown_key_is_not_found() {
    let service = test_service(Clock::fixed(T0));
    let err = service.get("ZZZZ-ZZZZ-ZZZZ-ZZZZ").unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_set_active_unknown_key_is_not_found() {
    let service = test_service(Clock::fixed(T0));
    let err = service.set_active("ZZZZ-ZZZZ-ZZZZ-ZZZZ", false).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_list_is_newest_first() {
    let (clock, cell) = manual_clock(T0);
    let service = test_service(clock);

    let a = service.generate(None).unwrap();
    advance(&cell, 10);
    let b = service.generate(None).unwrap();
    advance(&cell, 10);
    let c = service.generate(None).unwrap();

    let codes: Vec<String> = service.list().unwrap().into_iter().map(|k| k.code).collect();
    assert_eq!(codes, vec![c.code, b.code, a.code]);
}

#[test]
fn test_stats_are_consistent() {
    let (clock, cell) = manual_clock(T0);
    let service = test_service(clock);

    let a = service.generate(Some(1)).unwrap();
    let b = service.generate(None).unwrap();
    service.generate(Some(30)).unwrap();
    service.validate(&a.code, "H1").unwrap();
    service.validate(&b.code, "H2").unwrap();
    service.set_active(&b.code, false).unwrap();

    advance(&cell, 2 * ONE_DAY);
    let stats = service.stats().unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.bound, 2);
    assert_eq!(stats.expired, 1, "only the one-day key has expired");
    assert_eq!(stats.active, 1, "only the 30-day key is active and unexpired");
    assert!(stats.bound <= stats.total);

    let now = T0 + 2 * ONE_DAY;
    for key in service.list().unwrap() {
        if key.is_expired_at(now) {
            assert!(key.expires_at.is_some_and(|exp| exp < now));
        }
    }
}
