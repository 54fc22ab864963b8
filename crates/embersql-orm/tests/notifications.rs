//! Change-notification fan-out rules: exactly one notification per
//! qualifying successful write, one per whole batch, zero for writes that
//! affect nothing.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{memory_driver, user, user_dao};
use embersql_sqlite::{SqlDriver, TableListener};

fn counting_listener(driver: &dyn SqlDriver, table: &str) -> Arc<AtomicUsize> {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let listener: TableListener = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    driver.add_listener(table, listener);
    hits
}

#[test]
fn test_insert_notifies_exactly_once() {
    let driver = memory_driver();
    let dao = user_dao(&driver);
    let hits = counting_listener(driver.as_ref(), "t_user");
    dao.insert(&user("1", "a", 1)).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_zero_row_update_and_delete_do_not_notify() {
    let driver = memory_driver();
    let dao = user_dao(&driver);
    let hits = counting_listener(driver.as_ref(), "t_user");

    let mut ghost = user("1", "a", 1);
    ghost.id = 999;
    assert!(!dao.update(&ghost).unwrap());
    assert!(!dao.delete_by_id(999_i64).unwrap());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_affecting_update_and_delete_notify_once_each() {
    let driver = memory_driver();
    let dao = user_dao(&driver);
    let id = dao.insert(&user("1", "a", 1)).unwrap();
    let hits = counting_listener(driver.as_ref(), "t_user");

    let mut row = dao.select_by_id(id).unwrap().unwrap();
    row.age = 2;
    dao.update(&row).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    dao.delete_by_id(id).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_batch_notifies_once_for_the_whole_batch() {
    let driver = memory_driver();
    let dao = user_dao(&driver);
    let hits = counting_listener(driver.as_ref(), "t_user");
    dao.batch_insert(&[user("1", "a", 1), user("2", "b", 2), user("3", "c", 3)])
        .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_batch_does_not_notify() {
    let driver = memory_driver();
    let dao = user_dao(&driver);
    dao.insert(&user("dup", "seed", 9)).unwrap();
    let hits = counting_listener(driver.as_ref(), "t_user");
    assert!(dao
        .batch_insert(&[user("x", "a", 1), user("dup", "b", 2)])
        .is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_empty_batch_does_not_notify() {
    let driver = memory_driver();
    let dao = user_dao(&driver);
    let hits = counting_listener(driver.as_ref(), "t_user");
    dao.batch_insert(&[]).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_clear_and_drop_always_notify() {
    let driver = memory_driver();
    let dao = user_dao(&driver);
    let hits = counting_listener(driver.as_ref(), "t_user");
    dao.clear_table().unwrap();
    dao.drop_table().unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_removed_listener_stops_receiving() {
    let driver = memory_driver();
    let dao = user_dao(&driver);
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let id = driver.add_listener(
        "t_user",
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    dao.insert(&user("1", "a", 1)).unwrap();
    driver.remove_listener("t_user", id);
    dao.insert(&user("2", "b", 2)).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_notifications_are_scoped_to_the_written_table() {
    let driver = memory_driver();
    let dao = user_dao(&driver);
    let other = counting_listener(driver.as_ref(), "t_other");
    dao.insert(&user("1", "a", 1)).unwrap();
    assert_eq!(other.load(Ordering::SeqCst), 0);
}
