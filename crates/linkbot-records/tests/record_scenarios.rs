// End-to-end behaviour of the record manager against real SQLite stores.

use linkbot_records::{
    AddLinkOutcome, RecordError, RecordManager, RecordStore, RemoveLinkOutcome, SectionFilter,
    SqliteStore,
};
use rusqlite::Connection;

fn manager() -> RecordManager<SqliteStore> {
    RecordManager::new(SqliteStore::open_in_memory().unwrap())
}

fn section(s: &str) -> SectionFilter {
    SectionFilter::Section(s.to_string())
}

#[test]
fn full_lifecycle() {
    let m = manager();

    m.register("CS101", "L1", "MW", "1000", "https://a.example")
        .unwrap();
    assert_eq!(
        m.add_link("CS101", "L1", "https://b.example").unwrap(),
        AddLinkOutcome::Added
    );
    assert_eq!(
        m.get_link("CS101", section("L1")).unwrap(),
        vec!["https://a.example", "https://b.example"]
    );

    assert_eq!(
        m.remove_link("CS101", "L1", "https://a.example").unwrap(),
        RemoveLinkOutcome::Removed
    );
    assert_eq!(
        m.get_link("CS101", section("L1")).unwrap(),
        vec!["https://b.example"]
    );

    assert_eq!(m.deregister(&["CS101"]).unwrap(), 1);
    let err = m.get_link("CS101", section("L1")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn second_registration_conflicts_and_keeps_first() {
    let m = manager();
    m.register("CS101", "L1", "MW", "1000", "https://a.example")
        .unwrap();

    let err = m
        .register("CS101", "L1", "TTH", "1400", "https://other.example")
        .unwrap_err();
    assert!(matches!(err, RecordError::Conflict { .. }));

    let course = m.store().find_course("CS101").unwrap().unwrap();
    let kept = m.store().find_schedule(course.id, "L1").unwrap().unwrap();
    assert_eq!(kept.day, "MW");
    assert_eq!(kept.time, "1000");
    assert_eq!(kept.links, vec!["https://a.example"]);
}

#[test]
fn adding_same_link_twice_is_reported_duplicate() {
    let m = manager();
    m.register("CS101", "L1", "MW", "1000", "https://a.example")
        .unwrap();

    assert_eq!(
        m.add_link("CS101", "L1", "https://b.example").unwrap(),
        AddLinkOutcome::Added
    );
    assert_eq!(
        m.add_link("CS101", "L1", "https://b.example").unwrap(),
        AddLinkOutcome::Duplicate
    );
    let links = m.get_link("CS101", section("L1")).unwrap();
    assert_eq!(links.iter().filter(|l| *l == "https://b.example").count(), 1);
}

#[test]
fn removing_absent_link_is_a_noop() {
    let m = manager();
    m.register("CS101", "L1", "MW", "1000", "https://a.example")
        .unwrap();

    assert_eq!(
        m.remove_link("CS101", "L1", "https://zzz.example").unwrap(),
        RemoveLinkOutcome::NotPresent
    );
    assert_eq!(
        m.get_link("CS101", section("L1")).unwrap(),
        vec!["https://a.example"]
    );
}

#[test]
fn remove_link_on_unknown_section_is_not_found() {
    let m = manager();
    let err = m
        .remove_link("CS101", "L1", "https://a.example")
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn deregister_course_removes_every_section() {
    let m = manager();
    for (sec, link) in [("L1", "https://a.example"), ("T1", "https://b.example")] {
        m.register("CS101", sec, "MW", "1000", link).unwrap();
    }
    m.register("EE200", "L1", "F", "900", "https://c.example")
        .unwrap();

    assert_eq!(m.deregister(&["CS101"]).unwrap(), 2);
    assert!(matches!(
        m.get_link("CS101", SectionFilter::All),
        Err(RecordError::CourseNotFound(_))
    ));

    let names: Vec<String> = m
        .list_courses()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["EE200"]);
}

#[test]
fn deregister_section_keeps_course_until_last_section() {
    let m = manager();
    m.register("CS101", "L1", "MW", "1000", "https://a.example")
        .unwrap();
    m.register("CS101", "T1", "F", "1400", "https://b.example")
        .unwrap();

    assert_eq!(m.deregister(&["CS101", "L1"]).unwrap(), 1);
    assert!(m.store().find_course("CS101").unwrap().is_some());
    assert_eq!(
        m.get_link("CS101", SectionFilter::All).unwrap(),
        vec!["https://b.example"]
    );

    assert_eq!(m.deregister(&["CS101", "T1"]).unwrap(), 1);
    assert!(m.store().find_course("CS101").unwrap().is_none());
}

#[test]
fn deregister_missing_section_leaves_course() {
    let m = manager();
    m.register("CS101", "L1", "MW", "1000", "https://a.example")
        .unwrap();
    assert_eq!(m.deregister(&["CS101", "L9"]).unwrap(), 0);
    assert!(m.store().find_course("CS101").unwrap().is_some());
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linkbot.db");

    {
        let m = RecordManager::new(SqliteStore::new(Connection::open(&path).unwrap()).unwrap());
        m.register("CS101", "L1", "MW", "1000", "https://a.example")
            .unwrap();
        m.add_link("CS101", "L1", "https://b.example").unwrap();
    }

    let m = RecordManager::new(SqliteStore::new(Connection::open(&path).unwrap()).unwrap());
    assert_eq!(
        m.get_link("CS101", section("L1")).unwrap(),
        vec!["https://a.example", "https://b.example"]
    );
}

#[test]
fn racing_registrations_yield_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linkbot.db");

    // Create the schema once so the racers only contend on inserts.
    SqliteStore::new(Connection::open(&path).unwrap()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let path = path.clone();
            std::thread::spawn(move || {
                // Separate connections, as separate bot processes would have.
                let m = RecordManager::new(
                    SqliteStore::new(Connection::open(&path).unwrap()).unwrap(),
                );
                m.register(
                    "CS101",
                    "L1",
                    "MW",
                    "1000",
                    &format!("https://racer{i}.example"),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(RecordError::Conflict { .. })))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(conflicts, 3);
}
