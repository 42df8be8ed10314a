//! Integration tests for finders (Finder + InMemoryStore).

mod support;

use std::collections::HashSet;

use models::{people_registry, AuditEntry, Contact, Customer, Employee, Person, Task};
use ripple_rust::{
    Conditions, Document, DocumentsExt, Finder, FinderConfig, FinderError, First, InMemoryStore,
    Last, Quorum, Quorums, RawStoreClient, StoreError,
};
use serde_json::json;
use support::{init_tracing, FailingStore};

fn people_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .put_document(&Employee {
            key: "ann".into(),
            name: "Ann".into(),
            title: "Engineer".into(),
        })
        .unwrap();
    store
        .put_document(&Customer {
            key: "bob".into(),
            name: "Bob".into(),
            tier: "gold".into(),
        })
        .unwrap();
    store
        .put_document(&Contact {
            key: "cat".into(),
            name: "Cat".into(),
        })
        .unwrap();
    store
}

fn task_store() -> InMemoryStore {
    let store = InMemoryStore::new().with_key_chunk_size(2);
    for task in [
        Task::new("t1", "write docs", Some("active")),
        Task::new("t2", "ship", Some("done")),
        Task::new("t3", "review", Some("active")),
        Task::new("t4", "triage", None),
        Task::new("t5", "plan", Some("Active")),
    ] {
        store.put_document(&task).unwrap();
    }
    store
}

#[test]
fn missing_key_is_none_and_strict_names_it() {
    init_tracing();
    let store = people_store();
    let people = store.documents::<Contact>();

    assert!(people.find("nobody").unwrap().is_none());

    let err = people.find_strict("nobody").unwrap_err();
    match err {
        FinderError::NotFound(not_found) => {
            assert_eq!(not_found.missing(), ["nobody".to_string()]);
            assert_eq!(not_found.to_string(), "document with key 'nobody' not found");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn found_document_takes_its_tagged_type() {
    let store = people_store();
    let registry = people_registry();
    let people = store.documents::<Person>().with_registry(&registry);

    let ann = people.find("ann").unwrap().unwrap();
    assert_eq!(ann.type_name(), "Employee");
    assert_eq!(ann.key(), "ann");
    assert!(!ann.is_new());
    assert_eq!(
        ann.data,
        Person::Employee(Employee {
            key: "ann".into(),
            name: "Ann".into(),
            title: "Engineer".into(),
        })
    );

    let bob = people.find("bob").unwrap().unwrap();
    assert!(matches!(bob.data, Person::Customer(_)));
}

#[test]
fn document_attributes_are_record_minus_type_tag() {
    let store = people_store();
    let people = store.documents::<Employee>();

    let ann = people.find("ann").unwrap().unwrap();
    let attributes = serde_json::to_value(&ann.data).unwrap();
    assert_eq!(
        attributes,
        json!({"key": "ann", "name": "Ann", "title": "Engineer"})
    );

    let robject = ann.robject().unwrap();
    assert_eq!(robject.data["_type"], "Employee");
    assert!(robject.vclock.is_some());
}

#[test]
fn unknown_type_tag_falls_back_to_expected_type() {
    init_tracing();
    let store = people_store();
    store
        .put_json(
            "people",
            "dan",
            json!({"_type": "Contractor", "name": "Dan", "agency": "acme"}),
        )
        .unwrap();

    let registry = people_registry();
    let people = store.documents::<Person>().with_registry(&registry);
    let dan = people.find("dan").unwrap().unwrap();
    assert_eq!(dan.type_name(), "Contact");
    assert_eq!(dan.name(), "Dan");
    assert_eq!(dan.key(), "dan");
}

#[test]
fn all_returns_every_document_once() {
    let store = people_store();
    let registry = people_registry();
    let people = store.documents::<Person>().with_registry(&registry);

    let all = people.all().unwrap();
    assert_eq!(all.len(), 3);
    let keys: HashSet<&str> = all.iter().map(|person| person.key()).collect();
    assert_eq!(keys, HashSet::from(["ann", "bob", "cat"]));
}

#[test]
fn all_where_filters_by_exact_equality() {
    let store = task_store();
    let tasks = store.documents::<Task>();

    let active = tasks
        .all_where(&Conditions::new().eq("status", "active"))
        .unwrap();
    let keys: Vec<&str> = active.iter().map(|task| task.key()).collect();
    assert_eq!(keys, vec!["t1", "t3"]);

    let via_find = tasks.find(Conditions::new().eq("status", "active")).unwrap();
    assert_eq!(via_find.len(), 2);
}

#[test]
fn all_where_with_several_conditions() {
    let store = task_store();
    let tasks = store.documents::<Task>();

    let conditions = Conditions::from([("status", "active"), ("title", "review")]);
    let found = tasks.all_where(&conditions).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].key(), "t3");
}

#[test]
fn all_where_with_no_match_is_empty() {
    let store = task_store();
    let tasks = store.documents::<Task>();
    let none = tasks
        .all_where(&Conditions::new().eq("status", "archived"))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn empty_conditions_match_whole_bucket() {
    let store = task_store();
    let tasks = store.documents::<Task>();
    assert_eq!(tasks.all_where(&Conditions::new()).unwrap().len(), 5);
}

#[test]
fn first_strict_on_empty_bucket_reports_no_key() {
    let store = InMemoryStore::new();
    let tasks = store.documents::<Task>();

    assert!(tasks.first().unwrap().is_none());

    let err = tasks.first_strict().unwrap_err();
    match err {
        FinderError::NotFound(not_found) => {
            assert!(not_found.requested().is_empty());
            assert_eq!(not_found.to_string(), "cannot find a document without a key");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn first_reads_a_stored_empty_key() {
    let store = InMemoryStore::new();
    store
        .put_document(&Task::new("", "untitled", Some("active")))
        .unwrap();
    store
        .put_document(&Task::new("t1", "write docs", None))
        .unwrap();
    let tasks = store.documents::<Task>();

    assert_eq!(tasks.first().unwrap().unwrap().key(), "");
    assert_eq!(tasks.first_strict().unwrap().title, "untitled");
    assert_eq!(tasks.all().unwrap().len(), 2);
    assert!(matches!(
        tasks.find(""),
        Err(FinderError::InvalidArgument(_))
    ));
}

#[test]
fn query_matches_take_their_tagged_type() {
    let store = people_store();
    let registry = people_registry();
    let people = store.documents::<Person>().with_registry(&registry);

    let employees = people
        .all_where(&Conditions::new().eq("_type", "Employee"))
        .unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].type_name(), "Employee");
    assert!(matches!(employees[0].data, Person::Employee(_)));

    let bob = people
        .all_where(&Conditions::new().eq("name", "Bob"))
        .unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].key(), "bob");
    assert!(matches!(bob[0].data, Person::Customer(_)));
    assert!(bob[0].robject().unwrap().vclock.is_none());
}

#[test]
fn strict_key_list_names_only_missing_keys() {
    let store = task_store();
    let tasks = store.documents::<Task>();

    let err = tasks.find_strict(["t1", "gone", "t3"]).unwrap_err();
    match err {
        FinderError::NotFound(not_found) => {
            assert_eq!(not_found.missing(), ["gone".to_string()]);
            assert_eq!(not_found.to_string(), "documents with keys gone not found");
        }
        other => panic!("unexpected error {:?}", other),
    }

    let found = tasks.find_strict(["t1", "t3"]).unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn key_list_keeps_missing_placeholders() {
    let store = task_store();
    let tasks = store.documents::<Task>();
    let found = tasks.find(vec!["t2", "gone"]).unwrap();
    assert!(found[0].is_some());
    assert!(found[1].is_none());
}

#[test]
fn repeated_finds_agree() {
    let store = task_store();
    let tasks = store.documents::<Task>();

    let first = tasks.find("t1").unwrap().unwrap();
    let second = tasks.find("t1").unwrap().unwrap();
    assert_eq!(first.key(), second.key());
    assert_eq!(first.data, second.data);
}

#[test]
fn store_failure_aborts_scan() {
    let timeout = StoreError::Timeout("r=quorum not met".into());
    let store = FailingStore::new(task_store(), timeout.clone()).fail_on("t2");
    let tasks = store.documents::<Task>();

    let err = tasks.all().unwrap_err();
    assert_eq!(err, FinderError::Store(timeout.clone()));
    // t1 read, t2 failed, nothing after
    assert_eq!(store.gets(), 2);

    let mut streamed = Vec::new();
    let err = tasks
        .each(|task| streamed.push(task.key().to_string()))
        .unwrap_err();
    assert_eq!(err, FinderError::Store(timeout));
    assert_eq!(streamed, vec!["t1"]);
}

#[test]
fn store_failure_is_not_a_miss_for_strict_find() {
    let unavailable = StoreError::Request {
        code: 503,
        message: "insufficient vnodes".into(),
    };
    let store = FailingStore::new(task_store(), unavailable.clone()).fail_on("t1");
    let tasks = store.documents::<Task>();

    assert_eq!(
        tasks.find_strict("t1").unwrap_err(),
        FinderError::Store(unavailable)
    );
}

#[test]
fn transport_404_is_a_miss() {
    let not_found = StoreError::Request {
        code: 404,
        message: "not found".into(),
    };
    let store = FailingStore::new(task_store(), not_found).fail_on("t1");
    let tasks = store.documents::<Task>();

    assert!(tasks.find("t1").unwrap().is_none());
    // The scan skips it like any other missing key
    assert_eq!(tasks.all().unwrap().len(), 4);
}

#[test]
fn undecodable_record_aborts_query() {
    let store = task_store();
    store
        .put_bytes("tasks", "t9", b"{broken".to_vec())
        .unwrap();
    let tasks = store.documents::<Task>();

    let err = tasks
        .all_where(&Conditions::new().eq("status", "active"))
        .unwrap_err();
    assert!(matches!(err, FinderError::Store(StoreError::Serde(_))));
}

#[test]
fn each_streams_every_document() {
    let store = task_store();
    let tasks = store.documents::<Task>();

    let mut seen = Vec::new();
    tasks.each(|task| seen.push(task.key().to_string())).unwrap();
    assert_eq!(seen, vec!["t1", "t2", "t3", "t4", "t5"]);
}

#[test]
fn positional_selectors() {
    let store = task_store();
    let tasks = store.documents::<Task>();

    assert_eq!(tasks.first().unwrap().unwrap().key(), "t1");
    assert_eq!(tasks.first_strict().unwrap().key(), "t1");
    assert_eq!(tasks.find(First).unwrap().unwrap().key(), "t1");
    assert_eq!(tasks.find(Last).unwrap().unwrap().key(), "t5");

    let last_active = tasks
        .find((Last, Conditions::new().eq("status", "active")))
        .unwrap()
        .unwrap();
    assert_eq!(last_active.key(), "t3");

    let err = tasks
        .find_strict((First, Conditions::new().eq("status", "archived")))
        .unwrap_err();
    assert!(matches!(err, FinderError::NotFound(_)));
}

#[test]
fn invalid_arguments() {
    let store = task_store();
    let tasks = store.documents::<Task>();

    assert!(matches!(
        tasks.find(None::<&str>),
        Err(FinderError::InvalidArgument(_))
    ));
    assert!(matches!(
        tasks.find_strict(""),
        Err(FinderError::InvalidArgument(_))
    ));
}

#[test]
fn empty_field_name_is_a_condition_error() {
    let store = task_store();
    let tasks = store.documents::<Task>();
    let err = tasks
        .all_where(&Conditions::new().eq("", "x"))
        .unwrap_err();
    assert!(matches!(err, FinderError::Condition(_)));
}

#[test]
fn find_or_new_builds_unsaved_document() {
    let store = task_store();
    let tasks = store.documents::<Task>();

    let existing = tasks
        .find_or_new(&Conditions::new().eq("title", "ship"), |_| {
            Task::new("unused", "ship", None)
        })
        .unwrap();
    assert_eq!(existing.key(), "t2");
    assert!(!existing.is_new());

    let fresh = tasks
        .find_or_new(&Conditions::new().eq("title", "celebrate"), |_| {
            Task::new("t6", "celebrate", None)
        })
        .unwrap();
    assert!(fresh.is_new());
    assert!(fresh.robject().is_none());
    assert_eq!(fresh.key(), "t6");
}

#[test]
fn read_quorum_comes_from_config() {
    let store = task_store();
    let config = FinderConfig {
        quorums: Quorums {
            r: Quorum::N(5),
            ..Quorums::default()
        },
    };
    let tasks = store.documents::<Task>().with_config(&config);

    let err = tasks.find("t1").unwrap_err();
    assert!(matches!(
        err,
        FinderError::Store(StoreError::Request { code: 400, .. })
    ));

    let config: FinderConfig =
        serde_json::from_value(json!({"quorums": {"r": "one"}})).unwrap();
    let tasks = store.documents::<Task>().with_config(&config);
    assert!(tasks.find("t1").unwrap().is_some());
}

#[test]
fn derive_defaults_and_renamed_key_field() {
    assert_eq!(Task::BUCKET, "tasks");
    assert_eq!(Task::TYPE_NAME, "Task");
    assert_eq!(Employee::TYPE_NAME, "Employee");
    assert_eq!(AuditEntry::BUCKET, "audit_entries");

    let store = InMemoryStore::new();
    store
        .put_document(&AuditEntry {
            entry_id: "e1".into(),
            action: "login".into(),
        })
        .unwrap();

    let entry = store
        .documents::<AuditEntry>()
        .find("e1")
        .unwrap()
        .unwrap();
    assert_eq!(entry.entry_id, "e1");
    assert_eq!(entry.action, "login");
}

#[test]
fn finders_work_over_trait_objects() {
    let store = task_store();
    let dyn_store: &dyn RawStoreClient = &store;
    let tasks = Finder::<dyn RawStoreClient, Task>::new(dyn_store);
    assert_eq!(tasks.all().unwrap().len(), 5);
}
