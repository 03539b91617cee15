mod support;

use support::setup_db;

#[test]
fn get_or_create_group_mapping_is_idempotent() {
    let test_db = setup_db();
    let db = &test_db.db;
    let first = db
        .get_or_create_group_mapping("local", "Everyone")
        .expect("create group");
    let again = db
        .get_or_create_group_mapping("local", "Everyone")
        .expect("lookup group");
    assert_eq!(first, again);

    let other = db
        .get_or_create_group_mapping("pags", "Everyone")
        .expect("create group");
    assert_ne!(first.id, other.id);
    assert_eq!(db.list_group_mappings().expect("list groups").len(), 2);
}

#[test]
fn get_group_mapping_returns_none_for_unknown_id() {
    let test_db = setup_db();
    let db = &test_db.db;
    let group = db
        .get_or_create_group_mapping("local", "Staff")
        .expect("create group");
    assert_eq!(
        db.get_group_mapping(group.id).expect("get group"),
        Some(group.clone())
    );
    assert_eq!(db.get_group_mapping(group.id + 100).expect("get group"), None);
}

#[test]
fn tab_mappings_round_trip() {
    let test_db = setup_db();
    let db = &test_db.db;
    let welcome = db
        .get_or_create_tab_mapping("u12l1s5", "Welcome")
        .expect("create tab");
    let news = db
        .get_or_create_tab_mapping("u12l1s9", "News")
        .expect("create tab");
    assert_eq!(
        db.get_or_create_tab_mapping("u12l1s5", "Welcome")
            .expect("lookup tab")
            .id,
        welcome.id
    );
    assert_eq!(db.get_tab_mapping(news.id).expect("get tab"), Some(news.clone()));
    assert_eq!(db.get_tab_mapping(9999).expect("get tab"), None);

    let ids: Vec<i64> = db
        .list_tab_mappings()
        .expect("list tabs")
        .into_iter()
        .map(|tab| tab.id)
        .collect();
    assert_eq!(ids, vec![welcome.id, news.id]);
}
