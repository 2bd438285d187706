use chrono::NaiveDate;
use habitual_core::db::{open_db, open_db_in_memory};
use habitual_core::{
    DateKey, Habit, HabitId, HabitStore, HabitStoreError, LoadOutcome, MemorySlotRepository,
    SlotRepoError, SlotRepoResult, SlotRepository, SqliteSlotRepository, DEFAULT_COLOR,
    DEFAULT_ICON, DEFAULT_SLOT_KEY,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn loaded(repo: &MemorySlotRepository) -> HabitStore<&MemorySlotRepository> {
    let mut store = HabitStore::new(repo);
    store.load();
    store
}

fn names<R: SlotRepository>(store: &HabitStore<R>) -> Vec<&str> {
    store.habits().iter().map(|habit| habit.name.as_str()).collect()
}

fn ids<R: SlotRepository>(store: &HabitStore<R>) -> Vec<HabitId> {
    store.habits().iter().map(|habit| habit.id).collect()
}

struct BrokenRepo;

impl SlotRepository for BrokenRepo {
    fn read_slot(&self, _key: &str) -> SlotRepoResult<Option<String>> {
        Err(SlotRepoError::Unavailable("read refused".to_string()))
    }

    fn write_slot(&self, _key: &str, _value: &str) -> SlotRepoResult<()> {
        Err(SlotRepoError::Unavailable("quota exceeded".to_string()))
    }
}

#[test]
fn create_then_complete_scenario() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);

    let id = store.add_habit("Read", "#79b4b7", "📖").unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.habits()[0].name, "Read");
    assert!(store.habits()[0].completed.is_empty());

    let key = DateKey::try_from(date(2024, 1, 1)).unwrap();
    assert!(store.toggle_completion(id, date(2024, 1, 1)).unwrap());
    assert!(store.get(id).unwrap().is_completed_on(key));

    assert!(!store.toggle_completion(id, date(2024, 1, 1)).unwrap());
    assert!(!store.get(id).unwrap().is_completed_on(key));
    assert!(store.get(id).unwrap().completed.is_empty());
}

#[test]
fn toggle_pair_restores_original_state() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    let id = store.add_habit("Walk", "#000", "Footprints").unwrap();
    store.toggle_completion(id, date(2024, 5, 1)).unwrap();
    let before = store.habits().to_vec();

    for day in [date(2024, 5, 1), date(2024, 5, 2)] {
        store.toggle_completion(id, day).unwrap();
        store.toggle_completion(id, day).unwrap();
        assert_eq!(store.habits(), before.as_slice());
    }
}

#[test]
fn toggle_unknown_habit_is_rejected_without_changes() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    store.add_habit("Walk", "#000", "Footprints").unwrap();
    let before = store.habits().to_vec();
    let missing = Uuid::new_v4();

    let err = store.toggle_completion(missing, date(2024, 5, 1)).unwrap_err();

    assert_eq!(err, HabitStoreError::HabitNotFound(missing));
    assert_eq!(store.habits(), before.as_slice());
}

#[test]
fn toggle_on_date_without_key_form_is_rejected_and_reload_keeps_all() {
    let repo = MemorySlotRepository::new();
    let before = {
        let mut store = loaded(&repo);
        let a = store.add_habit("A", "#fff", "Smile").unwrap();
        store.add_habit("B", "#fff", "Smile").unwrap();
        store.toggle_completion(a, date(2024, 1, 1)).unwrap();
        let before = store.habits().to_vec();

        for day in [date(10000, 1, 1), date(-1, 6, 1)] {
            assert_eq!(
                store.toggle_completion(a, day),
                Err(HabitStoreError::DateOutOfRange(day))
            );
        }
        assert_eq!(store.habits(), before.as_slice());
        before
    };

    let mut reopened = HabitStore::new(&repo);
    assert_eq!(reopened.load(), LoadOutcome::Restored { count: 2 });
    assert_eq!(reopened.habits(), before.as_slice());
}

#[test]
fn boundary_year_completions_survive_reload() {
    let repo = MemorySlotRepository::new();
    let before = {
        let mut store = loaded(&repo);
        let id = store.add_habit("Long haul", "#fff", "Smile").unwrap();
        store.toggle_completion(id, date(0, 1, 1)).unwrap();
        store.toggle_completion(id, date(9999, 12, 31)).unwrap();
        store.habits().to_vec()
    };

    let mut reopened = HabitStore::new(&repo);
    assert_eq!(reopened.load(), LoadOutcome::Restored { count: 1 });
    assert_eq!(reopened.habits(), before.as_slice());
}

#[test]
fn empty_color_and_icon_are_stored_as_defaults_and_reload_equal() {
    let repo = MemorySlotRepository::new();
    let before = {
        let mut store = loaded(&repo);
        let a = store.add_habit("A", "", "").unwrap();
        let b = store.add_habit("B", "#123456", "Leaf").unwrap();
        store.update_habit(b, "B", "", "").unwrap();

        let habit = store.get(a).unwrap();
        assert_eq!(habit.color, DEFAULT_COLOR);
        assert_eq!(habit.icon, DEFAULT_ICON);
        let habit = store.get(b).unwrap();
        assert_eq!(habit.color, DEFAULT_COLOR);
        assert_eq!(habit.icon, DEFAULT_ICON);
        store.habits().to_vec()
    };

    let mut reopened = HabitStore::new(&repo);
    reopened.load();
    assert_eq!(reopened.habits(), before.as_slice());
}

#[test]
fn added_ids_are_pairwise_distinct() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);

    for i in 0..200 {
        store.add_habit(&format!("habit {i}"), "#fff", "Smile").unwrap();
    }

    let unique: HashSet<HabitId> = ids(&store).into_iter().collect();
    assert_eq!(unique.len(), 200);
}

#[test]
fn blank_name_is_rejected() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    store.add_habit("Read", "#fff", "Smile").unwrap();

    let err = store.add_habit("   ", "#fff", "Smile").unwrap_err();

    assert_eq!(err, HabitStoreError::InvalidName);
    assert_eq!(store.len(), 1);
}

#[test]
fn add_trims_name_and_appends() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);

    store.add_habit("First", "#fff", "Smile").unwrap();
    store.add_habit("  Second \n", "#fff", "Smile").unwrap();

    assert_eq!(names(&store), ["First", "Second"]);
}

#[test]
fn update_replaces_display_fields_in_place() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    store.add_habit("A", "#111", "Smile").unwrap();
    let id = store.add_habit("B", "#222", "Smile").unwrap();
    store.add_habit("C", "#333", "Smile").unwrap();
    store.toggle_completion(id, date(2024, 2, 2)).unwrap();

    store.update_habit(id, " Bee ", "#abcdef", "Flower").unwrap();

    assert_eq!(names(&store), ["A", "Bee", "C"]);
    let habit = store.get(id).unwrap();
    assert_eq!(habit.color, "#abcdef");
    assert_eq!(habit.icon, "Flower");
    assert_eq!(habit.completion_count(), 1);
}

#[test]
fn update_unknown_habit_is_rejected() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    let missing = Uuid::new_v4();

    assert_eq!(
        store.update_habit(missing, "Name", "#fff", "Smile"),
        Err(HabitStoreError::HabitNotFound(missing))
    );
}

#[test]
fn delete_removes_exactly_one() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    let a = store.add_habit("A", "#fff", "Smile").unwrap();
    let b = store.add_habit("B", "#fff", "Smile").unwrap();
    let c = store.add_habit("C", "#fff", "Smile").unwrap();

    assert!(store.delete_habit(b));

    assert_eq!(ids(&store), [a, c]);
    assert!(!store.delete_habit(b));
    assert_eq!(store.len(), 2);
}

#[test]
fn reorder_moves_instead_of_swapping() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    let ids_in_order: Vec<HabitId> = ["A", "B", "C", "D", "E"]
        .iter()
        .map(|name| store.add_habit(name, "#fff", "Smile").unwrap())
        .collect();

    // Forward: A onto D's slot.
    assert!(store.reorder(ids_in_order[0], ids_in_order[3]));
    assert_eq!(names(&store), ["B", "C", "D", "A", "E"]);

    // Backward: E onto B's slot.
    assert!(store.reorder(ids_in_order[4], ids_in_order[1]));
    assert_eq!(names(&store), ["E", "B", "C", "D", "A"]);
}

#[test]
fn reorder_places_dragged_at_target_index() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    let all: Vec<HabitId> = (0..6)
        .map(|i| store.add_habit(&format!("h{i}"), "#fff", "Smile").unwrap())
        .collect();

    for from in 0..all.len() {
        for to in 0..all.len() {
            if from == to {
                continue;
            }
            let before = ids(&store);
            let dragged = before[from];
            let target = before[to];

            assert!(store.reorder(dragged, target));

            let after = ids(&store);
            assert_eq!(after[to], dragged);
            let rest_before: Vec<_> = before.iter().filter(|id| **id != dragged).collect();
            let rest_after: Vec<_> = after.iter().filter(|id| **id != dragged).collect();
            assert_eq!(rest_before, rest_after);
        }
    }
}

#[test]
fn reorder_with_unknown_ids_changes_nothing() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    let a = store.add_habit("A", "#fff", "Smile").unwrap();
    store.add_habit("B", "#fff", "Smile").unwrap();

    assert!(!store.reorder(a, Uuid::new_v4()));
    assert!(!store.reorder(Uuid::new_v4(), a));
    assert_eq!(names(&store), ["A", "B"]);
}

#[test]
fn every_mutation_rewrites_the_slot() {
    let repo = MemorySlotRepository::new();
    let mut store = loaded(&repo);
    let read_slot = || habitual_core::decode(&repo.slot(DEFAULT_SLOT_KEY).unwrap()).unwrap();

    let a = store.add_habit("A", "#fff", "Smile").unwrap();
    let b = store.add_habit("B", "#fff", "Smile").unwrap();
    assert_eq!(read_slot().len(), 2);

    store.toggle_completion(a, date(2024, 1, 1)).unwrap();
    assert_eq!(read_slot()[0].completion_count(), 1);

    store.reorder(b, a);
    assert_eq!(read_slot()[0].id, b);

    store.update_habit(a, "Alpha", "#000", "Star").unwrap();
    assert_eq!(read_slot()[1].name, "Alpha");

    store.delete_habit(b);
    assert_eq!(read_slot().len(), 1);
}

#[test]
fn reload_restores_exact_collection() {
    let repo = MemorySlotRepository::new();
    let saved = {
        let mut store = loaded(&repo);
        let a = store.add_habit("A", "#fff", "Smile").unwrap();
        let b = store.add_habit("B", "#0f0", "Leaf").unwrap();
        store.toggle_completion(b, date(2024, 3, 3)).unwrap();
        store.reorder(b, a);
        store.habits().to_vec()
    };

    let mut reopened = HabitStore::new(&repo);
    assert_eq!(reopened.load(), LoadOutcome::Restored { count: 2 });
    assert_eq!(reopened.habits(), saved.as_slice());
}

#[test]
fn legacy_slot_loads_with_defaults() {
    let repo = MemorySlotRepository::with_slot(
        DEFAULT_SLOT_KEY,
        r#"[{"id":"11111111-2222-4333-8444-555555555555","name":"Old","completed":{"2023-06-01":true}}]"#,
    );
    let mut store = HabitStore::new(&repo);

    assert_eq!(store.load(), LoadOutcome::Restored { count: 1 });

    let habit = &store.habits()[0];
    assert_eq!(habit.color, DEFAULT_COLOR);
    assert_eq!(habit.icon, DEFAULT_ICON);
    assert_eq!(habit.completion_count(), 1);
}

#[test]
fn corrupt_slot_degrades_to_empty_and_is_kept_until_next_write() {
    let repo = MemorySlotRepository::with_slot(DEFAULT_SLOT_KEY, "{ definitely not json");
    let mut store = HabitStore::new(&repo);

    assert_eq!(store.load(), LoadOutcome::Degraded);
    assert!(store.is_loaded());
    assert!(store.is_empty());
    assert_eq!(
        repo.slot(DEFAULT_SLOT_KEY).as_deref(),
        Some("{ definitely not json")
    );

    store.add_habit("Fresh", "#fff", "Smile").unwrap();
    assert_eq!(habitual_core::decode(&repo.slot(DEFAULT_SLOT_KEY).unwrap()).unwrap().len(), 1);
}

#[test]
fn storage_failures_never_roll_back_memory() {
    let mut store = HabitStore::new(BrokenRepo);

    assert_eq!(store.load(), LoadOutcome::Degraded);
    assert!(store.is_loaded());

    let id = store.add_habit("Read", "#fff", "Smile").unwrap();
    assert!(store.toggle_completion(id, date(2024, 1, 1)).unwrap());
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(id).unwrap().completion_count(), 1);
}

#[test]
fn custom_slot_key_isolates_collections() {
    let repo = MemorySlotRepository::new();
    let mut work = HabitStore::with_slot_key(&repo, "work");
    work.load();
    work.add_habit("Inbox zero", "#fff", "Mail").unwrap();

    let mut home = HabitStore::new(&repo);
    assert_eq!(home.load(), LoadOutcome::Fresh);
    assert!(repo.slot("work").is_some());
    assert!(repo.slot(DEFAULT_SLOT_KEY).is_none());
}

#[test]
fn subscribers_see_every_new_collection() {
    let repo = MemorySlotRepository::new();
    let mut store = HabitStore::new(&repo);
    let seen: Rc<RefCell<Vec<usize>>> = Rc::default();
    let sink = Rc::clone(&seen);
    store.subscribe(move |habits: &[Habit]| sink.borrow_mut().push(habits.len()));

    store.load();
    let a = store.add_habit("A", "#fff", "Smile").unwrap();
    store.add_habit("B", "#fff", "Smile").unwrap();
    let _ = store.add_habit(" ", "#fff", "Smile");
    store.delete_habit(a);
    store.delete_habit(a);

    assert_eq!(*seen.borrow(), [0, 1, 2, 1]);
}

#[test]
fn sqlite_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitual.sqlite3");

    let id = {
        let conn = open_db(&path).unwrap();
        let mut store = HabitStore::new(SqliteSlotRepository::new(&conn));
        assert_eq!(store.load(), LoadOutcome::Fresh);
        let id = store.add_habit("Read", "#79b4b7", "📖").unwrap();
        store.toggle_completion(id, date(2024, 1, 1)).unwrap();
        id
    };

    let conn = open_db(&path).unwrap();
    let mut store = HabitStore::new(SqliteSlotRepository::new(&conn));
    assert_eq!(store.load(), LoadOutcome::Restored { count: 1 });
    let habit = store.get(id).unwrap();
    assert_eq!(habit.icon, "📖");
    assert!(habit.is_completed_on("2024-01-01".parse().unwrap()));
}

#[test]
fn sqlite_in_memory_store_writes_single_slot_row() {
    let conn = open_db_in_memory().unwrap();
    let mut store = HabitStore::new(SqliteSlotRepository::new(&conn));
    store.load();
    store.add_habit("A", "#fff", "Smile").unwrap();
    store.add_habit("B", "#fff", "Smile").unwrap();

    let (rows, value): (i64, String) = conn
        .query_row(
            "SELECT COUNT(*), MAX(value) FROM kv_slots WHERE key = ?1;",
            [DEFAULT_SLOT_KEY],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(habitual_core::decode(&value).unwrap().len(), 2);
}
