use chrono::NaiveDate;

use habit_core::{CalendarWindow, CompletionLog, StreakPolicy};
use habit_service::{HabitService, TogglePlan};

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn fetched_logs() -> Vec<CompletionLog> {
    serde_json::from_str(
        r#"[
            {"habit_id": "meditate", "date": "2024-03-01", "completed": true, "notes": null},
            {"habit_id": "meditate", "date": "2024-03-02 06:10:00", "completed": true, "notes": null},
            {"habit_id": "meditate", "date": "2024-03-03T22:05:00Z", "completed": true, "notes": null},
            {"habit_id": "meditate", "date": "2024-03-04", "completed": true, "notes": null},
            {"habit_id": "meditate", "date": "2024-03-05", "completed": true, "notes": null},
            {"habit_id": "meditate", "date": "broken", "completed": true, "notes": null}
        ]"#,
    )
    .expect("fetched logs parse")
}

#[test]
fn register_fetch_compute_toggle_round_trip() {
    let today = day(2024, 3, 6);
    let service = HabitService::builder().build();
    service.register_habit("meditate", "Meditate", StreakPolicy::Daily);
    service.register_habit("run", "Morning run", StreakPolicy::weekly(3).unwrap());
    assert_eq!(service.list_habits(), vec!["meditate", "run"]);

    service.replace_logs("meditate", &fetched_logs()).unwrap();

    let streak = service.streak("meditate", today).unwrap();
    assert_eq!(streak.current_streak, 5);
    assert_eq!(streak.longest_streak, 5);
    assert_eq!(streak.last_completed, Some(day(2024, 3, 5)));

    let cells = service
        .calendar("meditate", today, CalendarWindow::month(0), today)
        .unwrap();
    assert_eq!(cells.len() % 7, 0);
    assert_eq!(cells.iter().filter(|cell| cell.completed).count(), 5);
    assert_eq!(cells.iter().filter(|cell| cell.is_today).count(), 1);

    // Toggle today: no log yet, so the plan is a create. Apply it the
    // way the data layer would (append to the fetched snapshot, most
    // recent write last) and recompute.
    let plan = service.plan_toggle("meditate", today, None).unwrap();
    assert!(matches!(plan, TogglePlan::Create { .. }));
    let mut logs = fetched_logs();
    logs.push(plan.log().clone());
    service.replace_logs("meditate", &logs).unwrap();

    let streak = service.streak("meditate", today).unwrap();
    assert_eq!(streak.current_streak, 6);
    assert_eq!(streak.last_completed, Some(today));

    // Toggling the same day again plans an in-place update back to
    // incomplete, never a duplicate record.
    let plan = service.plan_toggle("meditate", today, None).unwrap();
    let TogglePlan::Update { log } = plan else {
        panic!("expected update for an already-logged day");
    };
    assert!(!log.completed);
    logs.push(log);
    service.replace_logs("meditate", &logs).unwrap();
    let streak = service.streak("meditate", today).unwrap();
    assert_eq!(streak.current_streak, 5);
}

#[test]
fn snapshot_reports_every_habit_and_surfaces_dropped_records() {
    let today = day(2024, 3, 6);
    let service = HabitService::builder().build();
    service.register_habit("meditate", "Meditate", StreakPolicy::Daily);
    service.register_habit("journal", "Journal", StreakPolicy::Daily);
    service.replace_logs("meditate", &fetched_logs()).unwrap();

    let snapshot = service.snapshot(today);
    assert_eq!(snapshot.today, today);
    assert_eq!(snapshot.habits.len(), 2);

    // Sorted by id: journal first, with no logs and a zeroed result.
    assert_eq!(snapshot.habits[0].habit_id, "journal");
    assert_eq!(snapshot.habits[0].streak.current_streak, 0);
    assert_eq!(snapshot.habits[0].dropped_records, 0);

    assert_eq!(snapshot.habits[1].habit_id, "meditate");
    assert_eq!(snapshot.habits[1].streak.current_streak, 5);
    assert_eq!(snapshot.habits[1].dropped_records, 1);

    // The snapshot is what the UI bridge serializes.
    let json = serde_json::to_value(&snapshot).expect("snapshot serializes");
    assert_eq!(json["today"], "2024-03-06");
    assert_eq!(json["habits"][1]["policy"]["kind"], "daily");
    assert_eq!(json["habits"][1]["streak"]["current_streak"], 5);
}
