use chrono::NaiveDate;
use goalkeep_core::db::open_db_in_memory;
use goalkeep_core::repo::goal_repo::StoreGoalRepository;
use goalkeep_core::repo::journal_repo::StoreJournalRepository;
use goalkeep_core::repo::task_repo::StoreTaskRepository;
use goalkeep_core::{
    DashboardService, GoalId, GoalService, JournalCategory, JournalService, NewGoal, NewTask,
    ServiceError, SqliteDocumentStore, TaskFilter, TaskPatch, TaskService, UserId,
};

fn user() -> UserId {
    UserId::parse("user-1").unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
}

fn task(goal_id: &GoalId, title: &str, due: Option<NaiveDate>) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: String::new(),
        goal_id: goal_id.clone(),
        due_date: due,
    }
}

#[test]
fn task_creation_requires_existing_goal() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let tasks = TaskService::new(
        StoreTaskRepository::new(&store),
        StoreGoalRepository::new(&store),
    );

    let missing = GoalId::parse("no-such-goal").unwrap();
    let err = tasks
        .create_task(&user(), task(&missing, "orphan", None))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { kind: "goal", .. }));
    assert!(tasks
        .list_tasks(&user(), &TaskFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn task_list_filters_and_orders_by_due_date() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let goals = GoalService::new(
        StoreGoalRepository::new(&store),
        StoreTaskRepository::new(&store),
    );
    let tasks = TaskService::new(
        StoreTaskRepository::new(&store),
        StoreGoalRepository::new(&store),
    );
    let run = goals
        .create_goal(
            &user(),
            NewGoal {
                title: "Run".to_string(),
                ..NewGoal::default()
            },
        )
        .unwrap();
    let read = goals
        .create_goal(
            &user(),
            NewGoal {
                title: "Read".to_string(),
                ..NewGoal::default()
            },
        )
        .unwrap();

    let undated = tasks.create_task(&user(), task(&run, "undated", None)).unwrap();
    let later = tasks
        .create_task(&user(), task(&run, "later", Some(day(20))))
        .unwrap();
    let sooner = tasks
        .create_task(&user(), task(&run, "sooner", Some(day(3))))
        .unwrap();
    let done = tasks
        .create_task(&user(), task(&run, "done", Some(day(1))))
        .unwrap();
    tasks.create_task(&user(), task(&read, "chapter 1", None)).unwrap();
    tasks.complete_task(&user(), &done).unwrap();

    let open_run = tasks
        .list_tasks(
            &user(),
            &TaskFilter {
                goal_id: Some(run.clone()),
                include_completed: false,
            },
        )
        .unwrap();
    let ids = open_run.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids, vec![sooner, later, undated]);

    let all = tasks
        .list_tasks(
            &user(),
            &TaskFilter {
                goal_id: None,
                include_completed: true,
            },
        )
        .unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all.last().unwrap().id, done);
    assert!(all.last().unwrap().record.completed_at.is_some());
}

#[test]
fn overdue_and_relinking_respect_goal_existence() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let goals = GoalService::new(
        StoreGoalRepository::new(&store),
        StoreTaskRepository::new(&store),
    );
    let tasks = TaskService::new(
        StoreTaskRepository::new(&store),
        StoreGoalRepository::new(&store),
    );
    let goal = goals
        .create_goal(
            &user(),
            NewGoal {
                title: "Run".to_string(),
                ..NewGoal::default()
            },
        )
        .unwrap();
    let late = tasks
        .create_task(&user(), task(&goal, "late", Some(day(2))))
        .unwrap();
    tasks
        .create_task(&user(), task(&goal, "today", Some(day(5))))
        .unwrap();

    let overdue = tasks.overdue_tasks(&user(), day(5)).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, late);

    let err = tasks
        .update_task(
            &user(),
            &late,
            TaskPatch {
                goal_id: Some(GoalId::parse("gone").unwrap()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { kind: "goal", .. }));

    let moved = tasks
        .update_task(
            &user(),
            &late,
            TaskPatch {
                due_date: Some(None),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(moved.due_date, None);
    assert_eq!(moved.title, "late");
    assert!(tasks.overdue_tasks(&user(), day(5)).unwrap().is_empty());

    tasks.delete_task(&user(), &late).unwrap();
    assert!(tasks.get_task(&user(), &late).unwrap().is_none());
}

#[test]
fn dashboard_summarizes_all_collections() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let goals = GoalService::new(
        StoreGoalRepository::new(&store),
        StoreTaskRepository::new(&store),
    );
    let tasks = TaskService::new(
        StoreTaskRepository::new(&store),
        StoreGoalRepository::new(&store),
    );
    let journal = JournalService::new(StoreJournalRepository::new(&store));
    let dashboard = DashboardService::new(
        StoreGoalRepository::new(&store),
        StoreTaskRepository::new(&store),
        StoreJournalRepository::new(&store),
    );

    let empty = dashboard.summary(&user(), day(5)).unwrap();
    assert_eq!(empty.total_goals, 0);
    assert_eq!(empty.completion_percent, 0);
    assert!(empty.latest_entry.is_none());

    let run = goals
        .create_goal(
            &user(),
            NewGoal {
                title: "Run".to_string(),
                milestones: vec!["1k".to_string(), "5k".to_string()],
                ..NewGoal::default()
            },
        )
        .unwrap();
    goals.toggle_milestone(&user(), &run, 0).unwrap();
    let read = goals
        .create_goal(
            &user(),
            NewGoal {
                title: "Read".to_string(),
                ..NewGoal::default()
            },
        )
        .unwrap();
    goals.complete_goal(&user(), &read).unwrap();
    goals
        .create_goal(
            &user(),
            NewGoal {
                title: "Sleep".to_string(),
                ..NewGoal::default()
            },
        )
        .unwrap();

    tasks.create_task(&user(), task(&run, "due", Some(day(5)))).unwrap();
    tasks.create_task(&user(), task(&run, "late", Some(day(1)))).unwrap();
    let finished = tasks.create_task(&user(), task(&run, "done", None)).unwrap();
    tasks.complete_task(&user(), &finished).unwrap();

    journal
        .create_entry(&user(), "Day one", "Started.", JournalCategory::Progress)
        .unwrap();
    let latest = journal
        .create_entry(&user(), "Day two", "Kept going.", JournalCategory::Gratitude)
        .unwrap();

    let summary = dashboard.summary(&user(), day(5)).unwrap();
    assert_eq!(summary.total_goals, 3);
    assert_eq!(summary.completed_goals, 1);
    assert_eq!(summary.completion_percent, 33);
    assert_eq!((summary.milestones_done, summary.milestones_total), (1, 2));
    assert_eq!(summary.open_tasks, 2);
    assert_eq!(summary.tasks_due_today, 1);
    assert_eq!(summary.overdue_tasks, 1);
    assert_eq!(summary.journal_entries, 2);
    assert_eq!(summary.latest_entry.unwrap().id, latest);
}
