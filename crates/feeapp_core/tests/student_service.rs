use chrono::{Month, NaiveDate};
use feeapp_core::db::open_db_in_memory;
use feeapp_core::{
    FeeNotice, NotifyError, PreviewNotifier, ServiceError, SqliteStudentRepository, Student,
    StudentError, StudentRepository, StudentService, UnavailableNotifier,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn open_loads_existing_roster() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    repo.save(&Student::create("Existing", "111", "2023-01-01").unwrap())
        .unwrap();

    let service = StudentService::open(repo, PreviewNotifier::new()).unwrap();
    assert_eq!(service.roster().len(), 1);
    assert_eq!(service.roster()[0].name, "Existing");
}

#[test]
fn add_student_persists_and_refreshes_roster() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    let mut service = StudentService::open(repo, PreviewNotifier::new()).unwrap();
    assert!(service.roster().is_empty());

    let added = service.add_student("Asha", "5550100", "2023-01-15").unwrap();
    let id = added.id.unwrap();

    assert_eq!(service.roster(), [added.clone()]);
    assert_eq!(service.find_by_id(id), Some(&added));
    assert_eq!(service.find_by_name("Asha"), Some(&added));
    assert_eq!(service.repo().load_all().unwrap(), [added]);
}

#[test]
fn add_student_rejects_invalid_input_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    let mut service = StudentService::open(repo, PreviewNotifier::new()).unwrap();

    let err = service.add_student("Asha", "5550100", "15-01-2023").unwrap_err();
    assert!(matches!(err, ServiceError::Student(StudentError::Parse(_))));

    let err = service.add_student("", "5550100", "2023-01-15").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Student(StudentError::Validation(_))
    ));

    assert_eq!(service.repo().count().unwrap(), 0);
    assert!(service.roster().is_empty());
}

#[test]
fn update_student_is_visible_in_roster() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    let mut service = StudentService::open(repo, PreviewNotifier::new()).unwrap();

    let mut student = service.add_student("Old", "111", "2023-01-15").unwrap();
    student.phone = "999".to_string();
    service.update_student(&student).unwrap();

    assert_eq!(service.roster().len(), 1);
    assert_eq!(service.roster()[0].phone, "999");
}

#[test]
fn fee_summaries_follow_roster_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    let mut service = StudentService::open(repo, PreviewNotifier::new()).unwrap();
    service.add_student("Jan", "111", "2023-01-15").unwrap();
    service.add_student("Nov", "222", "2023-11-02").unwrap();

    let summaries = service.fee_summaries(date(2024, 3, 10));
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].student.name, "Jan");
    assert_eq!(summaries[0].elapsed_months, 14);
    assert_eq!(summaries[0].fee_month, Month::March);
    assert_eq!(summaries[1].elapsed_months, 4);
    assert_eq!(summaries[1].fee_month, Month::March);
}

#[test]
fn notify_fee_sends_composed_due_message() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    let mut service = StudentService::open(repo, PreviewNotifier::new()).unwrap();
    let student = service.add_student("Asha", "5550100", "2023-01-15").unwrap();

    let sent = service
        .notify_fee(&student, FeeNotice::Due, date(2024, 3, 10))
        .unwrap();
    assert_eq!(sent.recipient, "5550100");
    assert_eq!(sent.fee_month, Month::March);
    assert_eq!(
        sent.message,
        "Dear Asha, your fee for March is due. Please pay."
    );

    let outbox = service.notifier().sent();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].recipient, "5550100");
    assert_eq!(outbox[0].message, sent.message);
}

#[test]
fn notify_fee_sends_paid_message() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    let mut service = StudentService::open(repo, PreviewNotifier::new()).unwrap();
    let student = service.add_student("Asha", "5550100", "2023-01-15").unwrap();

    let sent = service
        .notify_fee(&student, FeeNotice::Paid, date(2023, 1, 20))
        .unwrap();
    assert_eq!(
        sent.message,
        "Dear Asha, your fee for January has been paid. Thank you."
    );
}

#[test]
fn notifier_failure_is_reported_and_leaves_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    let mut service =
        StudentService::open(repo, UnavailableNotifier::new("no sms transport")).unwrap();
    let student = service.add_student("Asha", "5550100", "2023-01-15").unwrap();
    let before = service.repo().load_all().unwrap();

    let err = service
        .notify_fee(&student, FeeNotice::Due, date(2023, 2, 1))
        .unwrap_err();
    assert_eq!(err, NotifyError::Unavailable("no sms transport".to_string()));

    assert_eq!(service.repo().load_all().unwrap(), before);
    assert_eq!(service.roster(), before.as_slice());
}

#[test]
fn send_custom_delivers_text_and_rejects_empty_message() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    let mut service = StudentService::open(repo, PreviewNotifier::new()).unwrap();
    service.add_student("Asha", "5550100", "2023-01-15").unwrap();
    let student = service.find_by_name("Asha").unwrap().clone();

    service.send_custom(&student, "Class moved to 5pm").unwrap();
    let err = service.send_custom(&student, "  ").unwrap_err();
    assert_eq!(err, NotifyError::EmptyMessage);

    let outbox = service.notifier().sent();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].message, "Class moved to 5pm");
}

#[test]
fn add_student_succeeds_when_reload_after_save_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::new(&conn);
    let mut service = StudentService::open(repo, PreviewNotifier::new()).unwrap();

    conn.execute(
        "INSERT INTO students (name, phone, admission_date) VALUES ('Broken', '000', 'bad');",
        [],
    )
    .unwrap();

    let added = service.add_student("Asha", "555", "2023-01-15").unwrap();
    assert!(added.id.is_some());
    assert_eq!(service.repo().count().unwrap(), 2);
    assert!(service.is_roster_stale());
    assert!(service.roster().is_empty());

    conn.execute("DELETE FROM students WHERE name = 'Broken';", [])
        .unwrap();
    service.refresh().unwrap();
    assert!(!service.is_roster_stale());
    assert_eq!(service.roster(), [added]);
}
