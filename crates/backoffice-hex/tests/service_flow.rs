use backoffice_hex::application::resource_service::AppService;
use backoffice_repo::memory::InMemoryStore;
use backoffice_types::domain::registrar::{
    Course, CourseDraft, Enrollment, EnrollmentDraft, EnrollmentPatch, Student, StudentDraft,
};
use chrono::NaiveDate;

// End-to-end registrar flow against the in-memory adapter.
#[tokio::test]
async fn enroll_grade_and_unenroll_flow() {
    let svc = AppService::new(InMemoryStore::new());

    let student: Student = svc
        .create(StudentDraft {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            date_of_birth: Some(NaiveDate::from_ymd_opt(2000, 1, 15).unwrap()),
            major: None,
        })
        .await
        .unwrap();

    let course: Course = svc
        .create(CourseDraft {
            title: "Linear Algebra".into(),
            description: Some("Vectors and matrices".into()),
            credits: 5,
        })
        .await
        .unwrap();

    let enrollment: Enrollment = svc
        .create(EnrollmentDraft {
            student_id: student.id,
            course_id: course.id,
            grade: None,
        })
        .await
        .unwrap();
    assert!(enrollment.grade.is_none());

    let graded: Enrollment = svc
        .update(
            enrollment.id,
            EnrollmentPatch {
                grade: Some("A".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(graded.grade.as_deref(), Some("A"));
    assert_eq!(graded.student_id, student.id);

    let listed: Vec<Enrollment> = svc.list().await.unwrap();
    assert_eq!(listed.len(), 1);

    svc.delete::<Enrollment>(enrollment.id).await.unwrap();
    let after_delete: Vec<Enrollment> = svc.list().await.unwrap();
    assert!(after_delete.is_empty());
}
