use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::resource::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub major: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentDraft {
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub major: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub major: Option<String>,
}

impl Resource for Student {
    const NAME: &'static str = "Student";
    const SEGMENT: &'static str = "students";
    const UNIQUE_FIELD: Option<&'static str> = Some("email");

    type Draft = StudentDraft;
    type Patch = StudentPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate_draft(draft: &StudentDraft) -> anyhow::Result<()> {
        if draft.name.trim().is_empty() {
            anyhow::bail!("name empty");
        }
        if !draft.email.contains('@') {
            anyhow::bail!("invalid email");
        }
        Ok(())
    }

    fn validate_patch(patch: &StudentPatch) -> anyhow::Result<()> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                anyhow::bail!("name empty");
            }
        }
        if let Some(email) = &patch.email {
            if !email.contains('@') {
                anyhow::bail!("invalid email");
            }
        }
        Ok(())
    }

    fn hydrate(draft: StudentDraft, id: i64, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            date_of_birth: draft.date_of_birth,
            major: draft.major,
        }
    }

    fn apply(&mut self, patch: StudentPatch, _now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            self.date_of_birth = Some(date_of_birth);
        }
        if let Some(major) = patch.major {
            self.major = Some(major);
        }
    }

    fn unique_value(&self) -> Option<&str> {
        Some(&self.email)
    }

    fn draft_unique_value(draft: &StudentDraft) -> Option<&str> {
        Some(&draft.email)
    }

    fn patch_unique_value(patch: &StudentPatch) -> Option<&str> {
        patch.email.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub credits: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourseDraft {
    pub title: String,
    pub description: Option<String>,
    pub credits: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i64>,
}

impl Resource for Course {
    const NAME: &'static str = "Course";
    const SEGMENT: &'static str = "courses";

    type Draft = CourseDraft;
    type Patch = CoursePatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate_draft(draft: &CourseDraft) -> anyhow::Result<()> {
        if draft.title.trim().is_empty() {
            anyhow::bail!("title empty");
        }
        Ok(())
    }

    fn validate_patch(patch: &CoursePatch) -> anyhow::Result<()> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                anyhow::bail!("title empty");
            }
        }
        Ok(())
    }

    fn hydrate(draft: CourseDraft, id: i64, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            credits: draft.credits,
        }
    }

    fn apply(&mut self, patch: CoursePatch, _now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(credits) = patch.credits {
            self.credits = credits;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrollmentDraft {
    pub student_id: i64,
    pub course_id: i64,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrollmentPatch {
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub grade: Option<String>,
}

impl Resource for Enrollment {
    const NAME: &'static str = "Enrollment";
    const SEGMENT: &'static str = "enrollments";

    type Draft = EnrollmentDraft;
    type Patch = EnrollmentPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn hydrate(draft: EnrollmentDraft, id: i64, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            student_id: draft.student_id,
            course_id: draft.course_id,
            grade: draft.grade,
        }
    }

    fn apply(&mut self, patch: EnrollmentPatch, _now: DateTime<Utc>) {
        if let Some(student_id) = patch.student_id {
            self.student_id = student_id;
        }
        if let Some(course_id) = patch.course_id {
            self.course_id = course_id;
        }
        if let Some(grade) = patch.grade {
            self.grade = Some(grade);
        }
    }
}
