//! Roster data model
//!
//! Raw types mirror what the upstream roster source returns for one teacher.
//! Group, student and subject lists are plain vectors with `serde(default)`,
//! so an absent array deserializes to an empty one and the aggregator never
//! has to probe for missing fields.
//!
//! Resolved types are what the rest of the service consumes: one `Student`
//! per distinct student, with one `SchoolMembership` per distinct school.

use serde::{Deserialize, Serialize};

/// Teacher record from the upstream roster source
#[derive(Debug, Clone, Deserialize)]
pub struct RawTeacherRecord {
    pub upn: String,
    pub login_handle: String,
    pub employee_number: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub relationships: Vec<RawTeachingRelationship>,
}

/// One school-scoped teaching assignment carrying groups of students
#[derive(Debug, Clone, Deserialize)]
pub struct RawTeachingRelationship {
    pub id: String,
    pub active: bool,
    /// Textual role description, validated against the aggregator allow-list
    pub description: String,
    pub school: RawSchool,
    #[serde(default)]
    pub base_groups: Vec<RawGroup>,
    /// Only consulted when deciding whether a rejected relationship
    /// actually carries students
    #[serde(default)]
    pub contact_teacher_groups: Vec<RawGroup>,
    #[serde(default)]
    pub teaching_groups: Vec<RawGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSchool {
    pub school_number: String,
    pub short_name: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGroup {
    pub id: String,
    pub name: String,
    pub active: bool,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub students: Vec<GroupStudent>,
}

/// A student as they appear inside one group
#[derive(Debug, Clone, Deserialize)]
pub struct GroupStudent {
    pub student_number: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    /// Absent when the student has not been provisioned a login yet
    #[serde(default)]
    pub login_handle: Option<String>,
    pub national_id: String,
    /// True when this group confers contact-teacher status for the student
    #[serde(default)]
    pub contact_teacher: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    /// Course code matched against the IOP qualifying set
    pub code: String,
}

/// Kind of class group a membership class came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Base,
    Subject,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClassGroup {
    pub id: String,
    pub name: String,
    pub kind: ClassKind,
    pub subjects: Vec<Subject>,
}

/// The teacher's relationship to one student at one school
#[derive(Debug, Clone, Serialize)]
pub struct SchoolMembership {
    pub school_number: String,
    pub short_name: String,
    /// Short name with the organizational prefix before the first `-` stripped
    pub short_short_name: String,
    pub name: String,
    /// True if any source group conferred contact-teacher status here.
    /// Monotone: merging never resets it to false.
    pub contact_teacher: bool,
    /// True if an IOP-qualifying class exists here (always false when the
    /// IOP feature flag is off)
    pub iop: bool,
    pub classes: Vec<ClassGroup>,
}

/// A resolved student on the teacher's roster
#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub student_number: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub login_handle: String,
    /// Local part of the login handle, before the domain separator
    pub login_prefix: String,
    /// Masked (first 6 characters + `*****`) unless the caller asked for
    /// the unmasked view
    pub national_id: String,
    pub schools: Vec<SchoolMembership>,
}

/// Active relationship whose role description failed the allow-list while
/// still carrying students: reported, not silently dropped
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RejectedRelationship {
    pub description: String,
    pub id: String,
}

/// Identity fields for the teacher the roster was resolved for
#[derive(Debug, Clone, Serialize)]
pub struct PersonData {
    pub upn: String,
    pub login_handle: String,
    pub employee_number: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
}

/// Result of a full roster resolution for one caller
#[derive(Debug, Clone, Serialize)]
pub struct TeacherData {
    pub person: Option<PersonData>,
    pub students: Vec<Student>,
    pub rejected_relationships: Vec<RejectedRelationship>,
}

impl TeacherData {
    pub fn empty() -> Self {
        Self {
            person: None,
            students: Vec::new(),
            rejected_relationships: Vec::new(),
        }
    }
}
