//! Roster resolution
//!
//! Reconciles a teacher's raw, redundantly-structured teaching relationships
//! into a deduplicated per-student view of schools, classes and
//! contact-teacher status. The roster is rebuilt fresh on every request and
//! never cached; masking and IOP tagging happen exactly once, immediately
//! after aggregation, before any caller sees the result.

pub mod aggregate;
pub mod iop;
pub mod normalize;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use aggregate::{finalize_students, resolve_roster, AggregatedRoster};
pub use resolve::resolve_teacher_data;
pub use types::{
    ClassGroup, ClassKind, GroupStudent, PersonData, RawTeacherRecord, RawTeachingRelationship,
    RejectedRelationship, SchoolMembership, Student, Subject, TeacherData,
};
