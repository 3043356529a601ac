//! Roster normalizer
//!
//! Flattens one raw teaching relationship into (school, class, student)
//! placements. Base groups are emitted before teaching groups, each in
//! source order, and inactive groups are skipped. The order matters: the
//! first placement that creates a membership seeds its display fields,
//! which are never recomputed.

use super::types::{ClassGroup, ClassKind, GroupStudent, RawSchool, RawTeachingRelationship};

/// One student's placement in one class at one school
#[derive(Debug)]
pub struct Placement<'a> {
    pub school: &'a RawSchool,
    pub class: ClassGroup,
    pub student: &'a GroupStudent,
}

/// Flatten a relationship into placements, base groups first.
///
/// A base-group class carries no subjects; a teaching-group class carries
/// the group's subject list (consumed later by the IOP classifier).
pub fn placements(relationship: &RawTeachingRelationship) -> Vec<Placement<'_>> {
    let mut out = Vec::new();

    for group in relationship.base_groups.iter().filter(|g| g.active) {
        for student in &group.students {
            out.push(Placement {
                school: &relationship.school,
                class: ClassGroup {
                    id: group.id.clone(),
                    name: group.name.clone(),
                    kind: ClassKind::Base,
                    subjects: Vec::new(),
                },
                student,
            });
        }
    }

    for group in relationship.teaching_groups.iter().filter(|g| g.active) {
        for student in &group.students {
            out.push(Placement {
                school: &relationship.school,
                class: ClassGroup {
                    id: group.id.clone(),
                    name: group.name.clone(),
                    kind: ClassKind::Subject,
                    subjects: group.subjects.clone(),
                },
                student,
            });
        }
    }

    out
}

/// Strip the organizational prefix before the first `-` from a school
/// short name (`UT-SKOLEN` becomes `SKOLEN`).
pub fn short_short_name(short_name: &str) -> String {
    match short_name.split_once('-') {
        Some((_, rest)) => rest.to_string(),
        None => short_name.to_string(),
    }
}

/// True if any group in the relationship carries at least one student
pub fn has_students(relationship: &RawTeachingRelationship) -> bool {
    relationship
        .base_groups
        .iter()
        .chain(relationship.contact_teacher_groups.iter())
        .chain(relationship.teaching_groups.iter())
        .any(|group| !group.students.is_empty())
}
