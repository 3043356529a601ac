//! Roster aggregator
//!
//! Folds all of a teacher's teaching relationships into a deduplicated
//! per-student roster, then finalizes it (login filtering, SSN masking,
//! IOP tagging, sorting) in a single pass.

use tracing::warn;

use super::iop;
use super::normalize::{self, Placement};
use super::types::{
    RawTeachingRelationship, RejectedRelationship, SchoolMembership, Student,
};

/// Role descriptions that qualify a teaching relationship for aggregation
pub const ALLOWED_ROLE_DESCRIPTIONS: [&str; 8] = [
    "Adjunkt",
    "Adjunkt m/till utd",
    "Adjunkt 1",
    "Lærer",
    "Lærer-",
    "Lektor",
    "Lektor m/till utd",
    "Lektor 1",
];

/// Aggregation result before finalization
#[derive(Debug)]
pub struct AggregatedRoster {
    pub students: Vec<Student>,
    pub rejected: Vec<RejectedRelationship>,
}

/// Fold raw relationships into one `Student` per student number.
///
/// Only active relationships with an allow-listed role description
/// contribute students. An active relationship that fails the allow-list is
/// reported in `rejected` when it actually carries students; an empty one
/// is noise, not a permission gap.
pub fn resolve_roster(relationships: &[RawTeachingRelationship]) -> AggregatedRoster {
    let mut students: Vec<Student> = Vec::new();
    let mut rejected = Vec::new();

    for relationship in relationships.iter().filter(|r| r.active) {
        if !ALLOWED_ROLE_DESCRIPTIONS.contains(&relationship.description.as_str()) {
            if normalize::has_students(relationship) {
                warn!(
                    relationship = %relationship.id,
                    description = %relationship.description,
                    "Teaching relationship has a disallowed role description but carries students - no access through it"
                );
                rejected.push(RejectedRelationship {
                    description: relationship.description.clone(),
                    id: relationship.id.clone(),
                });
            }
            continue;
        }

        for placement in normalize::placements(relationship) {
            merge_placement(&mut students, placement);
        }
    }

    AggregatedRoster { students, rejected }
}

fn merge_placement(students: &mut Vec<Student>, placement: Placement<'_>) {
    let Placement {
        school,
        class,
        student,
    } = placement;

    let existing = students
        .iter_mut()
        .find(|s| s.student_number == student.student_number);

    let Some(existing) = existing else {
        students.push(Student {
            student_number: student.student_number.clone(),
            name: student.name.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            login_handle: student.login_handle.clone().unwrap_or_default(),
            login_prefix: String::new(),
            national_id: student.national_id.clone(),
            schools: vec![new_membership(school, class, student.contact_teacher)],
        });
        return;
    };

    let membership = existing
        .schools
        .iter_mut()
        .find(|m| m.school_number == school.school_number);

    match membership {
        None => existing
            .schools
            .push(new_membership(school, class, student.contact_teacher)),
        Some(membership) => {
            if !membership.classes.iter().any(|c| c.id == class.id) {
                membership.classes.push(class);
            }
            // Contact-teacher is monotone: false -> true only
            if student.contact_teacher && !membership.contact_teacher {
                membership.contact_teacher = true;
            }
        }
    }
}

/// Display fields are seeded here, from the first group that creates the
/// membership, and never recomputed.
fn new_membership(
    school: &super::types::RawSchool,
    class: super::types::ClassGroup,
    contact_teacher: bool,
) -> SchoolMembership {
    SchoolMembership {
        school_number: school.school_number.clone(),
        short_name: school.short_name.clone(),
        short_short_name: normalize::short_short_name(&school.short_name),
        name: school.name.clone(),
        contact_teacher,
        iop: false,
        classes: vec![class],
    }
}

/// Finalize an aggregated roster into the view handed to callers.
///
/// Students without a login handle are dropped (the teacher has no
/// actionable way to reference them) with a warning. Every surviving
/// student gets a login prefix, an optionally masked SSN and, when the
/// feature flag is on, IOP tags on their memberships. The final sort is
/// ascending by display name; the sort is stable so ties keep source order.
pub fn finalize_students(
    students: Vec<Student>,
    mask_ssn: bool,
    iop_enabled: bool,
) -> Vec<Student> {
    let (with_login, without_login): (Vec<_>, Vec<_>) = students
        .into_iter()
        .partition(|s| !s.login_handle.is_empty());

    if !without_login.is_empty() {
        let numbers: Vec<&str> = without_login
            .iter()
            .map(|s| s.student_number.as_str())
            .collect();
        warn!(
            count = without_login.len(),
            student_numbers = numbers.join(", "),
            "Dropping students without login handle from roster"
        );
    }

    let mut finalized: Vec<Student> = with_login
        .into_iter()
        .map(|s| finalize_student(s, mask_ssn, iop_enabled))
        .collect();

    finalized.sort_by(|a, b| a.name.cmp(&b.name));
    finalized
}

fn finalize_student(student: Student, mask_ssn: bool, iop_enabled: bool) -> Student {
    let login_prefix = match student.login_handle.split_once('@') {
        Some((prefix, _)) => prefix.to_string(),
        None => student.login_handle.clone(),
    };

    let national_id = if mask_ssn {
        masked_national_id(&student.national_id)
    } else {
        student.national_id
    };

    let schools = if iop_enabled {
        let iop_schools = iop::iop_school_numbers(&student.schools);
        student
            .schools
            .into_iter()
            .map(|m| {
                let iop = iop_schools.contains(&m.school_number);
                SchoolMembership { iop, ..m }
            })
            .collect()
    } else {
        student.schools
    };

    Student {
        login_prefix,
        national_id,
        schools,
        ..student
    }
}

/// First 6 characters retained, remainder replaced by a fixed-length mask
fn masked_national_id(national_id: &str) -> String {
    let prefix: String = national_id.chars().take(6).collect();
    format!("{}*****", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::test_fixtures::*;
    use crate::roster::types::ClassKind;

    #[test]
    fn same_school_two_groups_yields_one_membership_with_class_union() {
        let mut rel = relationship("u1", true, "Lektor", "100");
        rel.base_groups
            .push(group("bg1", true, vec![student_in_group("42", false)]));
        rel.teaching_groups.push(subject_group(
            "tg1",
            vec![subject("NOR1234")],
            vec![student_in_group("42", false)],
        ));

        let roster = resolve_roster(&[rel]);
        assert_eq!(roster.students.len(), 1);
        let student = &roster.students[0];
        assert_eq!(student.schools.len(), 1);
        let membership = &student.schools[0];
        assert_eq!(membership.school_number, "100");
        assert_eq!(membership.classes.len(), 2);
        assert_eq!(membership.classes[0].kind, ClassKind::Base);
        assert_eq!(membership.classes[1].kind, ClassKind::Subject);
    }

    #[test]
    fn duplicate_class_ids_are_not_repeated() {
        // The same teaching group can appear through several relationships
        let mut rel_a = relationship("u1", true, "Lektor", "100");
        rel_a
            .teaching_groups
            .push(group("tg1", true, vec![student_in_group("42", false)]));
        let mut rel_b = relationship("u2", true, "Adjunkt", "100");
        rel_b
            .teaching_groups
            .push(group("tg1", true, vec![student_in_group("42", false)]));

        let roster = resolve_roster(&[rel_a, rel_b]);
        assert_eq!(roster.students[0].schools[0].classes.len(), 1);
    }

    #[test]
    fn contact_teacher_flag_is_monotone() {
        let mut rel = relationship("u1", true, "Lærer", "100");
        rel.base_groups
            .push(group("bg1", true, vec![student_in_group("42", true)]));
        rel.teaching_groups
            .push(group("tg1", true, vec![student_in_group("42", false)]));

        let roster = resolve_roster(&[rel]);
        assert!(roster.students[0].schools[0].contact_teacher);
    }

    #[test]
    fn contact_teacher_seen_later_promotes_membership() {
        let mut rel = relationship("u1", true, "Lærer", "100");
        rel.base_groups
            .push(group("bg1", true, vec![student_in_group("42", false)]));
        rel.teaching_groups
            .push(group("tg1", true, vec![student_in_group("42", true)]));

        let roster = resolve_roster(&[rel]);
        assert!(roster.students[0].schools[0].contact_teacher);
    }

    #[test]
    fn distinct_schools_get_distinct_memberships() {
        let mut rel_a = relationship("u1", true, "Lektor", "100");
        rel_a
            .base_groups
            .push(group("bg1", true, vec![student_in_group("42", false)]));
        let mut rel_b = relationship("u2", true, "Lektor", "200");
        rel_b
            .base_groups
            .push(group("bg2", true, vec![student_in_group("42", true)]));

        let roster = resolve_roster(&[rel_a, rel_b]);
        let student = &roster.students[0];
        assert_eq!(student.schools.len(), 2);
        assert!(!student.schools[0].contact_teacher);
        assert!(student.schools[1].contact_teacher);
    }

    #[test]
    fn inactive_relationships_contribute_nothing() {
        let mut rel = relationship("u1", false, "Lektor", "100");
        rel.base_groups
            .push(group("bg1", true, vec![student_in_group("42", false)]));

        let roster = resolve_roster(&[rel]);
        assert!(roster.students.is_empty());
        // Inactive relationships are not permission gaps either
        assert!(roster.rejected.is_empty());
    }

    #[test]
    fn disallowed_description_with_students_is_reported() {
        let mut rel = relationship("u9", true, "Vikar", "100");
        rel.base_groups
            .push(group("bg1", true, vec![student_in_group("42", false)]));

        let roster = resolve_roster(&[rel]);
        assert!(roster.students.is_empty());
        assert_eq!(
            roster.rejected,
            vec![RejectedRelationship {
                description: "Vikar".to_string(),
                id: "u9".to_string(),
            }]
        );
    }

    #[test]
    fn disallowed_description_without_students_is_noise() {
        let mut rel = relationship("u9", true, "Vikar", "100");
        rel.base_groups.push(group("bg1", true, vec![]));

        let roster = resolve_roster(&[rel]);
        assert!(roster.rejected.is_empty());
    }

    #[test]
    fn membership_display_fields_are_seeded_once() {
        let mut rel = relationship("u1", true, "Lektor", "100");
        rel.base_groups
            .push(group("bg1", true, vec![student_in_group("42", false)]));

        let roster = resolve_roster(&[rel]);
        let membership = &roster.students[0].schools[0];
        assert_eq!(membership.short_name, "UT-SKOLE100");
        assert_eq!(membership.short_short_name, "SKOLE100");
    }

    #[test]
    fn finalize_drops_students_without_login_handle() {
        let mut rel = relationship("u1", true, "Lektor", "100");
        rel.base_groups.push(group(
            "bg1",
            true,
            vec![student_in_group("42", false), student_without_login("43")],
        ));

        let roster = resolve_roster(&[rel]);
        let finalized = finalize_students(roster.students, true, false);
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].student_number, "42");
    }

    #[test]
    fn finalize_attaches_login_prefix() {
        let mut rel = relationship("u1", true, "Lektor", "100");
        rel.base_groups
            .push(group("bg1", true, vec![student_in_group("42", false)]));

        let finalized = finalize_students(resolve_roster(&[rel]).students, true, false);
        assert_eq!(finalized[0].login_prefix, "elev42");
    }

    #[test]
    fn ssn_is_masked_only_when_requested() {
        let mut rel = relationship("u1", true, "Lektor", "100");
        rel.base_groups
            .push(group("bg1", true, vec![student_in_group("42", false)]));

        let masked = finalize_students(resolve_roster(&[rel.clone()]).students, true, false);
        assert_eq!(masked[0].national_id, "010142*****");

        let unmasked = finalize_students(resolve_roster(&[rel]).students, false, false);
        assert_eq!(unmasked[0].national_id, "01014299999");
    }

    #[test]
    fn finalize_sorts_by_display_name() {
        let mut rel = relationship("u1", true, "Lektor", "100");
        let mut bertil = student_in_group("2", false);
        bertil.name = "Bertil".to_string();
        let mut anna = student_in_group("1", false);
        anna.name = "Anna".to_string();
        rel.base_groups.push(group("bg1", true, vec![bertil, anna]));

        let finalized = finalize_students(resolve_roster(&[rel]).students, true, false);
        let names: Vec<&str> = finalized.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Anna", "Bertil"]);
    }
}
